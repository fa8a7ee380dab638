//! Error types for variable declaration and resolution.

use thiserror::Error;

/// Errors that can occur while declaring or resolving configuration variables.
///
/// Resolution errors are memoized alongside values: once a variable settles
/// with an error, every caller that asks for it receives that same error for
/// the lifetime of the owning context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VarError {
  /// The name is already declared in this context.
  #[error("duplicate declaration of {name} in {context}")]
  DuplicateName { context: String, name: String },

  /// A definition references itself, directly or transitively.
  #[error("cyclic variable reference: {cycle}")]
  CyclicReference { cycle: String },

  /// A reference names a variable that is not declared in any reachable context.
  #[error("unresolved reference to ${{{name}}}")]
  UnresolvedReference { name: String },

  /// Placeholder syntax error in a template string.
  #[error("malformed template at position {position}: {message}")]
  MalformedTemplate { position: usize, message: String },

  /// The host-tool locator could not find the requested tool.
  #[error("host tool not found: {tool} (searched {searched})")]
  ToolNotFound { tool: String, searched: String },

  /// A required environment variable is unset or empty.
  #[error("required environment variable {name} is not set")]
  MissingEnv { name: String },
}
