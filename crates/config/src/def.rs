//! Variable definitions: the resolution strategies.
//!
//! Each declared variable carries exactly one definition describing how its
//! value is computed on first access. Definitions are a closed set of kinds
//! rather than arbitrary closures wherever possible, so the engine can record
//! the reference graph at declaration time; only `Func` hides its
//! dependencies until it runs.

use std::fmt;

use crate::context::FuncCx;
use crate::error::VarError;
use crate::template::{self, Segment};

/// A mode-conditioned function definition.
///
/// Receives a [`FuncCx`] exposing the build configuration snapshot, the
/// host-tool locator, and re-entrant resolution of other variables.
pub type VarFunc = Box<dyn Fn(&mut FuncCx<'_, '_>) -> Result<String, VarError> + Send + Sync>;

/// How a variable's value is computed.
pub enum VarDef {
  /// Fixed string supplied at declaration; no dependencies.
  Static(String),

  /// Template expanded by resolving its `${}` references.
  Template(Vec<Segment>),

  /// Template expanded, then joined against the build source root.
  SourcePath(Vec<Segment>),

  /// Same as `SourcePath`, unless the override environment variable is set
  /// and non-empty, in which case its value is used verbatim.
  SourcePathEnvOverride { template: Vec<Segment>, env: String },

  /// Path of a host-built binary tool, via the host-tool locator.
  HostBinTool(String),

  /// Path of a host-built Java tool, via the host-tool locator.
  HostJavaTool(String),

  /// Mode-conditioned function, evaluated lazily exactly once.
  Func(VarFunc),
}

impl VarDef {
  /// Short kind name, used in logging and errors.
  pub fn kind(&self) -> &'static str {
    match self {
      VarDef::Static(_) => "static",
      VarDef::Template(_) => "template",
      VarDef::SourcePath(_) => "source-path",
      VarDef::SourcePathEnvOverride { .. } => "source-path-env-override",
      VarDef::HostBinTool(_) => "host-bin-tool",
      VarDef::HostJavaTool(_) => "host-java-tool",
      VarDef::Func(_) => "func",
    }
  }

  /// The variable names this definition is declared to reference.
  ///
  /// `Func` definitions report none; their references only become visible
  /// while they run, and the evaluation-path check covers them.
  pub fn references(&self) -> Vec<String> {
    match self {
      VarDef::Template(segments)
      | VarDef::SourcePath(segments)
      | VarDef::SourcePathEnvOverride {
        template: segments, ..
      } => template::references(segments),
      _ => Vec::new(),
    }
  }
}

impl fmt::Debug for VarDef {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VarDef::Static(value) => f.debug_tuple("Static").field(value).finish(),
      VarDef::Template(segments) => f.debug_tuple("Template").field(segments).finish(),
      VarDef::SourcePath(segments) => f.debug_tuple("SourcePath").field(segments).finish(),
      VarDef::SourcePathEnvOverride { template, env } => f
        .debug_struct("SourcePathEnvOverride")
        .field("template", template)
        .field("env", env)
        .finish(),
      VarDef::HostBinTool(tool) => f.debug_tuple("HostBinTool").field(tool).finish(),
      VarDef::HostJavaTool(tool) => f.debug_tuple("HostJavaTool").field(tool).finish(),
      VarDef::Func(_) => f.write_str("Func(..)"),
    }
  }
}
