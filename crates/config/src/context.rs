//! Package contexts: named namespaces of lazily resolved variables.
//!
//! A [`PackageContext`] is created once per build invocation, populated with
//! declarations at startup, and then queried concurrently while the build
//! graph is constructed. Resolution is recursive: a template reference
//! resolves its dependency before the dependent settles, so dependency order
//! falls out of the call structure. The evaluation path is threaded through
//! recursive calls to detect cyclic definitions.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use petgraph::algo::toposort;
use petgraph::graph::DiGraph;
use tracing::trace;

use crate::config::BuildConfig;
use crate::def::VarDef;
use crate::error::VarError;
use crate::locator::HostToolLocator;
use crate::store::{Claim, VariableStore};
use crate::template;

/// The external services one resolution pass runs against.
///
/// Both are read-only from the engine's perspective; the at-most-once
/// contract still ensures each is consulted at most once per variable.
pub struct ResolveEnv<'a> {
  pub config: &'a dyn BuildConfig,
  pub tools: &'a dyn HostToolLocator,
}

/// A named namespace owning a set of variable declarations.
pub struct PackageContext {
  name: String,
  leaf: String,
  store: VariableStore,
  imports: Mutex<HashMap<String, Arc<PackageContext>>>,
}

impl PackageContext {
  /// Create an empty context. The last `/`-separated segment of `name` is
  /// the qualifier importers use in `${leaf.Variable}` references.
  pub fn new(name: impl Into<String>) -> Arc<Self> {
    let name = name.into();
    let leaf = name.split('/').next_back().unwrap_or_default().to_string();
    Arc::new(Self {
      store: VariableStore::new(name.clone()),
      name,
      leaf,
      imports: Mutex::new(HashMap::new()),
    })
  }

  /// Full context name.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// All declared variable names, sorted.
  pub fn names(&self) -> Vec<String> {
    self.store.names()
  }

  // === Registration surface ===

  /// Declare a fixed string with no dependencies.
  pub fn static_variable(&self, name: &str, value: impl Into<String>) -> Result<(), VarError> {
    self.store.declare(name, VarDef::Static(value.into()))
  }

  /// Declare a template expanded by resolving its `${}` references.
  pub fn template_variable(&self, name: &str, template: &str) -> Result<(), VarError> {
    self.store.declare(name, VarDef::Template(template::parse(template)?))
  }

  /// Declare a template joined against the build source root after expansion.
  pub fn source_path_variable(&self, name: &str, template: &str) -> Result<(), VarError> {
    self
      .store
      .declare(name, VarDef::SourcePath(template::parse(template)?))
  }

  /// Like [`source_path_variable`](Self::source_path_variable), but an
  /// environment variable, when set and non-empty, supplies the value
  /// verbatim instead.
  pub fn source_path_variable_with_env_override(
    &self,
    name: &str,
    template: &str,
    env: &str,
  ) -> Result<(), VarError> {
    self.store.declare(
      name,
      VarDef::SourcePathEnvOverride {
        template: template::parse(template)?,
        env: env.to_string(),
      },
    )
  }

  /// Declare the path of a host-built binary tool.
  pub fn host_bin_tool_variable(&self, name: &str, tool: &str) -> Result<(), VarError> {
    self.store.declare(name, VarDef::HostBinTool(tool.to_string()))
  }

  /// Declare the path of a host-built Java tool.
  pub fn host_java_tool_variable(&self, name: &str, tool: &str) -> Result<(), VarError> {
    self.store.declare(name, VarDef::HostJavaTool(tool.to_string()))
  }

  /// Declare a mode-conditioned function, evaluated lazily exactly once.
  pub fn variable_func<F>(&self, name: &str, func: F) -> Result<(), VarError>
  where
    F: Fn(&mut FuncCx<'_, '_>) -> Result<String, VarError> + Send + Sync + 'static,
  {
    self.store.declare(name, VarDef::Func(Box::new(func)))
  }

  /// Import another context's declarations, read-only, under its leaf name.
  pub fn import(&self, other: &Arc<PackageContext>) -> Result<(), VarError> {
    let key = other.leaf.clone();
    let mut imports = self.imports.lock().expect("imports poisoned");
    if imports.contains_key(&key) {
      return Err(VarError::DuplicateName {
        context: self.name.clone(),
        name: key,
      });
    }
    imports.insert(key, Arc::clone(other));
    Ok(())
  }

  // === Resolution ===

  /// Resolve a variable, evaluating its definition on first access and
  /// returning the memoized result thereafter. `name` may be qualified
  /// (`ns.Variable`) to reach an imported context.
  pub fn resolve(&self, name: &str, env: &ResolveEnv<'_>) -> Result<String, VarError> {
    let mut path = Vec::new();
    self.resolve_with_path(name, env, &mut path)
  }

  /// Upfront validation of the declared reference graph: every recorded
  /// reference must name a declared variable, and the local graph must be
  /// acyclic. `Func` definitions are opaque here; the evaluation-path check
  /// in [`resolve`](Self::resolve) covers them.
  pub fn validate(&self) -> Result<(), VarError> {
    let defs = self.store.definitions();
    let imports = self.imports.lock().expect("imports poisoned");

    let mut graph = DiGraph::<&str, ()>::new();
    let mut nodes = HashMap::new();
    for (name, _) in &defs {
      nodes.insert(name.as_str(), graph.add_node(name.as_str()));
    }

    for (name, def) in &defs {
      for reference in def.references() {
        if let Some((ns, rest)) = reference.split_once('.') {
          let declared = imports.get(ns).is_some_and(|other| other.store.is_declared(rest));
          if !declared {
            return Err(VarError::UnresolvedReference { name: reference });
          }
        } else {
          let Some(&dep) = nodes.get(reference.as_str()) else {
            return Err(VarError::UnresolvedReference { name: reference });
          };
          graph.add_edge(dep, nodes[name.as_str()], ());
        }
      }
    }

    match toposort(&graph, None) {
      Ok(_) => Ok(()),
      Err(cycle) => Err(VarError::CyclicReference {
        cycle: format!("{}.{}", self.leaf, graph[cycle.node_id()]),
      }),
    }
  }

  fn resolve_with_path(
    &self,
    name: &str,
    env: &ResolveEnv<'_>,
    path: &mut Vec<String>,
  ) -> Result<String, VarError> {
    if let Some((ns, rest)) = name.split_once('.') {
      let other = {
        let imports = self.imports.lock().expect("imports poisoned");
        imports.get(ns).cloned()
      };
      let Some(other) = other else {
        return Err(VarError::UnresolvedReference {
          name: name.to_string(),
        });
      };
      return other.resolve_with_path(rest, env, path);
    }

    let key = format!("{}.{}", self.leaf, name);
    if let Some(start) = path.iter().position(|entry| entry == &key) {
      let mut cycle: Vec<&str> = path[start..].iter().map(String::as_str).collect();
      cycle.push(&key);
      return Err(VarError::CyclicReference {
        cycle: cycle.join(" -> "),
      });
    }

    match self.store.claim(name)? {
      Claim::Settled(result) => {
        trace!(var = %key, "memoized");
        result
      }
      Claim::Evaluate(def) => {
        trace!(var = %key, kind = def.kind(), "evaluating");
        path.push(key);
        let result = self.evaluate(&def, env, path);
        path.pop();
        self.store.settle(name, result)
      }
    }
  }

  fn evaluate(
    &self,
    def: &VarDef,
    env: &ResolveEnv<'_>,
    path: &mut Vec<String>,
  ) -> Result<String, VarError> {
    match def {
      VarDef::Static(value) => Ok(value.clone()),
      VarDef::Template(segments) => {
        template::expand(segments, |name| self.resolve_with_path(name, env, path))
      }
      VarDef::SourcePath(segments) => {
        let rel = template::expand(segments, |name| self.resolve_with_path(name, env, path))?;
        Ok(join_source_root(env.config.source_root(), &rel))
      }
      VarDef::SourcePathEnvOverride {
        template: segments,
        env: override_var,
      } => {
        let override_value = env.config.getenv(override_var);
        if !override_value.is_empty() {
          return Ok(override_value);
        }
        let rel = template::expand(segments, |name| self.resolve_with_path(name, env, path))?;
        Ok(join_source_root(env.config.source_root(), &rel))
      }
      VarDef::HostBinTool(tool) => env.tools.host_bin_tool_path(tool).map(path_string),
      VarDef::HostJavaTool(tool) => env.tools.host_java_tool_path(tool).map(path_string),
      VarDef::Func(func) => {
        let mut cx = FuncCx { ctx: self, env, path };
        func(&mut cx)
      }
    }
  }
}

/// Handle passed to mode-conditioned function definitions.
///
/// Exposes the build configuration snapshot, host-tool lookup, and
/// re-entrant resolution; re-entrant calls share the caller's evaluation
/// path so cycles through functions are still detected.
pub struct FuncCx<'a, 'p> {
  ctx: &'a PackageContext,
  env: &'a ResolveEnv<'a>,
  path: &'p mut Vec<String>,
}

impl FuncCx<'_, '_> {
  pub fn getenv(&self, name: &str) -> String {
    self.env.config.getenv(name)
  }

  pub fn is_env_false(&self, name: &str) -> bool {
    self.env.config.is_env_false(name)
  }

  /// The environment variable's value, or `MissingEnv` if unset or empty.
  pub fn require_env(&self, name: &str) -> Result<String, VarError> {
    let value = self.env.config.getenv(name);
    if value.is_empty() {
      Err(VarError::MissingEnv {
        name: name.to_string(),
      })
    } else {
      Ok(value)
    }
  }

  pub fn unbundled_build(&self) -> bool {
    self.env.config.unbundled_build()
  }

  pub fn is_pdk_build(&self) -> bool {
    self.env.config.is_pdk_build()
  }

  pub fn prebuilt_os(&self) -> String {
    self.env.config.prebuilt_os()
  }

  pub fn host_os(&self) -> String {
    self.env.config.host_os()
  }

  pub fn host_bin_tool_path(&self, tool: &str) -> Result<String, VarError> {
    self.env.tools.host_bin_tool_path(tool).map(path_string)
  }

  pub fn host_java_tool_path(&self, tool: &str) -> Result<String, VarError> {
    self.env.tools.host_java_tool_path(tool).map(path_string)
  }

  /// Resolve another variable, possibly qualified as `ns.Variable`.
  pub fn resolve(&mut self, name: &str) -> Result<String, VarError> {
    self.ctx.resolve_with_path(name, self.env, self.path)
  }

  /// Parse and expand a template string against this context.
  pub fn expand(&mut self, template: &str) -> Result<String, VarError> {
    let segments = template::parse(template)?;
    template::expand(&segments, |name| {
      self.ctx.resolve_with_path(name, self.env, self.path)
    })
  }
}

fn path_string(path: std::path::PathBuf) -> String {
  path.to_string_lossy().into_owned()
}

fn join_source_root(root: &Path, rel: &str) -> String {
  root.join(rel).to_string_lossy().into_owned()
}
