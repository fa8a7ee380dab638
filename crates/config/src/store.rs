//! Memoized variable storage with exactly-once evaluation.
//!
//! The store maps each declared name to its definition and, separately, to
//! its resolution state. Claiming a name atomically transitions it to
//! `Resolving`, so only one caller ever evaluates a definition; concurrent
//! callers block on a condvar and receive the settled result. Settled
//! results (values and errors alike) are permanent for the lifetime of the
//! store.

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};

use tracing::debug;

use crate::def::VarDef;
use crate::error::VarError;

/// Resolution state of one variable. Absent from the map means "declared,
/// not yet requested".
enum State {
  /// Some caller holds the evaluation claim; others wait.
  Resolving,
  /// Terminal: value or error, handed to every caller.
  Settled(Result<String, VarError>),
}

/// Outcome of claiming a name for resolution.
pub(crate) enum Claim {
  /// Already settled; the memoized result.
  Settled(Result<String, VarError>),
  /// The caller won the claim and must evaluate this definition, then
  /// [`VariableStore::settle`] the outcome.
  Evaluate(Arc<VarDef>),
}

struct Inner {
  defs: HashMap<String, Arc<VarDef>>,
  states: HashMap<String, State>,
}

/// Mapping from variable name to definition and memoized result.
pub struct VariableStore {
  namespace: String,
  inner: Mutex<Inner>,
  settled: Condvar,
}

impl VariableStore {
  pub fn new(namespace: impl Into<String>) -> Self {
    Self {
      namespace: namespace.into(),
      inner: Mutex::new(Inner {
        defs: HashMap::new(),
        states: HashMap::new(),
      }),
      settled: Condvar::new(),
    }
  }

  /// Register a definition under `name`.
  ///
  /// # Errors
  ///
  /// `DuplicateName` if the name is already declared; the first declaration
  /// stays intact.
  pub fn declare(&self, name: &str, def: VarDef) -> Result<(), VarError> {
    let mut inner = self.inner.lock().expect("variable store poisoned");
    if inner.defs.contains_key(name) {
      return Err(VarError::DuplicateName {
        context: self.namespace.clone(),
        name: name.to_string(),
      });
    }
    debug!(var = name, kind = def.kind(), ctx = %self.namespace, "declared variable");
    inner.defs.insert(name.to_string(), Arc::new(def));
    Ok(())
  }

  /// True if `name` has been declared.
  pub fn is_declared(&self, name: &str) -> bool {
    let inner = self.inner.lock().expect("variable store poisoned");
    inner.defs.contains_key(name)
  }

  /// All declared names, sorted.
  pub fn names(&self) -> Vec<String> {
    let inner = self.inner.lock().expect("variable store poisoned");
    let mut names: Vec<String> = inner.defs.keys().cloned().collect();
    names.sort();
    names
  }

  /// Snapshot of every declared definition, for graph validation.
  pub fn definitions(&self) -> Vec<(String, Arc<VarDef>)> {
    let inner = self.inner.lock().expect("variable store poisoned");
    inner
      .defs
      .iter()
      .map(|(name, def)| (name.clone(), Arc::clone(def)))
      .collect()
  }

  /// Claim `name` for resolution, blocking while another caller's
  /// evaluation of the same name is in flight.
  ///
  /// # Errors
  ///
  /// `UnresolvedReference` if the name was never declared.
  pub(crate) fn claim(&self, name: &str) -> Result<Claim, VarError> {
    let mut inner = self.inner.lock().expect("variable store poisoned");
    loop {
      match inner.states.get(name) {
        Some(State::Settled(result)) => return Ok(Claim::Settled(result.clone())),
        Some(State::Resolving) => {
          inner = self.settled.wait(inner).expect("variable store poisoned");
        }
        None => {
          let Some(def) = inner.defs.get(name) else {
            return Err(VarError::UnresolvedReference {
              name: name.to_string(),
            });
          };
          let def = Arc::clone(def);
          inner.states.insert(name.to_string(), State::Resolving);
          return Ok(Claim::Evaluate(def));
        }
      }
    }
  }

  /// Publish the outcome of an evaluation claimed via [`claim`] and wake
  /// every waiter. Returns the result for convenience.
  pub(crate) fn settle(&self, name: &str, result: Result<String, VarError>) -> Result<String, VarError> {
    let mut inner = self.inner.lock().expect("variable store poisoned");
    match &result {
      Ok(value) => debug!(var = name, value = %value, ctx = %self.namespace, "variable settled"),
      Err(error) => debug!(var = name, error = %error, ctx = %self.namespace, "variable failed"),
    }
    inner.states.insert(name.to_string(), State::Settled(result.clone()));
    self.settled.notify_all();
    result
  }
}
