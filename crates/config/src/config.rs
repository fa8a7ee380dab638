//! The build configuration snapshot.
//!
//! Resolution strategies read environment variables and build-mode flags
//! through [`BuildConfig`] rather than touching the process environment
//! directly. The snapshot is treated as immutable for the duration of one
//! resolution pass; values memoize against the first snapshot they are
//! resolved with.

use std::path::{Path, PathBuf};

use crate::platform::Os;

/// Environment lookups and build-mode flags for one build invocation.
pub trait BuildConfig: Send + Sync {
  /// Returns the environment variable's value, or the empty string if unset.
  fn getenv(&self, name: &str) -> String;

  /// True iff the variable is set to a recognized "false" literal.
  fn is_env_false(&self, name: &str) -> bool {
    matches!(
      self.getenv(name).to_lowercase().as_str(),
      "0" | "n" | "no" | "off" | "false"
    )
  }

  /// True for unbundled builds, which prefer prebuilt tools over host-built ones.
  fn unbundled_build(&self) -> bool;

  /// True for partner-delivery-kit builds.
  fn is_pdk_build(&self) -> bool;

  /// Host identifier naming platform-specific prebuilt subdirectories
  /// (e.g. `linux-x86`).
  fn prebuilt_os(&self) -> String;

  /// Plain host OS name (e.g. `linux`), for prebuilt layouts keyed by OS alone.
  fn host_os(&self) -> String;

  /// Root of the build source tree; source-relative paths join against this.
  fn source_root(&self) -> &Path;
}

/// [`BuildConfig`] backed by the process environment.
///
/// Mode flags are fixed at construction; the source root defaults to the
/// empty path, which leaves source-relative variables tree-relative.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
  pub source_root: PathBuf,
  pub unbundled: bool,
  pub pdk: bool,
}

impl EnvConfig {
  pub fn new(source_root: impl Into<PathBuf>) -> Self {
    Self {
      source_root: source_root.into(),
      unbundled: false,
      pdk: false,
    }
  }
}

impl BuildConfig for EnvConfig {
  fn getenv(&self, name: &str) -> String {
    std::env::var(name).unwrap_or_default()
  }

  fn unbundled_build(&self) -> bool {
    self.unbundled
  }

  fn is_pdk_build(&self) -> bool {
    self.pdk
  }

  fn prebuilt_os(&self) -> String {
    Os::current().expect("unsupported host os").prebuilt_tag().to_string()
  }

  fn host_os(&self) -> String {
    Os::current().expect("unsupported host os").as_str().to_string()
  }

  fn source_root(&self) -> &Path {
    &self.source_root
  }
}
