//! Test doubles for the build configuration snapshot and host-tool locator.
//!
//! Tests use these to pin environment, mode flags, and tool locations
//! without touching the process environment or the filesystem.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::config::BuildConfig;
use crate::error::VarError;
use crate::locator::HostToolLocator;

/// In-memory [`BuildConfig`] with explicit environment and mode flags.
#[derive(Debug, Clone)]
pub struct FakeConfig {
  pub env: HashMap<String, String>,
  pub unbundled: bool,
  pub pdk: bool,
  pub source_root: PathBuf,
  pub prebuilt_tag: String,
  pub os: String,
}

impl Default for FakeConfig {
  fn default() -> Self {
    Self {
      env: HashMap::new(),
      unbundled: false,
      pdk: false,
      source_root: PathBuf::new(),
      prebuilt_tag: "linux-x86".to_string(),
      os: "linux".to_string(),
    }
  }
}

impl FakeConfig {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_env(mut self, name: &str, value: &str) -> Self {
    self.env.insert(name.to_string(), value.to_string());
    self
  }
}

impl BuildConfig for FakeConfig {
  fn getenv(&self, name: &str) -> String {
    self.env.get(name).cloned().unwrap_or_default()
  }

  fn unbundled_build(&self) -> bool {
    self.unbundled
  }

  fn is_pdk_build(&self) -> bool {
    self.pdk
  }

  fn prebuilt_os(&self) -> String {
    self.prebuilt_tag.clone()
  }

  fn host_os(&self) -> String {
    self.os.clone()
  }

  fn source_root(&self) -> &Path {
    &self.source_root
  }
}

/// In-memory [`HostToolLocator`] mapping tool names to fixed paths.
#[derive(Debug, Clone, Default)]
pub struct FakeTools {
  pub bin: HashMap<String, String>,
  pub java: HashMap<String, String>,
}

impl FakeTools {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_bin(mut self, tool: &str, path: &str) -> Self {
    self.bin.insert(tool.to_string(), path.to_string());
    self
  }

  pub fn with_java(mut self, tool: &str, path: &str) -> Self {
    self.java.insert(tool.to_string(), path.to_string());
    self
  }
}

impl HostToolLocator for FakeTools {
  fn host_bin_tool_path(&self, tool: &str) -> Result<PathBuf, VarError> {
    self.bin.get(tool).map(PathBuf::from).ok_or_else(|| VarError::ToolNotFound {
      tool: tool.to_string(),
      searched: "fake host bin tools".to_string(),
    })
  }

  fn host_java_tool_path(&self, tool: &str) -> Result<PathBuf, VarError> {
    self.java.get(tool).map(PathBuf::from).ok_or_else(|| VarError::ToolNotFound {
      tool: tool.to_string(),
      searched: "fake host java tools".to_string(),
    })
  }
}
