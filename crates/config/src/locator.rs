//! Locating host-built tools.
//!
//! Variables that point at tools built for the host (as opposed to prebuilt
//! binaries checked into the source tree) go through a [`HostToolLocator`].
//! The engine calls the locator at most once per variable; the memoized
//! result is reused for every later lookup.

use std::path::{Path, PathBuf};

use crate::error::VarError;

/// Resolves host tool names to filesystem paths.
pub trait HostToolLocator: Send + Sync {
  /// Path of a host-built binary tool.
  fn host_bin_tool_path(&self, tool: &str) -> Result<PathBuf, VarError>;

  /// Path of a host-built Java tool (a jar in the host framework directory).
  fn host_java_tool_path(&self, tool: &str) -> Result<PathBuf, VarError>;
}

/// [`HostToolLocator`] backed by the host output directories of a build tree.
#[derive(Debug, Clone)]
pub struct HostToolDirs {
  pub bin_dir: PathBuf,
  pub framework_dir: PathBuf,
}

impl HostToolDirs {
  pub fn new(bin_dir: impl Into<PathBuf>, framework_dir: impl Into<PathBuf>) -> Self {
    Self {
      bin_dir: bin_dir.into(),
      framework_dir: framework_dir.into(),
    }
  }

  /// The conventional layout under a build output directory:
  /// `<out>/host/<prebuilt-tag>/{bin,framework}`.
  pub fn under_out(out_dir: &Path, prebuilt_tag: &str) -> Self {
    let host = out_dir.join("host").join(prebuilt_tag);
    Self {
      bin_dir: host.join("bin"),
      framework_dir: host.join("framework"),
    }
  }

  fn locate(dir: &Path, tool: &str) -> Result<PathBuf, VarError> {
    let path = dir.join(tool);
    if path.is_file() {
      Ok(path)
    } else {
      Err(VarError::ToolNotFound {
        tool: tool.to_string(),
        searched: dir.display().to_string(),
      })
    }
  }
}

impl HostToolLocator for HostToolDirs {
  fn host_bin_tool_path(&self, tool: &str) -> Result<PathBuf, VarError> {
    Self::locate(&self.bin_dir, tool)
  }

  fn host_java_tool_path(&self, tool: &str) -> Result<PathBuf, VarError> {
    Self::locate(&self.framework_dir, tool)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  fn tool_tree() -> (TempDir, HostToolDirs) {
    let temp = TempDir::new().unwrap();
    let dirs = HostToolDirs::under_out(temp.path(), "linux-x86");
    std::fs::create_dir_all(&dirs.bin_dir).unwrap();
    std::fs::create_dir_all(&dirs.framework_dir).unwrap();
    (temp, dirs)
  }

  #[test]
  fn under_out_layout() {
    let dirs = HostToolDirs::under_out(Path::new("out"), "linux-x86");
    assert_eq!(dirs.bin_dir, PathBuf::from("out/host/linux-x86/bin"));
    assert_eq!(dirs.framework_dir, PathBuf::from("out/host/linux-x86/framework"));
  }

  #[test]
  fn finds_existing_bin_tool() {
    let (_temp, dirs) = tool_tree();
    std::fs::write(dirs.bin_dir.join("dx"), "").unwrap();

    let path = dirs.host_bin_tool_path("dx").unwrap();
    assert_eq!(path, dirs.bin_dir.join("dx"));
  }

  #[test]
  fn finds_existing_java_tool() {
    let (_temp, dirs) = tool_tree();
    std::fs::write(dirs.framework_dir.join("turbine.jar"), "").unwrap();

    let path = dirs.host_java_tool_path("turbine.jar").unwrap();
    assert_eq!(path, dirs.framework_dir.join("turbine.jar"));
  }

  #[test]
  fn missing_tool_reports_searched_directory() {
    let (_temp, dirs) = tool_tree();

    let result = dirs.host_bin_tool_path("dx");
    match result {
      Err(VarError::ToolNotFound { tool, searched }) => {
        assert_eq!(tool, "dx");
        assert_eq!(searched, dirs.bin_dir.display().to_string());
      }
      other => panic!("expected ToolNotFound, got {other:?}"),
    }
  }

  #[test]
  fn directory_is_not_a_tool() {
    let (_temp, dirs) = tool_tree();
    std::fs::create_dir(dirs.bin_dir.join("dx")).unwrap();

    assert!(matches!(
      dirs.host_bin_tool_path("dx"),
      Err(VarError::ToolNotFound { .. })
    ));
  }
}
