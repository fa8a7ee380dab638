//! CLI smoke tests for javelin.
//!
//! These run the binary end to end against temporary host-tool trees and
//! a pinned environment, covering both resolution successes and the
//! user-visible failure messages.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use javelin_config::platform::Os;
use predicates::prelude::*;
use serial_test::serial;
use tempfile::TempDir;

/// Get a Command for the javelin binary with resolution-relevant
/// environment variables cleared.
fn javelin_cmd() -> Command {
  let mut cmd = cargo_bin_cmd!("javelin");
  for var in ["JAVELIN_JAVA_HOME", "ALTERNATE_JAVAC", "USE_D8", "JAVAC_WRAPPER", "RUST_LOG"] {
    cmd.env_remove(var);
  }
  cmd
}

/// Create an output directory populated with every host tool the Java
/// toolchain registry can ask for.
fn host_tool_tree() -> TempDir {
  let temp = TempDir::new().unwrap();
  let tag = Os::current().unwrap().prebuilt_tag();
  let host = temp.path().join("host").join(tag);
  let bin = host.join("bin");
  let framework = host.join("framework");
  std::fs::create_dir_all(&bin).unwrap();
  std::fs::create_dir_all(&framework).unwrap();

  for tool in [
    "javelin_zip",
    "merge_zips",
    "zip2zip",
    "dx",
    "d8",
    "d8-compat-dx",
    "javelin_javac_wrapper",
    "aapt2",
  ] {
    std::fs::write(bin.join(tool), "").unwrap();
  }
  for jar in ["turbine.jar", "jarjar.jar", "desugar.jar", "jacoco-cli.jar"] {
    std::fs::write(framework.join(jar), "").unwrap();
  }

  temp
}

// =============================================================================
// Help & Version
// =============================================================================

#[test]
fn help_flag_works() {
  javelin_cmd()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicate::str::contains("Usage"));
}

#[test]
fn version_flag_works() {
  javelin_cmd()
    .arg("--version")
    .assert()
    .success()
    .stdout(predicate::str::contains("javelin"));
}

#[test]
fn subcommand_help_works() {
  for cmd in &["dump", "get"] {
    javelin_cmd()
      .arg(cmd)
      .arg("--help")
      .assert()
      .success()
      .stdout(predicate::str::contains("Usage"));
  }
}

// =============================================================================
// get
// =============================================================================

#[test]
#[serial]
fn get_static_variable() {
  javelin_cmd()
    .args(["get", "JavacHeapSize"])
    .assert()
    .success()
    .stdout(predicate::str::contains("2048M"));
}

#[test]
#[serial]
fn get_interpolates_heap_flags() {
  javelin_cmd()
    .args(["get", "JavacHeapFlags"])
    .assert()
    .success()
    .stdout(predicate::str::contains("-J-Xmx2048M"));
}

#[test]
#[serial]
fn get_unknown_variable_fails() {
  javelin_cmd()
    .args(["get", "NoSuchVar"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("unresolved reference"));
}

#[test]
#[serial]
fn get_dx_prebuilt_when_unbundled() {
  javelin_cmd()
    .env("USE_D8", "false")
    .args(["--unbundled", "get", "DxCmd"])
    .assert()
    .success()
    .stdout(predicate::str::contains("prebuilts/build-tools/common/bin/dx"));
}

#[test]
#[serial]
fn get_dx_missing_host_tool_fails() {
  let out = TempDir::new().unwrap();

  javelin_cmd()
    .env("USE_D8", "false")
    .arg("--out-dir")
    .arg(out.path())
    .args(["get", "DxCmd"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("host tool not found"));
}

#[test]
#[serial]
fn get_java_home_requires_launcher_env() {
  javelin_cmd()
    .args(["get", "JavaHome"])
    .assert()
    .failure()
    .stderr(predicate::str::contains("JAVELIN_JAVA_HOME"));
}

#[test]
#[serial]
fn get_alternate_javac_overrides() {
  javelin_cmd()
    .env("ALTERNATE_JAVAC", "/opt/javac9")
    .args(["get", "JavacCmd"])
    .assert()
    .success()
    .stdout(predicate::str::contains("/opt/javac9"));
}

// =============================================================================
// dump
// =============================================================================

#[test]
#[serial]
fn dump_resolves_full_tree() {
  let out = host_tool_tree();

  javelin_cmd()
    .env("JAVELIN_JAVA_HOME", "/usr/lib/jvm/test-jdk")
    .arg("--out-dir")
    .arg(out.path())
    .arg("dump")
    .assert()
    .success()
    .stdout(predicate::str::contains("JavacCmd"))
    .stdout(predicate::str::contains("/usr/lib/jvm/test-jdk/bin/javac"));
}

#[test]
#[serial]
fn dump_json_outputs_object() {
  let out = host_tool_tree();

  javelin_cmd()
    .env("JAVELIN_JAVA_HOME", "/usr/lib/jvm/test-jdk")
    .arg("--out-dir")
    .arg(out.path())
    .args(["dump", "--json"])
    .assert()
    .success()
    .stdout(predicate::str::contains("\"JavacHeapSize\": \"2048M\""));
}

#[test]
#[serial]
fn dump_reports_failures() {
  let out = TempDir::new().unwrap();

  javelin_cmd()
    .env("JAVELIN_JAVA_HOME", "/usr/lib/jvm/test-jdk")
    .arg("--out-dir")
    .arg(out.path())
    .arg("dump")
    .assert()
    .failure()
    .stdout(predicate::str::contains("JavacHeapSize"))
    .stderr(predicate::str::contains("failed to resolve"));
}
