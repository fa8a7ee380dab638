//! Java toolchain configuration variables.
//!
//! Declarative registry of the toolchain executables, flags, and jars the
//! build-graph generator needs when emitting Java compile and packaging
//! actions. Everything here is data plus small per-tool selection functions;
//! the resolution engine does the rest.

use std::path::Path;
use std::sync::Arc;

use crate::context::PackageContext;
use crate::error::VarError;

pub const DEFAULT_BOOTCLASSPATH_LIBRARIES: &[&str] = &["core-oj", "core-libart"];
pub const DEFAULT_SYSTEM_MODULES: &str = "core-system-modules";
pub const DEFAULT_LIBRARIES: &[&str] = &["ext", "framework", "okhttp"];

pub const DEFAULT_JACOCO_EXCLUDE_FILTER: &[&str] = &["org.junit.*", "org.jacoco.*", "org.mockito.*"];

pub const INSTRUMENT_FRAMEWORK_MODULES: &[&str] = &[
  "framework",
  "telephony-common",
  "services",
  "android.car",
  "android.car7",
  "core-oj",
];

/// Create the Java toolchain context with every variable declared.
pub fn java_context() -> Result<Arc<PackageContext>, VarError> {
  let ctx = PackageContext::new("javelin/java");
  register(&ctx)?;
  Ok(ctx)
}

/// Declare the Java toolchain variables into `ctx`.
pub fn register(ctx: &PackageContext) -> Result<(), VarError> {
  ctx.static_variable("JavacHeapSize", "2048M")?;
  ctx.template_variable("JavacHeapFlags", "-J-Xmx${JavacHeapSize}")?;

  ctx.static_variable(
    "CommonJdkFlags",
    [
      "-Xmaxerrs 9999999",
      "-encoding UTF-8",
      r#"-sourcepath """#,
      "-g",
      // Turbine leaves out bridges which can cause javac to unnecessarily
      // insert them into subclasses. Setting this flag causes our custom
      // javac to assume that the missing bridges will exist at runtime and
      // not recreate them in subclasses. If a different javac is used the
      // flag will be ignored and extra bridges will be inserted.
      "-XDskipDuplicateBridges=true",
      // Prevent using java.lang.invoke.StringConcatFactory when targeting 1.9.
      "-XDstringConcat=inline",
    ]
    .join(" "),
  )?;

  ctx.variable_func("hostPrebuiltTag", |cx| Ok(cx.prebuilt_os()))?;

  // Set up and guaranteed by the build launcher.
  ctx.variable_func("JavaHome", |cx| cx.require_env("JAVELIN_JAVA_HOME"))?;

  ctx.source_path_variable("JavaToolchain", "${JavaHome}/bin")?;
  ctx.source_path_variable_with_env_override("JavacCmd", "${JavaToolchain}/javac", "ALTERNATE_JAVAC")?;
  ctx.source_path_variable("JavaCmd", "${JavaToolchain}/java")?;
  ctx.source_path_variable("JarCmd", "${JavaToolchain}/jar")?;
  ctx.source_path_variable("JavadocCmd", "${JavaToolchain}/javadoc")?;
  ctx.source_path_variable("JlinkCmd", "${JavaToolchain}/jlink")?;
  ctx.source_path_variable("JmodCmd", "${JavaToolchain}/jmod")?;
  ctx.source_path_variable("JrtFsJar", "${JavaHome}/lib/jrt-fs.jar")?;
  ctx.source_path_variable("Ziptime", "prebuilts/build-tools/${hostPrebuiltTag}/bin/ziptime")?;

  ctx.source_path_variable("ExtractSrcJarsCmd", "build/javelin/scripts/extract-srcjars.sh")?;
  ctx.source_path_variable("JarArgsCmd", "build/javelin/scripts/jar-args.sh")?;
  ctx.host_bin_tool_variable("JavelinZipCmd", "javelin_zip")?;
  ctx.host_bin_tool_variable("MergeZipsCmd", "merge_zips")?;
  ctx.host_bin_tool_variable("Zip2ZipCmd", "zip2zip")?;

  ctx.variable_func("DxCmd", |cx| {
    if cx.is_env_false("USE_D8") {
      if cx.unbundled_build() || cx.is_pdk_build() {
        Ok("prebuilts/build-tools/common/bin/dx".to_string())
      } else {
        cx.host_bin_tool_path("dx")
      }
    } else {
      cx.host_bin_tool_path("d8-compat-dx")
    }
  })?;

  ctx.host_bin_tool_variable("D8Cmd", "d8")?;

  ctx.variable_func("TurbineJar", |cx| {
    let turbine = "turbine.jar";
    if cx.unbundled_build() {
      Ok(format!("prebuilts/build-tools/common/framework/{turbine}"))
    } else {
      cx.host_java_tool_path(turbine)
    }
  })?;

  ctx.host_java_tool_variable("JarjarCmd", "jarjar.jar")?;
  ctx.host_java_tool_variable("DesugarJar", "desugar.jar")?;

  ctx.host_bin_tool_variable("JavelinJavacWrapper", "javelin_javac_wrapper")?;

  ctx.variable_func("JavacWrapper", |cx| {
    let override_value = cx.getenv("JAVAC_WRAPPER");
    if !override_value.is_empty() {
      return Ok(override_value + " ");
    }
    Ok(String::new())
  })?;

  ctx.host_java_tool_variable("JacocoCLIJar", "jacoco-cli.jar")?;

  host_bin_tool_with_prebuilt(ctx, "Aapt2Cmd", "prebuilts/sdk/tools", "aapt2")?;

  Ok(())
}

/// Declare a host binary tool that falls back to a checked-in prebuilt for
/// unbundled and partner-delivery-kit builds.
fn host_bin_tool_with_prebuilt(
  ctx: &PackageContext,
  name: &str,
  prebuilt_dir: &'static str,
  tool: &'static str,
) -> Result<(), VarError> {
  ctx.variable_func(name, move |cx| {
    if cx.unbundled_build() || cx.is_pdk_build() {
      let path = Path::new(prebuilt_dir).join(cx.host_os()).join("bin").join(tool);
      Ok(path.to_string_lossy().into_owned())
    } else {
      cx.host_bin_tool_path(tool)
    }
  })
}
