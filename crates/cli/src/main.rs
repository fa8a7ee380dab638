use std::path::PathBuf;

use anyhow::{Context as _, Result, bail};
use clap::{Parser, Subcommand};
use javelin_config::config::{BuildConfig, EnvConfig};
use javelin_config::context::{PackageContext, ResolveEnv};
use javelin_config::java;
use javelin_config::locator::HostToolDirs;
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// javelin - inspect resolved build configuration variables
#[derive(Parser)]
#[command(name = "javelin")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Root of the build source tree
  #[arg(long, global = true)]
  source_root: Option<PathBuf>,

  /// Build output directory holding host tools under host/<prebuilt-tag>/
  #[arg(long, global = true)]
  out_dir: Option<PathBuf>,

  /// Resolve as an unbundled build (prefer checked-in prebuilt tools)
  #[arg(long, global = true)]
  unbundled: bool,

  /// Resolve as a partner-delivery-kit build
  #[arg(long, global = true)]
  pdk: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Resolve and print every declared variable
  Dump {
    /// Print as a JSON object
    #[arg(long)]
    json: bool,
  },

  /// Resolve specific variables by name
  Get {
    /// Variable names, optionally qualified as ns.Name
    #[arg(required = true)]
    names: Vec<String>,
  },
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::from_default_env())
    .without_time()
    .init();

  let cli = Cli::parse();

  let source_root = cli.source_root.clone().unwrap_or_default();
  let out_dir = cli.out_dir.clone().unwrap_or_else(|| PathBuf::from("out"));

  let config = EnvConfig {
    source_root,
    unbundled: cli.unbundled,
    pdk: cli.pdk,
  };
  let tools = HostToolDirs::under_out(&out_dir, &config.prebuilt_os());

  let ctx = java::java_context()?;
  ctx.validate()?;
  debug!(vars = ctx.names().len(), ctx = ctx.name(), "registered java toolchain context");

  let env = ResolveEnv {
    config: &config,
    tools: &tools,
  };

  match cli.command {
    Commands::Dump { json } => cmd_dump(&ctx, &env, json),
    Commands::Get { names } => cmd_get(&ctx, &env, &names),
  }
}

fn cmd_dump(ctx: &PackageContext, env: &ResolveEnv<'_>, json: bool) -> Result<()> {
  let names = ctx.names();
  let mut failures = 0usize;

  if json {
    let mut values = serde_json::Map::new();
    for name in &names {
      match ctx.resolve(name, env) {
        Ok(value) => {
          values.insert(name.clone(), serde_json::Value::String(value));
        }
        Err(error) => {
          failures += 1;
          eprintln!("{} {name}: {error}", "error:".red().bold());
        }
      }
    }
    println!("{}", serde_json::to_string_pretty(&serde_json::Value::Object(values))?);
  } else {
    let width = names.iter().map(String::len).max().unwrap_or(0);
    for name in &names {
      match ctx.resolve(name, env) {
        Ok(value) => println!("{name:<width$} = {value}"),
        Err(error) => {
          failures += 1;
          println!("{name:<width$} {} {error}", "!!".red().bold());
        }
      }
    }
  }

  if failures > 0 {
    bail!("failed to resolve {failures} variable(s)");
  }
  Ok(())
}

fn cmd_get(ctx: &PackageContext, env: &ResolveEnv<'_>, names: &[String]) -> Result<()> {
  for name in names {
    let value = ctx
      .resolve(name, env)
      .with_context(|| format!("resolving {name}"))?;
    println!("{value}");
  }
  Ok(())
}
