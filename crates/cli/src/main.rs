use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gearbox_lib::options::CallerOptions;
use gearbox_lib::orchestrate::{ExitReason, Orchestrator, RunOutcome};
use gearbox_lib::queue::BuildQueue;
use tracing_subscriber::EnvFilter;

mod output;

/// gearbox - turns a declarative build.json manifest into build artifacts
#[derive(Debug, Parser)]
#[command(name = "gearbox", version, about)]
struct Cli {
  /// Path to the build manifest (default: <cwd>/build.json)
  #[arg(long)]
  config: Option<PathBuf>,

  /// Working directory for this run
  #[arg(long)]
  cwd: Option<PathBuf>,

  /// Artifact output directory
  #[arg(long = "build-dir")]
  build_dir: Option<String>,

  /// Watch source files and rebuild on change
  #[arg(long)]
  watch: bool,

  /// Only print warnings and errors
  #[arg(long)]
  quiet: bool,

  /// Print nothing at all
  #[arg(long)]
  silent: bool,

  /// List the builds the manifest defines instead of building
  #[arg(long)]
  list: bool,

  /// Report nested manifests instead of building when none is found here
  #[arg(long)]
  walk: bool,

  /// Convert legacy build scripts and stop
  #[arg(long)]
  ant: bool,

  /// Skip the ancestry search for a .gearbox.json global config
  #[arg(long = "no-global-config")]
  no_global_config: bool,
}

impl Cli {
  fn into_options(self) -> CallerOptions {
    CallerOptions {
      config: self.config,
      cwd: self.cwd,
      build_dir: self.build_dir,
      watch: self.watch.then_some(true),
      quiet: self.quiet.then_some(true),
      silent: self.silent.then_some(true),
      list: self.list.then_some(true),
      walk: self.walk.then_some(true),
      ant: self.ant.then_some(true),
      global_config: self.no_global_config.then_some(false),
      // clap answers --help and --version itself; the engine's own
      // help/version exit path is for embedders.
      version: None,
      help: None,
    }
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .without_time()
    .init();

  let cli = Cli::parse();

  let cwd = std::env::current_dir().context("failed to resolve the current directory")?;
  let queue = BuildQueue::new(Orchestrator::new(cwd));

  let rt = tokio::runtime::Runtime::new().context("failed to create async runtime")?;
  let outcomes = rt.block_on(queue.enqueue(cli.into_options(), || {}));

  // A fresh queue always drains the one request it was handed.
  match outcomes.last() {
    Some(RunOutcome::Completed) => {
      output::print_success(&format!("artifacts written to {}", queue.build_dir().display()));
      Ok(())
    }
    Some(RunOutcome::EarlyExit(reason)) => {
      output::print_info(describe_exit(*reason));
      Ok(())
    }
    Some(RunOutcome::Fatal(err)) => {
      output::print_error(&err.to_string());
      std::process::exit(1);
    }
    None => Ok(()),
  }
}

fn describe_exit(reason: ExitReason) -> &'static str {
  match reason {
    ExitReason::HelpVersion => "nothing to build",
    ExitReason::WatchHandoff => "handed off to the file watcher",
    ExitReason::WalkHandoff => "walk finished",
    ExitReason::ListAndStop => "list finished",
    ExitReason::AntOnlyStop => "conversion finished",
  }
}
