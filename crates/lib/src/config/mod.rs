//! Tiered configuration resolution.
//!
//! One run's effective options are merged from three layers, lowest to
//! highest precedence:
//!
//! 1. Built-in defaults
//! 2. A global config file (`.gearbox.json`) discovered by searching the
//!    working directory and its ancestors
//! 3. Caller-supplied options, which always win
//!
//! A file value is applied only where the caller left the key unset. One
//! special case: when the global config file defines `build-dir`, the build
//! directory is resolved relative to the file's directory rather than the
//! working directory — recorded even when the caller's own `build-dir`
//! override wins, so subprocess builds agree on the root.
//!
//! [`RunContext`] carries the process-wide pieces of this (effective working
//! directory, the cached discovery result, the re-root flag) inside the
//! long-lived orchestrator instead of module-level statics.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::consts::{DEFAULT_BUILD_DIR, DEFAULT_BUILD_FILE, DEFAULT_GLOBAL_CONFIG, GLOBAL_CONFIG_FILENAME};
use crate::log::BuildLog;
use crate::options::{CallerOptions, Options};
use crate::util::find::find_up;

/// Errors raised during configuration resolution.
///
/// A missing global config file is not an error; resolution proceeds with
/// defaults and caller options only.
#[derive(Debug, Error)]
pub enum ConfigError {
  /// The discovered global config file could not be read.
  #[error("failed to read global config {path}: {source}")]
  GlobalConfigRead {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The discovered global config file is not a valid key/value mapping.
  #[error("failed to parse global config {path}: {source}")]
  GlobalConfigParse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },
}

/// Process-wide resolution state, owned by the orchestrator.
#[derive(Debug)]
pub struct RunContext {
  /// The directory the context was created in. A relative caller `cwd` is
  /// always resolved against this, never against an already-adopted one, so
  /// repeated resolutions with the same options land in the same place.
  root: PathBuf,
  cwd: PathBuf,
  global_searched: bool,
  global_config_file: Option<PathBuf>,
  global_build_dir: bool,
  build_dir_value: String,
}

impl RunContext {
  pub fn new(cwd: PathBuf) -> Self {
    Self {
      root: cwd.clone(),
      cwd,
      global_searched: false,
      global_config_file: None,
      global_build_dir: false,
      build_dir_value: DEFAULT_BUILD_DIR.to_string(),
    }
  }

  /// The effective working directory.
  pub fn cwd(&self) -> &Path {
    &self.cwd
  }

  /// Like [`RunContext::cwd`], but the global config file's directory when
  /// one was discovered.
  pub fn global_cwd(&self) -> &Path {
    self
      .global_config_file
      .as_deref()
      .and_then(Path::parent)
      .unwrap_or(&self.cwd)
  }

  /// The discovered global config file, if any.
  pub fn global_config_file(&self) -> Option<&Path> {
    self.global_config_file.as_deref()
  }

  /// Whether the build directory is rooted at the global config directory.
  pub fn global_build_dir(&self) -> bool {
    self.global_build_dir
  }

  /// Absolute path of the artifact output directory.
  ///
  /// Resolved against the global config file's directory when the global
  /// config defined `build-dir`, against the working directory otherwise.
  pub fn build_dir(&self) -> PathBuf {
    let base = if self.global_build_dir { self.global_cwd() } else { self.cwd() };
    resolve_from(base, Path::new(&self.build_dir_value))
  }
}

/// Resolve one run's effective options.
///
/// Mutates `ctx`: adopts a caller-supplied working directory, caches the
/// global config discovery, and records the configured build directory for
/// [`RunContext::build_dir`].
pub fn resolve(ctx: &mut RunContext, caller: &CallerOptions, log: &dyn BuildLog) -> Result<Options, ConfigError> {
  if let Some(cwd) = &caller.cwd {
    ctx.cwd = resolve_from(&ctx.root, cwd);
  }
  let cwd = ctx.cwd.clone();

  let mut merged = caller.clone();

  if merged.global_config.unwrap_or(DEFAULT_GLOBAL_CONFIG) {
    if !ctx.global_searched {
      ctx.global_searched = true;
      log.info(&format!("looking for the closest {GLOBAL_CONFIG_FILENAME} file"));
      ctx.global_config_file = find_up(&cwd, GLOBAL_CONFIG_FILENAME);
      match &ctx.global_config_file {
        Some(file) => log.info(&format!("found a global config at {}", file.display())),
        None => log.info("no global config file found"),
      }
    }

    if let Some(file) = ctx.global_config_file.clone() {
      let global = read_global_config(&file)?;
      // The re-root flag must be recorded even when the caller's own
      // build-dir override wins.
      if global.build_dir.is_some() {
        ctx.global_build_dir = true;
      }
      overlay(&mut merged, &global, log);
    }
  }

  let build_dir = merged.build_dir.clone().unwrap_or_else(|| DEFAULT_BUILD_DIR.to_string());
  ctx.build_dir_value = build_dir.clone();

  let build_file = match &merged.config {
    Some(config) => resolve_from(&cwd, config),
    None => cwd.join(DEFAULT_BUILD_FILE),
  };
  let build_file_name = build_file
    .file_name()
    .map(|name| name.to_string_lossy().into_owned())
    .unwrap_or_else(|| DEFAULT_BUILD_FILE.to_string());

  Ok(Options {
    config: merged.config,
    cwd,
    build_path: ctx.build_dir(),
    build_dir,
    watch: merged.watch.unwrap_or(false),
    quiet: merged.quiet.unwrap_or(false),
    silent: merged.silent.unwrap_or(false),
    list: merged.list.unwrap_or(false),
    walk: merged.walk.unwrap_or(false),
    ant: merged.ant.unwrap_or(false),
    global_config: merged.global_config.unwrap_or(DEFAULT_GLOBAL_CONFIG),
    version: merged.version.unwrap_or(false),
    help: merged.help.unwrap_or(false),
    build_file,
    build_file_name,
  })
}

fn read_global_config(path: &Path) -> Result<CallerOptions, ConfigError> {
  let raw = fs::read_to_string(path).map_err(|source| ConfigError::GlobalConfigRead {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_str(&raw).map_err(|source| ConfigError::GlobalConfigParse {
    path: path.to_path_buf(),
    source,
  })
}

/// Apply global config values to keys the caller did not supply.
fn overlay(merged: &mut CallerOptions, global: &CallerOptions, log: &dyn BuildLog) {
  fn take<T: Clone>(slot: &mut Option<T>, value: &Option<T>, key: &str, log: &dyn BuildLog) {
    if slot.is_none() && value.is_some() {
      log.info(&format!("applying {key} from the global config"));
      *slot = value.clone();
    }
  }

  take(&mut merged.config, &global.config, "config", log);
  take(&mut merged.cwd, &global.cwd, "cwd", log);
  take(&mut merged.build_dir, &global.build_dir, "build-dir", log);
  take(&mut merged.watch, &global.watch, "watch", log);
  take(&mut merged.quiet, &global.quiet, "quiet", log);
  take(&mut merged.silent, &global.silent, "silent", log);
  take(&mut merged.list, &global.list, "list", log);
  take(&mut merged.walk, &global.walk, "walk", log);
  take(&mut merged.ant, &global.ant, "ant", log);
  take(&mut merged.global_config, &global.global_config, "global-config", log);
  take(&mut merged.version, &global.version, "version", log);
  take(&mut merged.help, &global.help, "help", log);
}

/// Resolve `path` against `base` unless it is already absolute.
fn resolve_from(base: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() {
    dunce::simplified(path).to_path_buf()
  } else {
    dunce::simplified(&base.join(path)).to_path_buf()
  }
}
