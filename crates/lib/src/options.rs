//! Build request options.
//!
//! Options come in two shapes. [`CallerOptions`] is the all-optional form a
//! caller hands to the queue: `None` means "not supplied", which is what the
//! global-config overlay keys off. [`Options`] is the fully resolved form one
//! run operates on, produced by [`crate::config::resolve`].
//!
//! [`CallerOptions`] also deserializes the global config file itself (both use
//! kebab-case keys), so a file can set any key a caller can.

use std::path::PathBuf;

use serde::Deserialize;

/// Options as supplied by a caller or a global config file.
///
/// Every field is optional; unset fields fall back to global config file
/// values and then to built-in defaults during resolution. A caller-supplied
/// value is never overwritten by a file value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct CallerOptions {
  /// Manifest path override. Relative paths resolve against the working directory.
  pub config: Option<PathBuf>,
  /// Working directory for this and all following runs.
  pub cwd: Option<PathBuf>,
  /// Artifact output directory.
  pub build_dir: Option<String>,
  /// Hand off to the file watcher instead of building.
  pub watch: Option<bool>,
  /// Only print warnings and errors.
  pub quiet: Option<bool>,
  /// Print nothing at all.
  pub silent: Option<bool>,
  /// List the builds defined in the manifest instead of building.
  pub list: Option<bool>,
  /// Walk the tree for nested manifests when none is found here.
  pub walk: Option<bool>,
  /// Convert legacy build scripts and stop (no build afterwards).
  pub ant: Option<bool>,
  /// Search the directory ancestry for a global config file.
  pub global_config: Option<bool>,
  /// Print version information and stop.
  pub version: Option<bool>,
  /// Print usage information and stop.
  pub help: Option<bool>,
}

/// Fully resolved options for a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct Options {
  /// Manifest path override as supplied, if any.
  pub config: Option<PathBuf>,
  /// Effective working directory.
  pub cwd: PathBuf,
  /// Configured artifact output directory (possibly relative).
  pub build_dir: String,
  /// Absolute artifact output directory, re-rooted at the global config
  /// directory when the global config file defines `build-dir`.
  pub build_path: PathBuf,
  pub watch: bool,
  pub quiet: bool,
  pub silent: bool,
  pub list: bool,
  pub walk: bool,
  pub ant: bool,
  pub global_config: bool,
  pub version: bool,
  pub help: bool,
  /// Absolute path of the manifest this run looks for.
  pub build_file: PathBuf,
  /// Base file name of `build_file`.
  pub build_file_name: String,
}
