//! Usage and version output.
//!
//! Emitted through [`BuildLog::emit`] so embedders decide where it lands.
//! These runs terminate without touching the filesystem: help and version
//! short-circuit before any manifest lookup.
//!
//! This path exists for embedders driving the engine through
//! [`CallerOptions`](crate::options::CallerOptions); the gearbox binary lets
//! its argument parser answer `--help` and `--version` before a run starts.

use crate::consts::{APP_NAME, DEFAULT_BUILD_DIR, DEFAULT_BUILD_FILE, GLOBAL_CONFIG_FILENAME};
use crate::log::BuildLog;

pub fn emit_version(log: &dyn BuildLog) {
  log.emit(&format!("{APP_NAME} {}", env!("CARGO_PKG_VERSION")));
}

pub fn emit_usage(log: &dyn BuildLog) {
  log.emit(&format!("usage: {APP_NAME} [options]"));
  log.emit("");
  log.emit(&format!("  config <path>      manifest to build (default: ./{DEFAULT_BUILD_FILE})"));
  log.emit("  cwd <path>         working directory for this run");
  log.emit(&format!("  build-dir <path>   artifact output directory (default: {DEFAULT_BUILD_DIR})"));
  log.emit("  watch              watch source files and rebuild on change");
  log.emit("  list               list the builds the manifest defines");
  log.emit("  walk               report nested manifests instead of building");
  log.emit("  ant                convert legacy build scripts and stop");
  log.emit(&format!("  global-config      search ancestors for {GLOBAL_CONFIG_FILENAME} (on by default)"));
  log.emit("  quiet              only print warnings and errors");
  log.emit("  silent             print nothing at all");
  log.emit("  version            print version information");
  log.emit("  help               print this message");
}
