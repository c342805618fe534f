//! Run-scoped logging.
//!
//! The engine reports progress through the [`BuildLog`] trait rather than
//! calling `tracing` directly, so embedders can capture or redirect a run's
//! output. `reset` is called at the start of every run; `quiet`/`silent`
//! narrow the output for the remainder of the run.
//!
//! `emit` is the user-facing payload channel (list results, usage text) and
//! is distinct from progress logging: payload goes to stdout, progress goes
//! to the tracing subscriber.

use std::sync::atomic::{AtomicU8, Ordering};

const LEVEL_NORMAL: u8 = 0;
const LEVEL_QUIET: u8 = 1;
const LEVEL_SILENT: u8 = 2;

/// Logging contract consumed by the orchestration engine.
pub trait BuildLog: Send + Sync {
  /// Restore full output at the start of a run.
  fn reset(&self);
  /// Drop info output for the rest of the run.
  fn quiet(&self);
  /// Drop everything except errors for the rest of the run.
  fn silent(&self);
  fn info(&self, msg: &str);
  fn warn(&self, msg: &str);
  fn error(&self, msg: &str);
  /// User-facing payload output.
  fn emit(&self, msg: &str);
}

/// Production [`BuildLog`] backed by `tracing`, with payload on stdout.
#[derive(Debug, Default)]
pub struct TracingLog {
  level: AtomicU8,
}

impl TracingLog {
  pub fn new() -> Self {
    Self::default()
  }

  fn level(&self) -> u8 {
    self.level.load(Ordering::Relaxed)
  }
}

impl BuildLog for TracingLog {
  fn reset(&self) {
    self.level.store(LEVEL_NORMAL, Ordering::Relaxed);
  }

  fn quiet(&self) {
    self.level.store(LEVEL_QUIET, Ordering::Relaxed);
  }

  fn silent(&self) {
    self.level.store(LEVEL_SILENT, Ordering::Relaxed);
  }

  fn info(&self, msg: &str) {
    if self.level() == LEVEL_NORMAL {
      tracing::info!("{msg}");
    }
  }

  fn warn(&self, msg: &str) {
    if self.level() < LEVEL_SILENT {
      tracing::warn!("{msg}");
    }
  }

  fn error(&self, msg: &str) {
    tracing::error!("{msg}");
  }

  fn emit(&self, msg: &str) {
    if self.level() < LEVEL_SILENT {
      println!("{msg}");
    }
  }
}
