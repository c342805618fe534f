//! File-watch collaborator.
//!
//! Watch mode hands build triggering over entirely: once `start` is called
//! the watcher owns all subsequent builds and the queue/callback contract no
//! longer applies. Watching internals live outside this crate.

use tracing::warn;

use crate::options::Options;

/// File watcher contract consumed by the orchestrator.
pub trait FileWatcher: Send + Sync {
  /// Fire-and-forget handoff; takes over build triggering entirely.
  fn start(&self, options: &Options);
}

/// Default watcher: no watching backend is wired in, so the handoff is only
/// reported. Embedders supply a real watcher.
#[derive(Debug, Default)]
pub struct NullWatcher;

impl FileWatcher for NullWatcher {
  fn start(&self, options: &Options) {
    warn!(path = %options.cwd.display(), "watch mode requested but no watcher is wired in");
  }
}
