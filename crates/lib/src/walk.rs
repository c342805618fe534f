//! Directory-walk collaborator.
//!
//! Walk mode takes over when no manifest exists and the caller asked for a
//! tree walk instead of a legacy conversion. The handoff is fire-and-forget:
//! the walker owns its own lifecycle and the queue contract ends at `run`.

use tracing::info;
use walkdir::WalkDir;

use crate::options::Options;

/// Tree walker contract consumed by the orchestrator.
pub trait TreeWalker: Send + Sync {
  fn run(&self, options: &Options);
}

/// Default walker: reports every nested manifest under the working directory.
#[derive(Debug, Default)]
pub struct ReportWalker;

impl TreeWalker for ReportWalker {
  fn run(&self, options: &Options) {
    let mut found = 0usize;
    for entry in WalkDir::new(&options.cwd).min_depth(1).into_iter().filter_map(Result::ok) {
      if entry.file_type().is_file() && entry.file_name().to_string_lossy() == options.build_file_name {
        info!(path = %entry.path().display(), "found a nested build manifest");
        found += 1;
      }
    }
    info!(count = found, "walk complete");
  }
}
