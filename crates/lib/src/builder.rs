//! Artifact builder contract.
//!
//! The builder receives a normalized manifest and turns it into artifacts.
//! The transformation pipeline itself (concatenation, minification) lives
//! outside this crate; the orchestrator only needs the dispatch seam and the
//! guarantee that `start` returns exactly once per dispatch.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::manifest::Manifest;
use crate::options::Options;

/// Artifact builder contract consumed by the orchestrator.
#[async_trait]
pub trait ArtifactBuilder: Send + Sync {
  /// Clear per-run builder state before a new dispatch.
  fn reset(&self);

  /// Build every module in the manifest. Must return exactly once; build
  /// failures are handled inside the builder.
  async fn start(&self, manifest: &Manifest, options: &Options);
}

/// Default builder: creates the output directory and traces each build it
/// would process. Real artifact production is wired in by embedders.
#[derive(Debug, Default)]
pub struct TraceBuilder;

#[async_trait]
impl ArtifactBuilder for TraceBuilder {
  fn reset(&self) {}

  async fn start(&self, manifest: &Manifest, options: &Options) {
    if let Err(err) = std::fs::create_dir_all(&options.build_path) {
      warn!(path = %options.build_path.display(), %err, "could not create the build directory");
    }

    for name in manifest.build_names() {
      info!(build = %name, "building module");
    }
    if let Some(rollups) = &manifest.rollups {
      for name in rollups.keys() {
        info!(rollup = %name, "building rollup");
      }
    }
    info!(count = manifest.builds.len(), dir = %options.build_path.display(), "build batch done");
  }
}
