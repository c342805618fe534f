//! Manifest validation and normalization.
//!
//! The packer owns everything between "the manifest parsed" and "the builder
//! can consume it": a structural validity check and a normalization pass
//! (`munge`). The orchestrator only sees the trait.

use async_trait::async_trait;

use crate::manifest::Manifest;
use crate::options::Options;

/// Packer contract consumed by the orchestrator.
#[async_trait]
pub trait Packer: Send + Sync {
  /// Structural validity beyond the serde shape check.
  fn valid(&self, manifest: &Manifest) -> bool;

  /// Normalize a manifest and the run options before dispatch.
  async fn munge(&self, manifest: Manifest, options: Options) -> (Manifest, Options);
}

/// Default packer.
///
/// A manifest is valid when it defines at least one build. Normalization
/// backfills build and rollup names from their mapping keys and drops rollups
/// that aggregate nothing.
#[derive(Debug, Default)]
pub struct StandardPacker;

#[async_trait]
impl Packer for StandardPacker {
  fn valid(&self, manifest: &Manifest) -> bool {
    !manifest.builds.is_empty()
  }

  async fn munge(&self, mut manifest: Manifest, options: Options) -> (Manifest, Options) {
    for (name, build) in manifest.builds.iter_mut() {
      if build.name.is_none() {
        build.name = Some(name.clone());
      }
    }

    if let Some(rollups) = manifest.rollups.as_mut() {
      for (name, rollup) in rollups.iter_mut() {
        if rollup.name.is_none() {
          rollup.name = Some(name.clone());
        }
      }
      rollups.retain(|_, rollup| !rollup.files.is_empty());
      if rollups.is_empty() {
        manifest.rollups = None;
      }
    }

    (manifest, options)
  }
}
