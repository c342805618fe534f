//! Build manifest loading.
//!
//! A manifest (`build.json`) is plain structured data: it is deserialized,
//! never executed. Loading is split in two so the orchestrator can tell a
//! malformed file ([`ManifestError::Parse`]) apart from a well-formed file
//! that does not describe builds ([`ManifestError::Shape`] /
//! [`ManifestError::Invalid`]); the two are distinct fatal outcomes.

mod types;

pub use types::*;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors raised while loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
  /// The manifest file exists but could not be read.
  #[error("failed to read {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The manifest file is not well-formed JSON.
  #[error("{path} is not well-formed JSON: {source}")]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  /// The manifest is well-formed JSON but not a recognized build manifest.
  #[error("{path} is not a recognized build manifest: {source}")]
  Shape {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  /// The manifest parsed but defines nothing buildable.
  #[error("{path} does not define any builds")]
  Invalid { path: PathBuf },
}

/// Read a manifest file and parse it as JSON, without interpreting the shape.
pub fn load_raw(path: &Path) -> Result<serde_json::Value, ManifestError> {
  let raw = fs::read_to_string(path).map_err(|source| ManifestError::Read {
    path: path.to_path_buf(),
    source,
  })?;
  serde_json::from_str(&raw).map_err(|source| ManifestError::Parse {
    path: path.to_path_buf(),
    source,
  })
}

impl Manifest {
  /// Interpret parsed JSON as a build manifest.
  pub fn from_value(path: &Path, value: serde_json::Value) -> Result<Self, ManifestError> {
    serde_json::from_value(value).map_err(|source| ManifestError::Shape {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Build names in sorted order.
  pub fn build_names(&self) -> Vec<String> {
    self.builds.keys().cloned().collect()
  }

  /// Rollup names in sorted order; empty when the manifest has no rollups.
  pub fn rollup_names(&self) -> Vec<String> {
    self
      .rollups
      .as_ref()
      .map(|r| r.keys().cloned().collect())
      .unwrap_or_default()
  }
}
