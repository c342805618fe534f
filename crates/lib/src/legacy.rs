//! Legacy build-script conversion.
//!
//! When no manifest exists and walk mode was not requested, the orchestrator
//! hands off to a converter that is expected to produce a usable manifest at
//! the expected path; the orchestrator then retries resolution from the top.
//! A converter that reports success without producing a manifest makes that
//! retry loop forever — documented behavior, bounded only by an injected
//! retry limit.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::manifest::{BuildSpec, Manifest};
use crate::options::Options;

/// Errors raised by the legacy converter.
#[derive(Debug, Error)]
pub enum ConvertError {
  /// No legacy build scripts were found to convert.
  #[error("no legacy build scripts found under {0}")]
  NothingToConvert(PathBuf),

  /// The converted manifest could not be encoded.
  #[error("failed to encode the converted manifest: {0}")]
  Encode(#[from] serde_json::Error),

  /// The converted manifest could not be written.
  #[error("failed to write {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

/// Legacy converter contract consumed by the orchestrator.
#[async_trait]
pub trait LegacyConverter: Send + Sync {
  /// Convert legacy build scripts into a manifest at the expected path.
  async fn process(&self, options: &Options) -> Result<(), ConvertError>;
}

/// Default converter for ant-style projects.
///
/// Looks for a `build.xml` next to the expected manifest location and
/// synthesizes a minimal manifest with one build named after the containing
/// directory. Full ant property translation is left to dedicated tooling;
/// finding nothing convertible is an error rather than a silent success, so
/// the default wiring cannot spin in the retry loop.
#[derive(Debug, Default)]
pub struct AntConverter;

/// Ant build script file name.
const ANT_BUILD_FILE: &str = "build.xml";

#[async_trait]
impl LegacyConverter for AntConverter {
  async fn process(&self, options: &Options) -> Result<(), ConvertError> {
    let dir = options
      .build_file
      .parent()
      .map(PathBuf::from)
      .unwrap_or_else(|| options.cwd.clone());

    let script = dir.join(ANT_BUILD_FILE);
    if !script.is_file() {
      return Err(ConvertError::NothingToConvert(dir));
    }

    let module = dir
      .file_name()
      .map(|name| name.to_string_lossy().into_owned())
      .unwrap_or_else(|| "module".to_string());

    let mut builds = BTreeMap::new();
    builds.insert(module.clone(), BuildSpec::default());
    let manifest = Manifest {
      name: Some(module),
      builds,
      rollups: None,
    };

    let json = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(&options.build_file, json).map_err(|source| ConvertError::Write {
      path: options.build_file.clone(),
      source,
    })?;

    info!(path = %options.build_file.display(), "wrote a converted manifest");
    Ok(())
  }
}
