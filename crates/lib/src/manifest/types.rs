//! Manifest types.
//!
//! The manifest is the parsed build specification: a `builds` mapping of
//! module build definitions, plus optional `rollups` that aggregate several
//! builds into one artifact. `BTreeMap` keeps name ordering deterministic,
//! which is also what list mode prints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The parsed build specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
  /// Module name, when the manifest declares one.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  /// Module build definitions, keyed by build name.
  pub builds: BTreeMap<String, BuildSpec>,
  /// Named aggregate builds combining multiple module builds.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rollups: Option<BTreeMap<String, RollupSpec>>,
}

/// One module build definition.
///
/// The fields the orchestrator itself cares about are typed; everything else
/// a build declares is carried through `extra` untouched for the artifact
/// builder to interpret.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSpec {
  /// Build name; normalization backfills it from the mapping key.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  /// Script sources, in concatenation order.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub jsfiles: Vec<String>,
  /// Stylesheet sources, in concatenation order.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub cssfiles: Vec<String>,
  /// `[from, to]` copy instructions.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub copy: Vec<(String, String)>,
  /// Commands to run after the build.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub exec: Vec<String>,
  /// Everything else the build declares.
  #[serde(flatten)]
  pub extra: BTreeMap<String, serde_json::Value>,
}

/// One rollup definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RollupSpec {
  /// Rollup name; normalization backfills it from the mapping key.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  /// Names of the builds this rollup aggregates.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub files: Vec<String>,
  /// Everything else the rollup declares.
  #[serde(flatten)]
  pub extra: BTreeMap<String, serde_json::Value>,
}
