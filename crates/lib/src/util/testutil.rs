//! Test helpers for gearbox-lib.
//!
//! Provides a capturing [`BuildLog`], flag/counting collaborator stubs, and
//! fixture writers shared across the orchestration and queue tests.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;

use crate::builder::ArtifactBuilder;
use crate::legacy::{ConvertError, LegacyConverter};
use crate::log::BuildLog;
use crate::manifest::Manifest;
use crate::options::Options;
use crate::walk::TreeWalker;
use crate::watch::FileWatcher;

/// A `BuildLog` that records everything it is told.
#[derive(Debug, Default)]
pub struct CapturedLog {
  infos: Mutex<Vec<String>>,
  warns: Mutex<Vec<String>>,
  errors: Mutex<Vec<String>>,
  emitted: Mutex<Vec<String>>,
}

impl CapturedLog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn infos(&self) -> Vec<String> {
    self.infos.lock().unwrap().clone()
  }

  pub fn warns(&self) -> Vec<String> {
    self.warns.lock().unwrap().clone()
  }

  pub fn errors(&self) -> Vec<String> {
    self.errors.lock().unwrap().clone()
  }

  pub fn emitted(&self) -> Vec<String> {
    self.emitted.lock().unwrap().clone()
  }
}

impl BuildLog for CapturedLog {
  fn reset(&self) {}
  fn quiet(&self) {}
  fn silent(&self) {}

  fn info(&self, msg: &str) {
    self.infos.lock().unwrap().push(msg.to_string());
  }

  fn warn(&self, msg: &str) {
    self.warns.lock().unwrap().push(msg.to_string());
  }

  fn error(&self, msg: &str) {
    self.errors.lock().unwrap().push(msg.to_string());
  }

  fn emit(&self, msg: &str) {
    self.emitted.lock().unwrap().push(msg.to_string());
  }
}

/// Builder stub that records every dispatched manifest.
#[derive(Default)]
pub struct RecordingBuilder {
  pub manifests: Mutex<Vec<Manifest>>,
  pub resets: AtomicU32,
  /// Reset count observed at the moment of each dispatch.
  pub resets_at_dispatch: Mutex<Vec<u32>>,
}

impl RecordingBuilder {
  /// The build names of each dispatched manifest, comma-joined per dispatch.
  pub fn started(&self) -> Vec<String> {
    self
      .manifests
      .lock()
      .unwrap()
      .iter()
      .map(|m| m.build_names().join(","))
      .collect()
  }
}

#[async_trait]
impl ArtifactBuilder for RecordingBuilder {
  fn reset(&self) {
    self.resets.fetch_add(1, Ordering::SeqCst);
  }

  async fn start(&self, manifest: &Manifest, _options: &Options) {
    self
      .resets_at_dispatch
      .lock()
      .unwrap()
      .push(self.resets.load(Ordering::SeqCst));
    self.manifests.lock().unwrap().push(manifest.clone());
  }
}

/// Walker stub that only remembers it ran.
#[derive(Debug, Default)]
pub struct FlagWalker {
  pub ran: AtomicBool,
}

impl TreeWalker for FlagWalker {
  fn run(&self, _options: &Options) {
    self.ran.store(true, Ordering::SeqCst);
  }
}

/// Watcher stub that only remembers it was handed off to.
#[derive(Debug, Default)]
pub struct FlagWatcher {
  pub started: AtomicBool,
}

impl FileWatcher for FlagWatcher {
  fn start(&self, _options: &Options) {
    self.started.store(true, Ordering::SeqCst);
  }
}

/// Converter stub that reports success without producing anything.
#[derive(Debug, Default)]
pub struct CountingConverter {
  pub calls: AtomicU32,
}

#[async_trait]
impl LegacyConverter for CountingConverter {
  async fn process(&self, _options: &Options) -> Result<(), ConvertError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    Ok(())
  }
}

/// Write a minimal valid manifest with the given build names into `dir`.
pub fn write_build_file(dir: &Path, names: &[&str]) -> PathBuf {
  let mut builds = serde_json::Map::new();
  for name in names {
    builds.insert(name.to_string(), serde_json::json!({ "jsfiles": ["js/mod.js"] }));
  }
  let path = dir.join("build.json");
  fs::write(&path, serde_json::json!({ "builds": builds }).to_string()).unwrap();
  path
}

/// Resolved options rooted at `dir`, everything else defaulted.
pub fn blank_options(dir: &Path) -> Options {
  Options {
    config: None,
    cwd: dir.to_path_buf(),
    build_dir: "build".to_string(),
    build_path: dir.join("build"),
    watch: false,
    quiet: false,
    silent: false,
    list: false,
    walk: false,
    ant: false,
    global_config: false,
    version: false,
    help: false,
    build_file: dir.join("build.json"),
    build_file_name: "build.json".to_string(),
  }
}
