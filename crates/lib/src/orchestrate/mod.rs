//! Build orchestration.
//!
//! [`Orchestrator::run`] drives one build request end to end:
//!
//! 1. Reset the run log
//! 2. Resolve configuration (caller > global config file > defaults)
//! 3. Help/version requested: emit and stop, before any manifest lookup
//! 4. Watch requested: hand off to the file watcher, which owns all further
//!    build triggering
//! 5. Manifest exists: parse, validate, normalize, then either list the
//!    build names or dispatch the artifact builder
//! 6. Manifest missing: hand off to the tree walker when walk was requested,
//!    otherwise run the legacy converter and retry resolution from the top
//!
//! Every path produces a [`RunOutcome`]. Only [`RunOutcome::Completed`]
//! counts as a completed build toward the queue contract; the early-exit and
//! fatal paths leave the queue slot held, exactly like the legacy tool they
//! reproduce (see `queue`).
//!
//! The conversion retry is unbounded by default. If a converter reports
//! success without actually producing a usable manifest, resolution loops
//! until interrupted; [`Orchestrator::with_retry_limit`] injects a cap for
//! callers that need a bound.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::builder::{ArtifactBuilder, TraceBuilder};
use crate::config::{self, ConfigError, RunContext};
use crate::help;
use crate::legacy::{AntConverter, ConvertError, LegacyConverter};
use crate::log::{BuildLog, TracingLog};
use crate::manifest::{self, Manifest, ManifestError};
use crate::options::CallerOptions;
use crate::pack::{Packer, StandardPacker};
use crate::walk::{ReportWalker, TreeWalker};
use crate::watch::{FileWatcher, NullWatcher};

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
  /// The artifact builder ran to completion.
  Completed,
  /// The run terminated on one of the documented non-build paths.
  EarlyExit(ExitReason),
  /// The run failed and the queue slot stays held.
  Fatal(FatalError),
}

impl RunOutcome {
  pub fn is_completed(&self) -> bool {
    matches!(self, RunOutcome::Completed)
  }

  pub fn is_fatal(&self) -> bool {
    matches!(self, RunOutcome::Fatal(_))
  }
}

/// The non-build, non-error ways a run can end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
  /// Help or version output was requested.
  HelpVersion,
  /// The file watcher took over build triggering.
  WatchHandoff,
  /// The tree walker took over.
  WalkHandoff,
  /// List mode printed the build names instead of building.
  ListAndStop,
  /// Conversion-only mode finished converting.
  AntOnlyStop,
}

/// The ways a run can fail.
#[derive(Debug, Error)]
pub enum FatalError {
  /// The global config file could not be read or parsed.
  #[error(transparent)]
  Config(#[from] ConfigError),

  /// Conversion was requested but a manifest already exists.
  #[error("{0} already exists, refusing to convert over it")]
  ManifestExists(PathBuf),

  /// The manifest could not be read or is not well-formed JSON.
  #[error(transparent)]
  ManifestParse(ManifestError),

  /// The manifest parsed but does not describe a valid set of builds.
  #[error(transparent)]
  ManifestInvalid(ManifestError),

  /// Legacy conversion failed.
  #[error(transparent)]
  Convert(#[from] ConvertError),

  /// The injected retry cap was exceeded without producing a manifest.
  #[error("legacy conversion retried {attempts} times without producing a usable manifest")]
  RetryLimit { attempts: u32 },
}

/// The external collaborators a run dispatches to.
#[derive(Clone)]
pub struct Collaborators {
  pub packer: Arc<dyn Packer>,
  pub builder: Arc<dyn ArtifactBuilder>,
  pub walker: Arc<dyn TreeWalker>,
  pub converter: Arc<dyn LegacyConverter>,
  pub watcher: Arc<dyn FileWatcher>,
}

impl Default for Collaborators {
  fn default() -> Self {
    Self {
      packer: Arc::new(StandardPacker),
      builder: Arc::new(TraceBuilder),
      walker: Arc::new(ReportWalker),
      converter: Arc::new(AntConverter),
      watcher: Arc::new(NullWatcher),
    }
  }
}

/// One resolution pass either settles the run or asks for a retry after a
/// legacy conversion.
enum Step {
  Done(RunOutcome),
  Retry,
}

/// Long-lived orchestration engine.
///
/// Owns the process-wide resolution state ([`RunContext`]), the run log, and
/// the collaborator set. One instance serves every request for the life of
/// the process; the working directory and global-config discovery persist
/// across runs.
pub struct Orchestrator {
  log: Arc<dyn BuildLog>,
  collab: Collaborators,
  context: Mutex<RunContext>,
  retry_limit: Option<u32>,
}

impl Orchestrator {
  /// Create an orchestrator rooted at `cwd` with the default collaborators
  /// and a tracing-backed log.
  pub fn new(cwd: PathBuf) -> Self {
    Self {
      log: Arc::new(TracingLog::new()),
      collab: Collaborators::default(),
      context: Mutex::new(RunContext::new(cwd)),
      retry_limit: None,
    }
  }

  pub fn with_log(mut self, log: Arc<dyn BuildLog>) -> Self {
    self.log = log;
    self
  }

  pub fn with_collaborators(mut self, collab: Collaborators) -> Self {
    self.collab = collab;
    self
  }

  /// Cap the conversion retry loop. Without a cap it is unbounded, matching
  /// the legacy contract.
  pub fn with_retry_limit(mut self, limit: u32) -> Self {
    self.retry_limit = Some(limit);
    self
  }

  /// The effective working directory.
  pub fn cwd(&self) -> PathBuf {
    self.lock_context().cwd().to_path_buf()
  }

  /// The global config file's directory when one was discovered, the
  /// working directory otherwise.
  pub fn global_cwd(&self) -> PathBuf {
    self.lock_context().global_cwd().to_path_buf()
  }

  /// Absolute path of the artifact output directory, re-rooted at the
  /// global config directory when the global config defines `build-dir`.
  pub fn build_dir(&self) -> PathBuf {
    self.lock_context().build_dir()
  }

  fn lock_context(&self) -> std::sync::MutexGuard<'_, RunContext> {
    self.context.lock().unwrap_or_else(|e| e.into_inner())
  }

  /// Run one build request to its outcome.
  pub async fn run(&self, caller: &CallerOptions) -> RunOutcome {
    let mut attempts: u32 = 0;
    loop {
      match self.run_once(caller).await {
        Step::Done(outcome) => return outcome,
        Step::Retry => {
          attempts += 1;
          if let Some(limit) = self.retry_limit {
            if attempts >= limit {
              self
                .log
                .error(&format!("conversion retried {attempts} times without a usable manifest"));
              return RunOutcome::Fatal(FatalError::RetryLimit { attempts });
            }
          }
        }
      }
    }
  }

  /// One pass of the source-resolution flow.
  async fn run_once(&self, caller: &CallerOptions) -> Step {
    let log = self.log.as_ref();
    log.reset();

    // Configuration resolution mutates the shared context (cwd adoption,
    // global-config discovery); the lock is released before anything awaits.
    let options = {
      let mut ctx = self.lock_context();
      match config::resolve(&mut ctx, caller, log) {
        Ok(options) => options,
        Err(err) => {
          log.error(&err.to_string());
          return Step::Done(RunOutcome::Fatal(err.into()));
        }
      }
    };

    if options.version || options.help {
      if options.version {
        help::emit_version(log);
      } else {
        help::emit_usage(log);
      }
      return Step::Done(RunOutcome::EarlyExit(ExitReason::HelpVersion));
    }

    if options.watch {
      self.collab.watcher.start(&options);
      return Step::Done(RunOutcome::EarlyExit(ExitReason::WatchHandoff));
    }

    if options.quiet {
      log.quiet();
    }
    if options.silent {
      log.silent();
    }

    log.info("starting up");
    if !options.walk {
      log.info(&format!("looking for a {} file", options.build_file_name));
    }

    if options.build_file.is_file() {
      if options.ant {
        log.error(&format!(
          "already has a {} file, refusing to convert over it",
          options.build_file_name
        ));
        return Step::Done(RunOutcome::Fatal(FatalError::ManifestExists(options.build_file.clone())));
      }

      log.info(&format!("found a {} file", options.build_file_name));
      let raw = match manifest::load_raw(&options.build_file) {
        Ok(raw) => raw,
        Err(err) => {
          log.error(&err.to_string());
          return Step::Done(RunOutcome::Fatal(FatalError::ManifestParse(err)));
        }
      };

      let parsed = match Manifest::from_value(&options.build_file, raw) {
        Ok(manifest) => manifest,
        Err(err) => {
          log.error(&err.to_string());
          return Step::Done(RunOutcome::Fatal(FatalError::ManifestInvalid(err)));
        }
      };

      if !self.collab.packer.valid(&parsed) {
        let err = ManifestError::Invalid {
          path: options.build_file.clone(),
        };
        log.error(&err.to_string());
        return Step::Done(RunOutcome::Fatal(FatalError::ManifestInvalid(err)));
      }

      let (manifest, options) = self.collab.packer.munge(parsed, options).await;

      if options.list {
        log.info("this module includes these builds:");
        log.emit(&manifest.build_names().join(", "));
        if manifest.rollups.is_some() {
          log.info("and these rollups:");
          log.emit(&manifest.rollup_names().join(", "));
        }
        return Step::Done(RunOutcome::EarlyExit(ExitReason::ListAndStop));
      }

      log.info("dispatching the build");
      self.collab.builder.reset();
      self.collab.builder.start(&manifest, &options).await;
      return Step::Done(RunOutcome::Completed);
    }

    if options.walk {
      self.collab.walker.run(&options);
      return Step::Done(RunOutcome::EarlyExit(ExitReason::WalkHandoff));
    }

    log.warn(&format!(
      "no {} file, trying to convert legacy build scripts",
      options.build_file_name
    ));
    match self.collab.converter.process(&options).await {
      Err(err) => {
        log.error(&err.to_string());
        Step::Done(RunOutcome::Fatal(err.into()))
      }
      Ok(()) => {
        if options.ant {
          Step::Done(RunOutcome::EarlyExit(ExitReason::AntOnlyStop))
        } else {
          // Conversion should have produced a manifest; resolve again from
          // the top with the same caller options.
          Step::Retry
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::{
    CapturedLog, CountingConverter, FlagWalker, FlagWatcher, RecordingBuilder, write_build_file,
  };
  use std::fs;
  use std::path::Path;
  use std::sync::atomic::Ordering;

  struct Harness {
    orchestrator: Orchestrator,
    log: Arc<CapturedLog>,
    builder: Arc<RecordingBuilder>,
    walker: Arc<FlagWalker>,
    watcher: Arc<FlagWatcher>,
    converter: Arc<CountingConverter>,
  }

  fn harness(dir: &Path) -> Harness {
    let log = Arc::new(CapturedLog::new());
    let builder = Arc::new(RecordingBuilder::default());
    let walker = Arc::new(FlagWalker::default());
    let watcher = Arc::new(FlagWatcher::default());
    let converter = Arc::new(CountingConverter::default());
    let collab = Collaborators {
      builder: builder.clone(),
      walker: walker.clone(),
      watcher: watcher.clone(),
      converter: converter.clone(),
      ..Collaborators::default()
    };
    let orchestrator = Orchestrator::new(dir.to_path_buf())
      .with_log(log.clone())
      .with_collaborators(collab);
    Harness {
      orchestrator,
      log,
      builder,
      walker,
      watcher,
      converter,
    }
  }

  fn no_global() -> CallerOptions {
    CallerOptions {
      global_config: Some(false),
      ..CallerOptions::default()
    }
  }

  #[tokio::test]
  async fn valid_manifest_dispatches_the_builder() {
    let dir = tempfile::tempdir().unwrap();
    write_build_file(dir.path(), &["widget"]);
    let h = harness(dir.path());

    let outcome = h.orchestrator.run(&no_global()).await;
    assert!(outcome.is_completed());
    // Exactly one reset, and it happened before the dispatch.
    assert_eq!(h.builder.resets.load(Ordering::SeqCst), 1);
    assert_eq!(*h.builder.resets_at_dispatch.lock().unwrap(), vec![1]);
    assert_eq!(h.builder.started(), vec!["widget"]);
  }

  #[tokio::test]
  async fn builder_sees_the_munged_manifest() {
    let dir = tempfile::tempdir().unwrap();
    write_build_file(dir.path(), &["widget"]);
    let h = harness(dir.path());

    h.orchestrator.run(&no_global()).await;
    // StandardPacker backfills per-build names from the mapping keys.
    let manifests = h.builder.manifests.lock().unwrap();
    assert_eq!(manifests[0].builds["widget"].name.as_deref(), Some("widget"));
  }

  #[tokio::test]
  async fn help_short_circuits_before_any_manifest_lookup() {
    let dir = tempfile::tempdir().unwrap();
    // Would be a parse error if the manifest were ever touched.
    fs::write(dir.path().join("build.json"), "{garbage").unwrap();
    let h = harness(dir.path());

    let outcome = h
      .orchestrator
      .run(&CallerOptions {
        help: Some(true),
        ..no_global()
      })
      .await;

    assert!(matches!(outcome, RunOutcome::EarlyExit(ExitReason::HelpVersion)));
    assert!(h.log.errors().is_empty());
  }

  #[tokio::test]
  async fn version_takes_the_same_early_exit() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(dir.path());

    let outcome = h
      .orchestrator
      .run(&CallerOptions {
        version: Some(true),
        ..no_global()
      })
      .await;

    assert!(matches!(outcome, RunOutcome::EarlyExit(ExitReason::HelpVersion)));
    assert!(h.log.emitted()[0].contains(env!("CARGO_PKG_VERSION")));
  }

  #[tokio::test]
  async fn watch_hands_off_before_source_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(dir.path());

    let outcome = h
      .orchestrator
      .run(&CallerOptions {
        watch: Some(true),
        ..no_global()
      })
      .await;

    assert!(matches!(outcome, RunOutcome::EarlyExit(ExitReason::WatchHandoff)));
    assert!(h.watcher.started.load(Ordering::SeqCst));
    assert_eq!(h.builder.started().len(), 0);
  }

  #[tokio::test]
  async fn list_prints_sorted_builds_without_dispatching() {
    let dir = tempfile::tempdir().unwrap();
    write_build_file(dir.path(), &["foo", "bar"]);
    let h = harness(dir.path());

    let outcome = h
      .orchestrator
      .run(&CallerOptions {
        list: Some(true),
        ..no_global()
      })
      .await;

    assert!(matches!(outcome, RunOutcome::EarlyExit(ExitReason::ListAndStop)));
    assert_eq!(h.log.emitted(), vec!["bar, foo"]);
    assert_eq!(h.builder.started().len(), 0);
  }

  #[tokio::test]
  async fn list_includes_rollups_when_present() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
      dir.path().join("build.json"),
      r#"{
        "builds": {"a": {}, "b": {}},
        "rollups": {"all": {"files": ["a", "b"]}}
      }"#,
    )
    .unwrap();
    let h = harness(dir.path());

    h.orchestrator
      .run(&CallerOptions {
        list: Some(true),
        ..no_global()
      })
      .await;

    assert_eq!(h.log.emitted(), vec!["a, b", "all"]);
  }

  #[tokio::test]
  async fn malformed_manifest_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("build.json"), "{oops").unwrap();
    let h = harness(dir.path());

    let outcome = h.orchestrator.run(&no_global()).await;
    assert!(matches!(outcome, RunOutcome::Fatal(FatalError::ManifestParse(_))));
    assert_eq!(h.builder.started().len(), 0);
  }

  #[tokio::test]
  async fn manifest_without_builds_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("build.json"), r#"{"builds": {}}"#).unwrap();
    let h = harness(dir.path());

    let outcome = h.orchestrator.run(&no_global()).await;
    assert!(matches!(outcome, RunOutcome::Fatal(FatalError::ManifestInvalid(_))));
  }

  #[tokio::test]
  async fn ant_with_an_existing_manifest_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_build_file(dir.path(), &["widget"]);
    let h = harness(dir.path());

    let outcome = h
      .orchestrator
      .run(&CallerOptions {
        ant: Some(true),
        ..no_global()
      })
      .await;

    assert!(matches!(outcome, RunOutcome::Fatal(FatalError::ManifestExists(_))));
  }

  #[tokio::test]
  async fn missing_manifest_with_walk_hands_off_to_the_walker() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(dir.path());

    let outcome = h
      .orchestrator
      .run(&CallerOptions {
        walk: Some(true),
        ..no_global()
      })
      .await;

    assert!(matches!(outcome, RunOutcome::EarlyExit(ExitReason::WalkHandoff)));
    assert!(h.walker.ran.load(Ordering::SeqCst));
    assert_eq!(h.converter.calls.load(Ordering::SeqCst), 0);
  }

  #[tokio::test]
  async fn ant_only_conversion_stops_without_retrying() {
    let dir = tempfile::tempdir().unwrap();
    let h = harness(dir.path());

    let outcome = h
      .orchestrator
      .run(&CallerOptions {
        ant: Some(true),
        ..no_global()
      })
      .await;

    assert!(matches!(outcome, RunOutcome::EarlyExit(ExitReason::AntOnlyStop)));
    assert_eq!(h.converter.calls.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn conversion_that_produces_nothing_keeps_retrying() {
    let dir = tempfile::tempdir().unwrap();
    let log = Arc::new(CapturedLog::new());
    let converter = Arc::new(CountingConverter::default());
    let orchestrator = Orchestrator::new(dir.path().to_path_buf())
      .with_log(log)
      .with_collaborators(Collaborators {
        converter: converter.clone(),
        ..Collaborators::default()
      })
      .with_retry_limit(3);

    let outcome = orchestrator.run(&no_global()).await;
    assert!(matches!(outcome, RunOutcome::Fatal(FatalError::RetryLimit { attempts: 3 })));
    assert!(converter.calls.load(Ordering::SeqCst) >= 3);
  }

  #[tokio::test]
  async fn successful_conversion_retries_into_a_real_build() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("build.xml"), "<project/>").unwrap();

    let log = Arc::new(CapturedLog::new());
    let builder = Arc::new(RecordingBuilder::default());
    // Default collaborators except the recording builder: the real
    // AntConverter writes a build.json, and the retry picks it up.
    let orchestrator = Orchestrator::new(dir.path().to_path_buf())
      .with_log(log)
      .with_collaborators(Collaborators {
        builder: builder.clone(),
        ..Collaborators::default()
      });

    let outcome = orchestrator.run(&no_global()).await;
    assert!(outcome.is_completed());
    assert_eq!(builder.started().len(), 1);
  }

  #[tokio::test]
  async fn failed_conversion_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    // Default AntConverter with no build.xml anywhere: nothing to convert.
    let log = Arc::new(CapturedLog::new());
    let orchestrator = Orchestrator::new(dir.path().to_path_buf()).with_log(log);

    let outcome = orchestrator.run(&no_global()).await;
    assert!(matches!(
      outcome,
      RunOutcome::Fatal(FatalError::Convert(ConvertError::NothingToConvert(_)))
    ));
  }

  #[tokio::test]
  async fn malformed_global_config_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(crate::consts::GLOBAL_CONFIG_FILENAME), "{oops").unwrap();
    write_build_file(dir.path(), &["widget"]);
    let h = harness(dir.path());

    let outcome = h.orchestrator.run(&CallerOptions::default()).await;
    assert!(matches!(outcome, RunOutcome::Fatal(FatalError::Config(_))));
  }

  #[tokio::test]
  async fn accessors_reflect_the_resolved_context() {
    let dir = tempfile::tempdir().unwrap();
    write_build_file(dir.path(), &["widget"]);
    let h = harness(dir.path());

    h.orchestrator
      .run(&CallerOptions {
        build_dir: Some("artifacts".to_string()),
        ..no_global()
      })
      .await;

    assert_eq!(h.orchestrator.cwd(), dir.path());
    assert_eq!(h.orchestrator.global_cwd(), dir.path());
    assert_eq!(h.orchestrator.build_dir(), dir.path().join("artifacts"));
  }
}
