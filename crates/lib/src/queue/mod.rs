//! Single-flight build queue.
//!
//! At most one build executes at a time. Requests arriving while a build is
//! running are buffered and drained once it completes — in **LIFO** order:
//! the most recently enqueued request is served next. That stack order is an
//! observable property of the legacy tool this reproduces and is preserved
//! for compatibility; revisit it only once nothing external depends on it.
//!
//! `running` is a plain flag checked and set under the state lock before any
//! collaborator is awaited; scheduling is cooperative, never parallel. The
//! completion hook fires only when a run actually completes a build. On any
//! other outcome (early exit or fatal) the slot stays held and the queue
//! stalls permanently, exactly like the legacy contract — the difference is
//! that the outcome is returned to the drain caller instead of vanishing
//! into a never-invoked callback. There is no cancellation and no timeout.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::options::CallerOptions;
use crate::orchestrate::{Orchestrator, RunOutcome};

/// Hook fired when a request's build completes.
pub type CompletionHook = Box<dyn FnOnce() + Send + 'static>;

struct QueuedBuild {
  options: CallerOptions,
  on_complete: CompletionHook,
}

#[derive(Default)]
struct QueueState {
  pending: Vec<QueuedBuild>,
  running: bool,
}

struct QueueShared {
  state: Mutex<QueueState>,
  orchestrator: Orchestrator,
}

/// Cheaply cloneable handle to the single-flight queue.
///
/// Collaborators may hold a clone and enqueue follow-up requests from inside
/// a running build; those buffer and drain after the current one completes.
#[derive(Clone)]
pub struct BuildQueue {
  shared: Arc<QueueShared>,
}

impl BuildQueue {
  pub fn new(orchestrator: Orchestrator) -> Self {
    Self {
      shared: Arc::new(QueueShared {
        state: Mutex::new(QueueState::default()),
        orchestrator,
      }),
    }
  }

  /// The orchestrator backing this queue.
  pub fn orchestrator(&self) -> &Orchestrator {
    &self.shared.orchestrator
  }

  /// The effective working directory.
  pub fn cwd(&self) -> PathBuf {
    self.shared.orchestrator.cwd()
  }

  /// The global config file's directory, or the working directory.
  pub fn global_cwd(&self) -> PathBuf {
    self.shared.orchestrator.global_cwd()
  }

  /// Absolute path of the artifact output directory.
  pub fn build_dir(&self) -> PathBuf {
    self.shared.orchestrator.build_dir()
  }

  /// Number of buffered requests.
  pub async fn pending(&self) -> usize {
    self.shared.state.lock().await.pending.len()
  }

  /// Whether a build slot is currently held.
  pub async fn is_running(&self) -> bool {
    self.shared.state.lock().await.running
  }

  /// Buffer a build request and drain the queue.
  ///
  /// `on_complete` fires only if this request's build completes. The
  /// returned outcomes cover every run this call drove, in execution order;
  /// empty when a build was already running (the request stays buffered and
  /// is drained by whoever holds the slot).
  pub async fn enqueue(&self, options: CallerOptions, on_complete: impl FnOnce() + Send + 'static) -> Vec<RunOutcome> {
    {
      let mut state = self.shared.state.lock().await;
      state.pending.push(QueuedBuild {
        options,
        on_complete: Box::new(on_complete),
      });
    }
    self.run_pending().await
  }

  async fn run_pending(&self) -> Vec<RunOutcome> {
    let mut outcomes = Vec::new();
    loop {
      let item = {
        let mut state = self.shared.state.lock().await;
        if state.running {
          break;
        }
        // LIFO: the most recently enqueued request is served next.
        match state.pending.pop() {
          Some(item) => {
            state.running = true;
            item
          }
          None => break,
        }
      };

      let outcome = self.shared.orchestrator.run(&item.options).await;
      let completed = outcome.is_completed();
      if completed {
        self.shared.state.lock().await.running = false;
        (item.on_complete)();
      }
      // Not completed: the slot stays held and everything behind it waits
      // forever. Legacy contract; the outcome still reaches the caller.
      outcomes.push(outcome);
      if !completed {
        break;
      }
    }
    outcomes
  }
}
