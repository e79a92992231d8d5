//! Capture controller
//!
//! Lifecycle guard around the auto-capture loop and the single authority on
//! the running state. `start` is an idempotent reject while a session is
//! live; `stop` is a cooperative cancellation signal; `status` is a
//! side-effect-free snapshot.

use std::sync::Arc;

use metrics::counter;
use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::automation::config::AutomationConfig;
use crate::automation::runner::CaptureRunner;
use crate::automation::session::{SessionOutcome, SessionState, SessionStatus};
use crate::browser::{CaptureInvoker, ScriptHost, TabId};
use crate::probe::{PageProber, Prober};

/// Owns the running/idle state and supervises the loop's lifecycle.
pub struct CaptureController {
    state: Arc<SessionState>,
    invoker: Arc<dyn CaptureInvoker>,
    prober: Arc<dyn Prober>,
    config: AutomationConfig,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl CaptureController {
    /// Create a controller whose probes run through the given script host.
    pub fn new(
        invoker: Arc<dyn CaptureInvoker>,
        host: Arc<dyn ScriptHost>,
        config: AutomationConfig,
    ) -> Self {
        let prober = Arc::new(PageProber::new(host, config.probe.clone()));
        Self::with_prober(invoker, prober, config)
    }

    /// Create a controller with an explicit prober implementation.
    pub fn with_prober(
        invoker: Arc<dyn CaptureInvoker>,
        prober: Arc<dyn Prober>,
        config: AutomationConfig,
    ) -> Self {
        Self {
            state: SessionState::new(),
            invoker,
            prober,
            config,
            task: Mutex::new(None),
        }
    }

    /// Start a capture session on `tab`.
    ///
    /// Returns `false` without side effects when a session is already
    /// running. Otherwise resets the capture counter, spawns the loop task
    /// and returns `true` immediately; the session then runs until it
    /// completes, aborts, fails, or is stopped.
    pub fn start(&self, tab: TabId) -> bool {
        let Some(guard) = self.state.try_acquire() else {
            debug!(%tab, "auto-capture already running, ignoring start");
            return false;
        };
        self.state.begin(tab);
        counter!("autoshot_sessions_total").increment(1);
        info!(%tab, "starting auto-capture");

        let runner = CaptureRunner::new(
            Arc::clone(&self.state),
            Arc::clone(&self.invoker),
            Arc::clone(&self.prober),
            self.config.clone(),
            tab,
        );
        let state = Arc::clone(&self.state);
        let handle = tokio::spawn(async move {
            // The guard lives for the whole task: every exit path below,
            // including a panic in the runner, releases the running slot.
            let _running = guard;
            match runner.run().await {
                Ok(outcome) => {
                    info!(%outcome, images = state.image_count(), "auto-capture finished");
                    state.finish(Some(outcome));
                }
                Err(err) => {
                    error!(error = %err, images = state.image_count(), "auto-capture failed");
                    state.finish(None);
                }
            }
        });
        *self.task.lock() = Some(handle);
        true
    }

    /// Request cooperative cancellation.
    ///
    /// The loop observes the request at its next iteration checkpoint; an
    /// in-flight capture or probe is allowed to finish. Idempotent, and a
    /// harmless no-op when nothing is running.
    pub fn stop(&self) {
        if self.state.is_running() {
            info!("stop requested");
        }
        self.state.request_stop();
    }

    /// Whether a session is currently running.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Snapshot of the session state. No side effects.
    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    /// Terminal state of the most recent session, if it ended cleanly.
    pub fn last_outcome(&self) -> Option<SessionOutcome> {
        self.state.status().last_outcome
    }

    /// Wait for the current loop task to finish.
    ///
    /// Used by tests and for orderly shutdown; returns immediately when no
    /// task was spawned. Does not itself request a stop.
    pub async fn join(&self) {
        let handle = self.task.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}
