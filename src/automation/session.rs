//! Capture session state
//!
//! One session = one run of the auto-capture loop. The running slot is the
//! process-wide singleton guarantee: it is acquired by compare-and-swap when a
//! session starts and released by [`RunGuard`] on every exit path of the loop
//! task, including panics. Stop requests travel on a separate flag so that a
//! start racing a still-unwinding session can never produce two live loops.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::browser::TabId;

/// Terminal state of a capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome {
    /// The last item was reached (or the capture ceiling was hit).
    Completed,
    /// A stop request was observed at the iteration checkpoint.
    Cancelled,
    /// No advance control could be found; the loop could not progress.
    Aborted,
}

impl std::fmt::Display for SessionOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionOutcome::Completed => write!(f, "completed"),
            SessionOutcome::Cancelled => write!(f, "cancelled"),
            SessionOutcome::Aborted => write!(f, "aborted"),
        }
    }
}

/// Point-in-time view of the controller's state.
#[derive(Debug, Clone)]
pub struct SessionStatus {
    /// True exactly while a loop task is executing.
    pub is_running: bool,
    /// Completed captures in the current (or most recent) session.
    pub image_count: u64,
    /// Identity of the current (or most recent) session.
    pub session_id: Option<Uuid>,
    /// Target page of the current (or most recent) session.
    pub tab: Option<TabId>,
    /// Start time of the current (or most recent) session.
    pub started_at: Option<DateTime<Utc>>,
    /// Terminal state of the most recent session; `None` while a session is
    /// running, before any session ran, or after a capture failure.
    pub last_outcome: Option<SessionOutcome>,
}

#[derive(Debug, Clone, Copy)]
struct SessionInfo {
    id: Uuid,
    tab: TabId,
    started_at: DateTime<Utc>,
}

/// Shared session state, mutated only by the controller's entry points and
/// the loop task itself.
#[derive(Debug)]
pub(crate) struct SessionState {
    running: AtomicBool,
    stop_requested: AtomicBool,
    image_count: AtomicU64,
    current: Mutex<Option<SessionInfo>>,
    last_outcome: Mutex<Option<SessionOutcome>>,
}

impl SessionState {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            running: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            image_count: AtomicU64::new(0),
            current: Mutex::new(None),
            last_outcome: Mutex::new(None),
        })
    }

    /// Try to take the running slot. Fails while another session holds it,
    /// which is what makes duplicate starts idempotent no-ops.
    pub(crate) fn try_acquire(self: &Arc<Self>) -> Option<RunGuard> {
        self.running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(RunGuard {
            state: Arc::clone(self),
        })
    }

    /// Reset per-session fields. Only valid between `try_acquire` and the
    /// spawn of the loop task.
    pub(crate) fn begin(&self, tab: TabId) {
        self.stop_requested.store(false, Ordering::SeqCst);
        self.image_count.store(0, Ordering::SeqCst);
        *self.current.lock() = Some(SessionInfo {
            id: Uuid::new_v4(),
            tab,
            started_at: Utc::now(),
        });
        *self.last_outcome.lock() = None;
    }

    pub(crate) fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::SeqCst);
    }

    pub(crate) fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::SeqCst)
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub(crate) fn increment_captures(&self) -> u64 {
        self.image_count.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub(crate) fn image_count(&self) -> u64 {
        self.image_count.load(Ordering::SeqCst)
    }

    /// Record the terminal state; `None` means the loop failed with an error.
    pub(crate) fn finish(&self, outcome: Option<SessionOutcome>) {
        *self.last_outcome.lock() = outcome;
    }

    pub(crate) fn status(&self) -> SessionStatus {
        let info = *self.current.lock();
        SessionStatus {
            is_running: self.is_running(),
            image_count: self.image_count(),
            session_id: info.map(|i| i.id),
            tab: info.map(|i| i.tab),
            started_at: info.map(|i| i.started_at),
            last_outcome: *self.last_outcome.lock(),
        }
    }
}

/// Scoped ownership of the running slot.
///
/// Held by the loop task for its whole lifetime; dropping it (return, error,
/// panic) releases the slot, so `is_running` can never stick at `true`.
#[derive(Debug)]
pub(crate) struct RunGuard {
    state: Arc<SessionState>,
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.state.running.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_is_exclusive() {
        let state = SessionState::new();
        let guard = state.try_acquire().expect("first acquire");
        assert!(state.is_running());
        assert!(state.try_acquire().is_none());
        drop(guard);
        assert!(!state.is_running());
        assert!(state.try_acquire().is_some());
    }

    #[test]
    fn test_begin_resets_session_fields() {
        let state = SessionState::new();
        let _guard = state.try_acquire().unwrap();
        state.request_stop();
        state.begin(TabId(3));
        assert!(!state.stop_requested());
        assert_eq!(state.image_count(), 0);

        let status = state.status();
        assert_eq!(status.tab, Some(TabId(3)));
        assert!(status.session_id.is_some());
        assert!(status.last_outcome.is_none());
    }

    #[test]
    fn test_image_count_monotone() {
        let state = SessionState::new();
        assert_eq!(state.increment_captures(), 1);
        assert_eq!(state.increment_captures(), 2);
        assert_eq!(state.image_count(), 2);
    }

    #[test]
    fn test_guard_released_on_panic() {
        let state = SessionState::new();
        let state2 = Arc::clone(&state);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = state2.try_acquire().unwrap();
            panic!("loop blew up");
        }));
        assert!(result.is_err());
        assert!(!state.is_running());
    }

    #[test]
    fn test_outcome_display() {
        assert_eq!(SessionOutcome::Completed.to_string(), "completed");
        assert_eq!(SessionOutcome::Cancelled.to_string(), "cancelled");
        assert_eq!(SessionOutcome::Aborted.to_string(), "aborted");
    }
}
