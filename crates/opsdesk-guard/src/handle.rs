//! Background guard checks.
//!
//! A route that mounts a guard starts the check in the background and
//! renders from the watched state. Tearing the route down before the
//! session settles aborts the check; the late result is simply dropped.

use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::guard::{AccessGuard, GuardState};
use crate::session::SessionSource;

/// Handle to a guard check running on the tokio runtime.
///
/// Starts in [`GuardState::Pending`] and moves to a terminal state once.
/// Dropping the handle aborts the check.
#[derive(Debug)]
pub struct GuardHandle {
    state: watch::Receiver<GuardState>,
    task: JoinHandle<()>,
}

impl GuardHandle {
    /// Current state without waiting.
    pub fn state(&self) -> GuardState {
        *self.state.borrow()
    }

    /// Wait for a terminal state.
    pub async fn settled(&mut self) -> GuardState {
        if let Ok(state) = self.state.wait_for(GuardState::is_terminal).await {
            return *state;
        }
        // Task gone before publishing: report whatever was last seen.
        *self.state.borrow()
    }

    /// Abandon the check. Nothing is published after this returns.
    pub fn teardown(self) {
        drop(self);
    }

    /// Check if the background task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for GuardHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl AccessGuard {
    /// Spawn [`AccessGuard::check`] and return a handle to watch it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn watch(self: &Arc<Self>, source: Arc<dyn SessionSource>) -> GuardHandle {
        let (tx, rx) = watch::channel(GuardState::Pending);
        let guard = Arc::clone(self);

        let task = tokio::spawn(async move {
            let state = guard.check(source.as_ref()).await;
            // Receiver gone means the handle was torn down.
            let _ = tx.send(state);
        });

        GuardHandle { state: rx, task }
    }
}
