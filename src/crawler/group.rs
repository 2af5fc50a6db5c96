//! Supervised task group
//!
//! Ties an unbounded tree of concurrently spawned tasks into one cancellable
//! operation with a single outcome:
//! - every spawned task, including ones spawned by other tasks, is tracked
//!   and [`TaskGroup::wait`] returns only when all of them have finished
//! - the first error reported while the group is live is kept and cancels the
//!   group's token; every later error is discarded
//! - cancelling the parent token passed to [`TaskGroup::new`] cancels the
//!   group the same way, without recording an error

use crate::MirrorError;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// A cloneable handle on a group of tracked tasks sharing one error slot
#[derive(Debug, Clone)]
pub struct TaskGroup {
    tracker: TaskTracker,
    token: CancellationToken,
    first_error: Arc<Mutex<Option<MirrorError>>>,
}

impl TaskGroup {
    /// Creates a group whose token is a child of `parent`
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            tracker: TaskTracker::new(),
            token: parent.child_token(),
            first_error: Arc::new(Mutex::new(None)),
        }
    }

    /// Token cancelled on the first error or when the parent is cancelled
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Spawns a tracked task; an `Err` it returns is reported to the group
    pub fn spawn<F>(&self, task: F)
    where
        F: Future<Output = Result<(), MirrorError>> + Send + 'static,
    {
        let group = self.clone();
        self.tracker.spawn(async move {
            if let Err(e) = task.await {
                group.report(e);
            }
        });
    }

    /// Records an error if it is the first one while the group is live
    ///
    /// Returns true if this error was kept. The check-and-store happens under
    /// the slot's lock, so exactly one report can win.
    pub fn report(&self, err: MirrorError) -> bool {
        let mut slot = self
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if slot.is_some() || self.token.is_cancelled() {
            if err.is_cancelled() {
                tracing::trace!("Discarding cancellation: {}", err);
            } else {
                tracing::warn!("Discarding error after crawl was cancelled: {}", err);
            }
            return false;
        }

        tracing::debug!("First error recorded, cancelling crawl: {}", err);
        *slot = Some(err);
        self.token.cancel();
        true
    }

    /// Waits for every task to finish and returns the first recorded error
    ///
    /// Tasks may keep spawning children while this waits; they are tracked
    /// as long as they are spawned before their parent finishes.
    pub async fn wait(self) -> Option<MirrorError> {
        self.tracker.close();
        self.tracker.wait().await;

        let mut slot = self
            .first_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        slot.take()
    }
}
