//! Bounded-concurrency task admission
//!
//! The limiter is the only concurrency control in the crawl. It caps how many
//! render sessions are in flight at once; every other submission waits its
//! turn in arrival order.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Runs at most `limit` submitted tasks at a time
///
/// Waiters are admitted FIFO (tokio's semaphore is fair). A task that fails
/// only affects its own submitter; a task that never finishes holds its slot
/// forever, since there is no timeout or cancellation here.
#[derive(Debug, Clone)]
pub struct TaskLimiter {
    semaphore: Arc<Semaphore>,
    limit: usize,
}

impl TaskLimiter {
    pub const DEFAULT_LIMIT: usize = 2;

    /// Creates a limiter; a limit of zero is raised to one
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(limit)),
            limit,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Number of free slots right now
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Waits for a slot, then builds and runs the task
    ///
    /// The task is not constructed until a slot is free, and the slot is
    /// released when the task completes, whatever its output.
    pub async fn submit<F, Fut>(&self, task: F) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
    {
        // The semaphore is never closed, so acquisition cannot fail.
        let _permit = self.semaphore.acquire().await.ok();
        task().await
    }
}

impl Default for TaskLimiter {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LIMIT)
    }
}
