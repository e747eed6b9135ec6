//! In-flight task counter for global completion detection

use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Counts crawl tasks in flight across the whole task tree
///
/// A task is added before it is dispatched and marked done once its own work
/// is finished; parents never wait for children. The crawl is complete exactly
/// when the count returns to zero.
#[derive(Debug, Default)]
pub struct CompletionCounter {
    in_flight: AtomicUsize,
    idle: Notify,
}

impl CompletionCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one more in-flight task
    pub fn add(&self) {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
    }

    /// Marks one in-flight task as finished, waking waiters when none remain
    pub fn done(&self) {
        let previous = self.in_flight.fetch_sub(1, Ordering::AcqRel);
        debug_assert!(previous > 0, "completion counter underflow");
        if previous == 1 {
            self.idle.notify_waiters();
        }
    }

    /// Current number of in-flight tasks
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Waits until the in-flight count is zero
    ///
    /// Returns immediately if nothing is in flight.
    pub async fn wait(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            // Register before checking so a `done` between the check and the await is not lost.
            notified.as_mut().enable();

            if self.in_flight() == 0 {
                return;
            }

            notified.await;
        }
    }
}

/// Marks a task done when dropped, including on unwind
pub(crate) struct TaskGuard<'a> {
    counter: &'a CompletionCounter,
}

impl<'a> TaskGuard<'a> {
    pub(crate) fn new(counter: &'a CompletionCounter) -> Self {
        Self { counter }
    }
}

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        self.counter.done();
    }
}
