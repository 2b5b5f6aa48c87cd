//! Counter of admitted tasks that have not settled yet.
//!
//! Backed by a `tokio::sync::watch` channel so [`InFlight::wait`] can sleep
//! until the count returns to zero without polling.

use std::sync::Arc;

use tokio::sync::watch;

/// Shared in-flight counter.
#[derive(Debug)]
pub struct InFlight {
    count: watch::Sender<usize>,
}

impl InFlight {
    /// Create a counter starting at zero.
    pub fn new() -> Self {
        let (count, _) = watch::channel(0);
        Self { count }
    }

    /// Increment the counter.
    pub fn add(&self) {
        self.count.send_modify(|n| *n += 1);
    }

    /// Decrement the counter, waking waiters when it reaches zero.
    pub fn done(&self) {
        self.count.send_modify(|n| {
            debug_assert!(*n > 0, "in-flight counter underflow");
            *n = n.saturating_sub(1);
        });
    }

    /// Current count.
    pub fn count(&self) -> usize {
        *self.count.borrow()
    }

    /// Wait until the count is zero. Returns immediately if it already is.
    pub async fn wait(&self) {
        let mut rx = self.count.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|n| *n == 0).await;
    }

    /// Increment the counter and return a guard that decrements it again
    /// on drop unless [`Admission::commit`] is called.
    ///
    /// Used by `enqueue`, whose send may be cancelled while waiting on a full
    /// queue.
    pub fn admit(self: &Arc<Self>) -> Admission {
        self.add();
        Admission {
            counter: Some(Arc::clone(self)),
        }
    }
}

impl Default for InFlight {
    fn default() -> Self {
        Self::new()
    }
}

/// Pending increment created by [`InFlight::admit`].
#[derive(Debug)]
#[must_use = "dropping an Admission without committing undoes the increment"]
pub struct Admission {
    counter: Option<Arc<InFlight>>,
}

impl Admission {
    /// Keep the increment; the task is now owned by the dispatcher.
    pub fn commit(mut self) {
        self.counter = None;
    }
}

impl Drop for Admission {
    fn drop(&mut self) {
        if let Some(counter) = self.counter.take() {
            counter.done();
        }
    }
}
