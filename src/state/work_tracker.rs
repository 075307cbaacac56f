//! Outstanding-work counter for a single crawl
//!
//! Every asynchronous unit of a crawl (a fetch, an extraction) holds a
//! [`WorkGuard`]. Guards are registered before the unit becomes schedulable and
//! released exactly once when they are dropped, so the counter cannot reach
//! zero while a child unit is still on its way to a pool.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct Inner {
    outstanding: AtomicUsize,
    idle: Notify,
}

/// Counts outstanding units of work and wakes a waiter when none remain
#[derive(Debug, Clone, Default)]
pub struct WorkTracker {
    inner: Arc<Inner>,
}

impl WorkTracker {
    /// Creates a tracker with no outstanding work
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers one unit of work
    pub fn register(&self) -> WorkGuard {
        self.inner.outstanding.fetch_add(1, Ordering::SeqCst);
        WorkGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Number of units registered and not yet released
    pub fn outstanding(&self) -> usize {
        self.inner.outstanding.load(Ordering::SeqCst)
    }

    /// Waits until every registered unit has been released
    ///
    /// Intended for a single waiter. `notify_one` stores a permit when nobody is
    /// waiting yet, so a release racing with this call is never lost.
    pub async fn wait_idle(&self) {
        loop {
            if self.outstanding() == 0 {
                return;
            }
            self.inner.idle.notified().await;
        }
    }
}

/// One registered unit of work; released on drop
#[must_use = "dropping a WorkGuard immediately releases its unit of work"]
#[derive(Debug)]
pub struct WorkGuard {
    inner: Arc<Inner>,
}

impl WorkGuard {
    /// Releases the unit explicitly
    pub fn arrive(self) {
        drop(self);
    }
}

impl Drop for WorkGuard {
    fn drop(&mut self) {
        if self.inner.outstanding.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.inner.idle.notify_one();
        }
    }
}
