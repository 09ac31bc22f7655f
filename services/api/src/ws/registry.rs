//! Process-wide call bookkeeping.
//!
//! Holds the `/health` counters, the shutdown token and the tracker every
//! call task runs under. Calls never share state through here.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::{
    sync::{CancellationToken, WaitForCancellationFuture},
    task::{TaskTracker, task_tracker::TrackedFuture},
};
use tracing::{info, warn};

pub struct CallRegistry {
    active: AtomicUsize,
    total: AtomicU64,
    shutdown: CancellationToken,
    tracker: TaskTracker,
}

/// Keeps a call counted as active until dropped.
pub struct CallGuard {
    registry: Arc<CallRegistry>,
    id: u64,
}

impl CallGuard {
    /// Sequential connection number, for logging.
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for CallGuard {
    fn drop(&mut self) {
        self.registry.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Default for CallRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CallRegistry {
    pub fn new() -> Self {
        Self {
            active: AtomicUsize::new(0),
            total: AtomicU64::new(0),
            shutdown: CancellationToken::new(),
            tracker: TaskTracker::new(),
        }
    }

    pub fn register(self: &Arc<Self>) -> CallGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        let id = self.total.fetch_add(1, Ordering::SeqCst) + 1;
        CallGuard {
            registry: Arc::clone(self),
            id,
        }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    /// Wraps a call task so [`wait_idle`](Self::wait_idle) waits for it.
    pub fn track<F: Future>(&self, call: F) -> TrackedFuture<F> {
        self.tracker.track_future(call)
    }

    /// Resolves once [`shutdown`](Self::shutdown) has been called.
    pub fn shutdown_requested(&self) -> WaitForCancellationFuture<'_> {
        self.shutdown.cancelled()
    }

    /// Tells every live call to hang up.
    pub fn shutdown(&self) {
        info!(active = self.active(), "Terminating live calls.");
        self.shutdown.cancel();
    }

    /// Waits up to `grace` for tracked calls to finish tearing down.
    /// Returns `false` if some were still running.
    pub async fn wait_idle(&self, grace: Duration) -> bool {
        self.tracker.close();
        let drained = tokio::time::timeout(grace, self.tracker.wait())
            .await
            .is_ok();
        if !drained {
            warn!(
                running = self.tracker.len(),
                "Calls still active after grace period."
            );
        }
        drained
    }
}
