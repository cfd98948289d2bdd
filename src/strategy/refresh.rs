//! Background refresh pool
//!
//! Cache-first hits are revalidated off the request path. Refreshes run as
//! detached tokio tasks, at most `max_concurrent` at a time, and at most one
//! per cache key: a second hit on a key whose refresh is still running
//! schedules nothing.

use crate::error::WardenResult;
use crate::request::CacheKey;
use std::collections::HashSet;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Notify, Semaphore};
use tracing::debug;

struct Inner {
    permits: Arc<Semaphore>,
    in_flight: Mutex<HashSet<CacheKey>>,
    idle: Notify,
}

impl Inner {
    fn in_flight(&self) -> MutexGuard<'_, HashSet<CacheKey>> {
        self.in_flight.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Releases the key when the task finishes, even if it panicked
struct InFlightGuard {
    inner: Arc<Inner>,
    key: CacheKey,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut set = self.inner.in_flight();
        set.remove(&self.key);
        if set.is_empty() {
            self.inner.idle.notify_waiters();
        }
    }
}

/// Bounded, deduplicating pool for fire-and-forget refreshes
#[derive(Clone)]
pub struct RefreshPool {
    inner: Arc<Inner>,
}

impl RefreshPool {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
                in_flight: Mutex::new(HashSet::new()),
                idle: Notify::new(),
            }),
        }
    }

    /// Spawn `task` for `key` unless one is already running
    ///
    /// Returns whether a task was spawned. Task errors are logged and
    /// otherwise dropped.
    pub fn schedule<F>(&self, key: CacheKey, task: F) -> bool
    where
        F: Future<Output = WardenResult<()>> + Send + 'static,
    {
        if !self.inner.in_flight().insert(key.clone()) {
            debug!("Refresh already in flight for {}", key);
            return false;
        }

        let guard = InFlightGuard {
            inner: Arc::clone(&self.inner),
            key,
        };
        let permits = Arc::clone(&self.inner.permits);

        tokio::spawn(async move {
            let Ok(_permit) = permits.acquire_owned().await else {
                return;
            };
            match task.await {
                Ok(()) => debug!("Background refresh of {} complete", guard.key),
                Err(e) => debug!("Background refresh of {} failed: {}", guard.key, e),
            }
            drop(guard);
        });

        true
    }

    /// Number of keys currently being refreshed
    pub fn in_flight(&self) -> usize {
        self.inner.in_flight().len()
    }

    /// Wait until no refresh is running
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }
}
