//! Per-worker serialization.
//!
//! Every read-modify-write of a worker's session or schedule happens under
//! that worker's lock. Different workers never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use uuid::Uuid;

/// Number of entries above which idle locks are pruned on the next lookup.
const PRUNE_THRESHOLD: usize = 1024;

/// Map of worker id to an async mutex.
#[derive(Debug, Clone, Default)]
pub struct WorkerLocks {
    inner: Arc<Mutex<HashMap<Uuid, Arc<AsyncMutex<()>>>>>,
}

impl WorkerLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for and holds the worker's lock until the guard is dropped.
    pub async fn lock(&self, worker_id: Uuid) -> OwnedMutexGuard<()> {
        self.handle(worker_id).lock_owned().await
    }

    fn handle(&self, worker_id: Uuid) -> Arc<AsyncMutex<()>> {
        let mut locks = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if locks.len() > PRUNE_THRESHOLD {
            // Only the map holds a reference: nobody is waiting or locked.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        Arc::clone(locks.entry(worker_id).or_default())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
