//! Sources of a worker's current position.
//!
//! The sampler asks a [`LocationSource`] on every tick. The default source is
//! [`LatestLocationCache`], fed by device uploads through the engine.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::Coordinate;

/// Why a location could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationSourceError {
    #[error("No location available for worker {0}")]
    Unavailable(Uuid),

    #[error("Location lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Location provider failed: {0}")]
    Provider(String),
}

/// Provides the current location of a worker.
#[async_trait::async_trait]
pub trait LocationSource: Send + Sync {
    async fn current_location(&self, worker_id: Uuid) -> Result<Coordinate, LocationSourceError>;
}

/// Last coordinate reported per worker.
#[derive(Debug, Default)]
pub struct LatestLocationCache {
    latest: RwLock<HashMap<Uuid, Coordinate>>,
}

impl LatestLocationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, worker_id: Uuid, coordinate: Coordinate) {
        let mut latest = self.latest.write().unwrap_or_else(|e| e.into_inner());
        latest.insert(worker_id, coordinate);
    }

    pub fn get(&self, worker_id: Uuid) -> Option<Coordinate> {
        let latest = self.latest.read().unwrap_or_else(|e| e.into_inner());
        latest.get(&worker_id).copied()
    }
}

#[async_trait::async_trait]
impl LocationSource for LatestLocationCache {
    async fn current_location(&self, worker_id: Uuid) -> Result<Coordinate, LocationSourceError> {
        self.get(worker_id)
            .ok_or(LocationSourceError::Unavailable(worker_id))
    }
}

/// Mock location source for development and testing.
///
/// Replays queued results first, then falls back to a fixed coordinate (or
/// `Unavailable` when none is set). An optional delay simulates a slow
/// provider.
#[derive(Debug, Default)]
pub struct MockLocationSource {
    fixed: Option<Coordinate>,
    delay: Option<Duration>,
    queued: Mutex<VecDeque<Result<Coordinate, LocationSourceError>>>,
}

impl MockLocationSource {
    /// Always returns `coordinate`.
    pub fn fixed(coordinate: Coordinate) -> Self {
        Self {
            fixed: Some(coordinate),
            ..Self::default()
        }
    }

    /// Never has a location.
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queues a one-shot result returned before the fixed coordinate.
    pub fn push(&self, result: Result<Coordinate, LocationSourceError>) {
        self.queue().push_back(result);
    }

    fn queue(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<Coordinate, LocationSourceError>>> {
        self.queued.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl LocationSource for MockLocationSource {
    async fn current_location(&self, worker_id: Uuid) -> Result<Coordinate, LocationSourceError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let queued = self.queue().pop_front();
        if let Some(result) = queued {
            tracing::debug!(worker_id = %worker_id, ok = result.is_ok(), "Mock: Replaying queued location");
            return result;
        }

        self.fixed
            .ok_or(LocationSourceError::Unavailable(worker_id))
    }
}
