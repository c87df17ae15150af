//! Collaborators shared by the registry and the services.

use std::sync::Arc;

use domain::models::Coordinate;
use domain::services::{Clock, LatestLocationCache, LocationSource, LocationSourceError};
use domain::store::PersistenceStore;
use uuid::Uuid;

use crate::config::TrackingConfig;
use crate::locks::WorkerLocks;

pub struct EngineContext {
    pub store: Arc<dyn PersistenceStore>,
    pub locations: Arc<dyn LocationSource>,
    /// Fed by every location the engine sees from a device.
    pub latest: Arc<LatestLocationCache>,
    pub clock: Arc<dyn Clock>,
    /// Serializes attendance transitions and sampler appends.
    pub session_locks: WorkerLocks,
    /// Serializes schedule conflict checks and writes.
    pub schedule_locks: WorkerLocks,
    pub settings: TrackingConfig,
}

impl EngineContext {
    /// Asks the location source, bounded by the configured timeout.
    pub async fn acquire_location(&self, worker_id: Uuid) -> Result<Coordinate, LocationSourceError> {
        let timeout = self.settings.location_timeout();
        match tokio::time::timeout(timeout, self.locations.current_location(worker_id)).await {
            Ok(result) => result,
            Err(_) => Err(LocationSourceError::Timeout(timeout)),
        }
    }

    pub fn history_capacity(&self) -> usize {
        self.settings.history_capacity
    }
}
