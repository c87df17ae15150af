//! Engine assembly.
//!
//! [`TrackingEngine`] wires the store, the location and address providers,
//! the clock and the sampler registry into the services.

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use domain::models::{Coordinate, LocationSample, SessionState};
use domain::services::{
    AddressResolver, Clock, LatestLocationCache, LocationSource, NoopAddressResolver, SystemClock,
};
use domain::store::{PersistenceStore, SessionFilter};

use crate::config::TrackingConfig;
use crate::context::EngineContext;
use crate::error::{EngineError, EngineResult};
use crate::locks::WorkerLocks;
use crate::services::{AttendanceService, ReconciliationService, ScheduleService};
use crate::tracking::{TrackingRegistry, TrackingStatus};

/// Builder for [`TrackingEngine`]. Only the store is required.
#[derive(Default)]
pub struct TrackingEngineBuilder {
    store: Option<Arc<dyn PersistenceStore>>,
    locations: Option<Arc<dyn LocationSource>>,
    addresses: Option<Arc<dyn AddressResolver>>,
    clock: Option<Arc<dyn Clock>>,
    settings: TrackingConfig,
}

impl TrackingEngineBuilder {
    pub fn store(mut self, store: Arc<dyn PersistenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Defaults to the engine's latest-known-location cache.
    pub fn location_source(mut self, locations: Arc<dyn LocationSource>) -> Self {
        self.locations = Some(locations);
        self
    }

    /// Defaults to [`NoopAddressResolver`].
    pub fn address_resolver(mut self, addresses: Arc<dyn AddressResolver>) -> Self {
        self.addresses = Some(addresses);
        self
    }

    /// Defaults to [`SystemClock`].
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn settings(mut self, settings: TrackingConfig) -> Self {
        self.settings = settings;
        self
    }

    pub fn build(self) -> EngineResult<TrackingEngine> {
        let store = self
            .store
            .ok_or_else(|| EngineError::Internal("Tracking engine requires a store".into()))?;

        let latest = Arc::new(LatestLocationCache::new());
        let locations = self
            .locations
            .unwrap_or_else(|| Arc::clone(&latest) as Arc<dyn LocationSource>);

        let ctx = Arc::new(EngineContext {
            store,
            locations,
            latest,
            clock: self
                .clock
                .unwrap_or_else(|| Arc::new(SystemClock) as Arc<dyn Clock>),
            session_locks: WorkerLocks::new(),
            schedule_locks: WorkerLocks::new(),
            settings: self.settings,
        });
        let addresses = self
            .addresses
            .unwrap_or_else(|| Arc::new(NoopAddressResolver) as Arc<dyn AddressResolver>);

        let registry = Arc::new(TrackingRegistry::new(Arc::clone(&ctx)));
        Ok(TrackingEngine {
            attendance: AttendanceService::new(Arc::clone(&ctx), Arc::clone(&registry), addresses),
            schedule: ScheduleService::new(Arc::clone(&ctx)),
            reconciliation: ReconciliationService::new(Arc::clone(&ctx), Arc::clone(&registry)),
            registry,
            ctx,
        })
    }
}

pub struct TrackingEngine {
    ctx: Arc<EngineContext>,
    registry: Arc<TrackingRegistry>,
    attendance: AttendanceService,
    schedule: ScheduleService,
    reconciliation: ReconciliationService,
}

impl TrackingEngine {
    pub fn builder() -> TrackingEngineBuilder {
        TrackingEngineBuilder::default()
    }

    pub fn attendance(&self) -> &AttendanceService {
        &self.attendance
    }

    pub fn schedule(&self) -> &ScheduleService {
        &self.schedule
    }

    pub fn reconciliation(&self) -> &ReconciliationService {
        &self.reconciliation
    }

    pub fn registry(&self) -> &TrackingRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &TrackingConfig {
        &self.ctx.settings
    }

    /// Latest position reported for the worker, if any.
    pub fn latest_location(&self, worker_id: Uuid) -> Option<Coordinate> {
        self.ctx.latest.get(worker_id)
    }

    pub async fn record_location(
        &self,
        worker_id: Uuid,
        coordinate: Coordinate,
    ) -> EngineResult<LocationSample> {
        self.attendance.record_location(worker_id, coordinate).await
    }

    /// Workers currently being sampled.
    pub fn tracking_status(&self) -> Vec<TrackingStatus> {
        self.registry.status()
    }

    pub async fn set_tracking_interval(&self, worker_id: Uuid, minutes: u64) -> EngineResult<()> {
        let _guard = self.ctx.session_locks.lock(worker_id).await;
        self.registry.set_interval(worker_id, minutes)?;
        info!(worker_id = %worker_id, interval_minutes = minutes, "Tracking interval set");
        Ok(())
    }

    /// Starts samplers for every open session, e.g. after a restart.
    ///
    /// Returns the number of workers whose sampler was reconciled.
    pub async fn resume_tracking(&self) -> EngineResult<usize> {
        let mut workers = Vec::new();
        for state in [SessionState::Active, SessionState::OnBreak] {
            let filter = SessionFilter {
                state: Some(state),
                ..SessionFilter::default()
            };
            for session in self.ctx.store.list_sessions(&filter).await? {
                workers.push(session.worker_id);
            }
        }
        workers.sort();
        workers.dedup();

        let mut resumed = 0;
        for worker_id in workers {
            let _guard = self.ctx.session_locks.lock(worker_id).await;
            match self.registry.ensure(worker_id).await {
                Ok(_) => resumed += 1,
                Err(err) => {
                    warn!(worker_id = %worker_id, error = %err, "Failed to resume sampler")
                }
            }
        }

        info!(workers = resumed, "Tracking resumed for open sessions");
        Ok(resumed)
    }

    /// Stops every sampler, waiting up to the configured shutdown timeout.
    pub async fn shutdown(&self) {
        self.registry
            .shutdown(self.ctx.settings.shutdown_timeout())
            .await;
    }
}
