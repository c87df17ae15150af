//! Live samplers, at most one per worker.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use domain::errors::DomainError;

use super::sampler::LocationSampler;
use crate::context::EngineContext;
use crate::error::EngineResult;
use crate::metrics;

/// Result of reconciling a worker's sampler with their session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnsureOutcome {
    /// A sampler was spawned.
    Started,
    /// A live sampler already exists.
    AlreadyRunning,
    /// The worker has no open session; the sampler was signalled to stop.
    Stopped,
    /// No open session and no sampler.
    Idle,
}

/// A live sampler as reported by [`TrackingRegistry::status`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingStatus {
    #[serde(rename = "workerID")]
    pub worker_id: Uuid,
    pub interval_minutes: u64,
}

struct SamplerHandle {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
    interval: Duration,
}

impl SamplerHandle {
    fn is_live(&self) -> bool {
        !self.handle.is_finished()
    }

    fn signal(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Owns every sampler task. Injected into the services; never global.
pub struct TrackingRegistry {
    ctx: Arc<EngineContext>,
    samplers: Mutex<HashMap<Uuid, SamplerHandle>>,
    intervals: Mutex<HashMap<Uuid, Duration>>,
    closed: AtomicBool,
}

impl TrackingRegistry {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self {
            ctx,
            samplers: Mutex::new(HashMap::new()),
            intervals: Mutex::new(HashMap::new()),
            closed: AtomicBool::new(false),
        }
    }

    /// Starts or stops the worker's sampler to match their session state.
    ///
    /// Idempotent. Callers hold the worker's session lock.
    pub async fn ensure(&self, worker_id: Uuid) -> EngineResult<EnsureOutcome> {
        let open = self
            .ctx
            .store
            .find_active_session_for_worker(worker_id)
            .await?
            .is_some();

        if !open || self.closed.load(Ordering::SeqCst) {
            return Ok(if self.stop(worker_id) {
                EnsureOutcome::Stopped
            } else {
                EnsureOutcome::Idle
            });
        }

        let mut samplers = self.lock_samplers();
        if samplers.get(&worker_id).is_some_and(SamplerHandle::is_live) {
            return Ok(EnsureOutcome::AlreadyRunning);
        }

        let interval = self.interval_for(worker_id);
        samplers.insert(worker_id, self.spawn(worker_id, interval));
        Self::publish_live(&mut samplers);
        info!(worker_id = %worker_id, interval_secs = interval.as_secs(), "Sampler registered");
        Ok(EnsureOutcome::Started)
    }

    /// Signals the worker's sampler to exit and deregisters it.
    ///
    /// Does not wait for the task: the sampler may be blocked on the worker
    /// lock held by the caller. Returns whether a sampler was registered.
    pub fn stop(&self, worker_id: Uuid) -> bool {
        let mut samplers = self.lock_samplers();
        let removed = samplers.remove(&worker_id);
        Self::publish_live(&mut samplers);
        drop(samplers);

        match removed {
            Some(sampler) => {
                sampler.signal();
                info!(worker_id = %worker_id, "Sampler deregistered");
                true
            }
            None => false,
        }
    }

    /// Sets the worker's sampling interval, restarting a live sampler.
    pub fn set_interval(&self, worker_id: Uuid, minutes: u64) -> EngineResult<()> {
        let settings = &self.ctx.settings;
        if !settings.interval_in_bounds(minutes) {
            return Err(DomainError::validation(format!(
                "Tracking interval must be between {} and {} minutes",
                settings.min_interval_minutes, settings.max_interval_minutes
            ))
            .into());
        }

        let interval = Duration::from_secs(minutes * 60);
        {
            let mut intervals = self.lock_intervals();
            if interval == settings.default_interval() {
                intervals.remove(&worker_id);
            } else {
                intervals.insert(worker_id, interval);
            }
        }

        let mut samplers = self.lock_samplers();
        let restart = samplers
            .get(&worker_id)
            .is_some_and(|s| s.is_live() && s.interval != interval);
        if restart && !self.closed.load(Ordering::SeqCst) {
            if let Some(old) = samplers.remove(&worker_id) {
                old.signal();
            }
            samplers.insert(worker_id, self.spawn(worker_id, interval));
            info!(worker_id = %worker_id, interval_minutes = minutes, "Sampler restarted with new interval");
        }
        Self::publish_live(&mut samplers);
        Ok(())
    }

    /// Effective sampling interval for the worker.
    pub fn interval_for(&self, worker_id: Uuid) -> Duration {
        self.lock_intervals()
            .get(&worker_id)
            .copied()
            .unwrap_or_else(|| self.ctx.settings.default_interval())
    }

    pub fn is_running(&self, worker_id: Uuid) -> bool {
        self.lock_samplers()
            .get(&worker_id)
            .is_some_and(SamplerHandle::is_live)
    }

    /// Workers with a live sampler, ordered by worker id.
    pub fn live_workers(&self) -> Vec<Uuid> {
        self.status().into_iter().map(|s| s.worker_id).collect()
    }

    pub fn status(&self) -> Vec<TrackingStatus> {
        let samplers = self.lock_samplers();
        let mut live: Vec<TrackingStatus> = samplers
            .iter()
            .filter(|(_, s)| s.is_live())
            .map(|(worker_id, s)| TrackingStatus {
                worker_id: *worker_id,
                interval_minutes: s.interval.as_secs() / 60,
            })
            .collect();
        live.sort_by_key(|s| s.worker_id);
        live
    }

    /// Stops every sampler and waits for them, bounded by `timeout`.
    ///
    /// After shutdown `ensure` no longer starts samplers.
    pub async fn shutdown(&self, timeout: Duration) {
        self.closed.store(true, Ordering::SeqCst);

        let drained: Vec<SamplerHandle> = {
            let mut samplers = self.lock_samplers();
            let drained = samplers.drain().map(|(_, s)| s).collect();
            metrics::set_active_samplers(0);
            drained
        };

        info!(count = drained.len(), "Shutting down samplers (timeout: {:?})", timeout);
        for sampler in &drained {
            sampler.signal();
        }

        let wait_all = async {
            for sampler in drained {
                if let Err(e) = sampler.handle.await {
                    warn!("Sampler task panicked: {}", e);
                }
            }
        };

        match tokio::time::timeout(timeout, wait_all).await {
            Ok(()) => info!("All samplers stopped"),
            Err(_) => warn!("Sampler shutdown timed out after {:?}", timeout),
        }
    }

    fn spawn(&self, worker_id: Uuid, interval: Duration) -> SamplerHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let sampler = LocationSampler::new(worker_id, Arc::clone(&self.ctx));
        let handle = tokio::spawn(sampler.run(interval, shutdown_rx));
        SamplerHandle {
            shutdown_tx,
            handle,
            interval,
        }
    }

    /// Drops handles of samplers that exited on their own and publishes the live count.
    fn publish_live(samplers: &mut HashMap<Uuid, SamplerHandle>) {
        samplers.retain(|_, s| s.is_live());
        metrics::set_active_samplers(samplers.len());
    }

    #[cfg(test)]
    fn registered(&self) -> usize {
        self.lock_samplers().len()
    }

    #[cfg(test)]
    fn overrides(&self) -> usize {
        self.lock_intervals().len()
    }

    fn lock_samplers(&self) -> MutexGuard<'_, HashMap<Uuid, SamplerHandle>> {
        self.samplers.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_intervals(&self) -> MutexGuard<'_, HashMap<Uuid, Duration>> {
        self.intervals.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackingConfig;
    use crate::locks::WorkerLocks;
    use chrono::{TimeZone, Utc};
    use domain::models::{AttendanceSession, Coordinate, NewSession};
    use domain::services::{LatestLocationCache, ManualClock, MockLocationSource};
    use domain::store::PersistenceStore;
    use persistence::InMemoryStore;

    fn registry(store: Arc<InMemoryStore>) -> TrackingRegistry {
        TrackingRegistry::new(Arc::new(EngineContext {
            store,
            locations: Arc::new(MockLocationSource::fixed(Coordinate::new(38.9, -77.0))),
            latest: Arc::new(LatestLocationCache::new()),
            clock: Arc::new(ManualClock::new(
                Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap(),
            )),
            session_locks: WorkerLocks::new(),
            schedule_locks: WorkerLocks::new(),
            settings: TrackingConfig::default(),
        }))
    }

    async fn open_session(store: &InMemoryStore, worker_id: Uuid) -> AttendanceSession {
        let session = AttendanceSession::open(
            NewSession {
                worker_id,
                building_id: None,
                work_order_id: None,
                hourly_rate: 20.0,
                geofence_target: None,
                clock_in_check: None,
                history_capacity: 10,
            },
            Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap(),
        );
        store.save_session(&session).await.unwrap();
        session
    }

    #[tokio::test(start_paused = true)]
    async fn test_ensure_is_idempotent() {
        let store = Arc::new(InMemoryStore::new());
        let registry = registry(Arc::clone(&store));
        let worker = Uuid::new_v4();
        open_session(&store, worker).await;

        assert_eq!(registry.ensure(worker).await.unwrap(), EnsureOutcome::Started);
        assert_eq!(registry.ensure(worker).await.unwrap(), EnsureOutcome::AlreadyRunning);
        assert_eq!(registry.live_workers(), vec![worker]);

        registry.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test]
    async fn test_ensure_without_session_is_idle() {
        let store = Arc::new(InMemoryStore::new());
        let registry = registry(store);
        assert_eq!(registry.ensure(Uuid::new_v4()).await.unwrap(), EnsureOutcome::Idle);
        assert!(registry.live_workers().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ensure_stops_after_session_closes() {
        let store = Arc::new(InMemoryStore::new());
        let registry = registry(Arc::clone(&store));
        let worker = Uuid::new_v4();
        let mut session = open_session(&store, worker).await;
        registry.ensure(worker).await.unwrap();

        session
            .check_out(Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap(), None)
            .unwrap();
        store.save_session(&session).await.unwrap();

        assert_eq!(registry.ensure(worker).await.unwrap(), EnsureOutcome::Stopped);
        assert!(!registry.is_running(worker));
        assert_eq!(registry.ensure(worker).await.unwrap(), EnsureOutcome::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_interval_validates_range() {
        let store = Arc::new(InMemoryStore::new());
        let registry = registry(store);
        let worker = Uuid::new_v4();

        assert!(registry.set_interval(worker, 0).is_err());
        assert!(registry.set_interval(worker, 61).is_err());
        registry.set_interval(worker, 15).unwrap();
        assert_eq!(registry.interval_for(worker), Duration::from_secs(900));
        assert_eq!(registry.interval_for(Uuid::new_v4()), Duration::from_secs(300));
        assert_eq!(registry.overrides(), 1);

        registry.set_interval(worker, 5).unwrap();
        assert_eq!(registry.interval_for(worker), Duration::from_secs(300));
        assert_eq!(registry.overrides(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exited_samplers_are_pruned() {
        let store = Arc::new(InMemoryStore::new());
        let registry = registry(Arc::clone(&store));
        let gone = Uuid::new_v4();
        let session = open_session(&store, gone).await;
        registry.ensure(gone).await.unwrap();

        // Session removed without going through the registry; the next tick exits.
        store.delete_session(session.id).await.unwrap();
        tokio::time::sleep(Duration::from_secs(5 * 60 + 1)).await;
        assert!(!registry.is_running(gone));
        assert_eq!(registry.registered(), 1);

        let worker = Uuid::new_v4();
        open_session(&store, worker).await;
        assert_eq!(registry.ensure(worker).await.unwrap(), EnsureOutcome::Started);
        assert_eq!(registry.registered(), 1);
        assert_eq!(registry.live_workers(), vec![worker]);

        registry.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_interval_restarts_live_sampler() {
        let store = Arc::new(InMemoryStore::new());
        let registry = registry(Arc::clone(&store));
        let worker = Uuid::new_v4();
        open_session(&store, worker).await;
        registry.ensure(worker).await.unwrap();

        registry.set_interval(worker, 1).unwrap();
        assert_eq!(
            registry.status(),
            vec![TrackingStatus {
                worker_id: worker,
                interval_minutes: 1
            }]
        );

        tokio::time::sleep(Duration::from_secs(3 * 60 + 1)).await;
        assert_eq!(store.load_worker_history(worker, 10).await.unwrap().len(), 3);

        registry.shutdown(Duration::from_secs(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_everything() {
        let store = Arc::new(InMemoryStore::new());
        let registry = registry(Arc::clone(&store));
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        open_session(&store, a).await;
        open_session(&store, b).await;
        registry.ensure(a).await.unwrap();
        registry.ensure(b).await.unwrap();
        assert_eq!(registry.live_workers().len(), 2);

        registry.shutdown(Duration::from_secs(5)).await;
        assert!(registry.live_workers().is_empty());
        assert_eq!(registry.ensure(a).await.unwrap(), EnsureOutcome::Idle);
    }
}
