//! Attendance transitions, manual location reports and session queries.
//!
//! Every read-modify-write of a worker's session runs under that worker's
//! session lock and ends by reconciling the worker's sampler with the
//! registry. Reads reconcile too, so a sampler that died or leaked is
//! repaired on the next request. Network lookups (location, address)
//! happen before the lock.

use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;
use validator::Validate;

use domain::errors::{DomainError, StateConflict};
use domain::models::{
    AttendanceSession, CheckInRequest, Coordinate, GeofenceCheck, GeofenceTarget, LocationSample,
    NewSession, ProgressUpdate, ProgressUpdateRequest, SampleActivity, StartBreakRequest,
};
use domain::services::{validate_geofence, AddressResolver};
use domain::store::SessionFilter;

use crate::context::EngineContext;
use crate::error::{EngineError, EngineResult};
use crate::tracking::TrackingRegistry;
use crate::{metrics, persist};

pub struct AttendanceService {
    ctx: Arc<EngineContext>,
    registry: Arc<TrackingRegistry>,
    addresses: Arc<dyn AddressResolver>,
}

impl AttendanceService {
    pub fn new(
        ctx: Arc<EngineContext>,
        registry: Arc<TrackingRegistry>,
        addresses: Arc<dyn AddressResolver>,
    ) -> Self {
        Self {
            ctx,
            registry,
            addresses,
        }
    }

    // ========================================================================
    // Transitions
    // ========================================================================

    /// Opens a session for the worker and starts their sampler.
    pub async fn check_in(&self, request: CheckInRequest) -> EngineResult<AttendanceSession> {
        request.validate()?;
        if let Some(location) = &request.location {
            location.validate()?;
        }
        if let Some(target) = &request.geofence {
            target.validate_all()?;
        }

        let worker_id = request.worker_id;
        let location = match request.location {
            Some(location) => {
                self.ctx.latest.update(worker_id, location);
                location
            }
            None => self.ctx.acquire_location(worker_id).await.map_err(|err| {
                warn!(worker_id = %worker_id, error = %err, "No location available for check-in");
                EngineError::from(err)
            })?,
        };

        let clock_in_check = match &request.geofence {
            Some(target) => Some(self.geofence_check(worker_id, &location, target).await),
            None => None,
        };

        let _guard = self.ctx.session_locks.lock(worker_id).await;
        let store = self.ctx.store.as_ref();

        if let Some(open) = store.find_active_session_for_worker(worker_id).await? {
            return Err(StateConflict::AlreadyActive {
                worker_id,
                session_id: open.id,
            }
            .into());
        }

        let now = self.ctx.clock.now();
        let mut session = AttendanceSession::open(
            NewSession {
                worker_id,
                building_id: request.building_id,
                work_order_id: request.work_order_id,
                hourly_rate: request.hourly_rate,
                geofence_target: request.geofence,
                clock_in_check,
                history_capacity: self.ctx.history_capacity(),
            },
            now,
        );

        let sample = LocationSample::new(
            location,
            now,
            SampleActivity::CheckIn,
            worker_id,
            Some(session.id),
        );
        session.record_sample(sample.clone());
        persist::save_session(store, &session).await?;
        self.append_history(worker_id, &sample).await;

        self.sync_tracking(worker_id).await;
        metrics::record_check_in();

        info!(
            worker_id = %worker_id,
            session_id = %session.id,
            state = %session.state,
            building_id = ?session.building_id,
            "Worker checked in"
        );
        Ok(session)
    }

    /// `Active` → `OnBreak`.
    pub async fn start_break(
        &self,
        session_id: Uuid,
        request: StartBreakRequest,
    ) -> EngineResult<AttendanceSession> {
        request.validate()?;
        let reason = request.reason.trim().to_string();

        let session = self
            .transition(session_id, move |session, now| {
                session.start_break(reason, now)?;
                Ok(())
            })
            .await?;

        info!(
            worker_id = %session.worker_id,
            session_id = %session.id,
            state = %session.state,
            "Break started"
        );
        Ok(session)
    }

    /// `OnBreak` → `Active`.
    pub async fn end_break(&self, session_id: Uuid) -> EngineResult<AttendanceSession> {
        let session = self
            .transition(session_id, |session, now| {
                session.end_break(now)?;
                Ok(())
            })
            .await?;

        info!(
            worker_id = %session.worker_id,
            session_id = %session.id,
            state = %session.state,
            total_break_minutes = session.total_break_minutes,
            "Break ended"
        );
        Ok(session)
    }

    /// Completes the session and stops the worker's sampler.
    ///
    /// Without a location (none given and none available) the clock-out
    /// geofence check and the check-out sample are skipped.
    pub async fn check_out(
        &self,
        session_id: Uuid,
        location: Option<Coordinate>,
    ) -> EngineResult<AttendanceSession> {
        if let Some(location) = &location {
            location.validate()?;
        }

        let snapshot = self.load(session_id).await?;
        if !snapshot.is_open() {
            return Err(StateConflict::NotCheckedIn {
                session_id,
                state: snapshot.state,
            }
            .into());
        }

        let worker_id = snapshot.worker_id;
        let location = match location {
            Some(location) => {
                self.ctx.latest.update(worker_id, location);
                Some(location)
            }
            None => match self.ctx.acquire_location(worker_id).await {
                Ok(location) => Some(location),
                Err(err) => {
                    warn!(
                        worker_id = %worker_id,
                        session_id = %session_id,
                        error = %err,
                        "No location available for check-out, skipping geofence check"
                    );
                    None
                }
            },
        };

        let clock_out_check = match (&location, &snapshot.geofence_target) {
            (Some(location), Some(target)) => {
                Some(self.geofence_check(worker_id, location, target).await)
            }
            _ => None,
        };

        let _guard = self.ctx.session_locks.lock(worker_id).await;
        let store = self.ctx.store.as_ref();
        let mut session = self.load(session_id).await?;

        let now = self.ctx.clock.now();
        session.check_out(now, clock_out_check)?;

        let sample = location.map(|location| {
            LocationSample::new(
                location,
                now,
                SampleActivity::CheckOut,
                worker_id,
                Some(session_id),
            )
        });
        if let Some(sample) = &sample {
            session.record_sample(sample.clone());
        }

        persist::save_session(store, &session).await?;
        if let Some(sample) = &sample {
            self.append_history(worker_id, sample).await;
        }

        self.sync_tracking(worker_id).await;
        metrics::record_check_out();

        info!(
            worker_id = %worker_id,
            session_id = %session_id,
            state = %session.state,
            raw_hours = session.raw_hours.unwrap_or(0.0),
            calculated_pay = session.calculated_pay,
            "Worker checked out"
        );
        Ok(session)
    }

    /// Appends a progress report to an open session.
    pub async fn add_progress_update(
        &self,
        session_id: Uuid,
        request: ProgressUpdateRequest,
    ) -> EngineResult<AttendanceSession> {
        request.validate()?;
        let ProgressUpdateRequest {
            percent_complete,
            note,
            photos,
        } = request;

        let session = self
            .transition(session_id, move |session, now| {
                session.add_progress_update(ProgressUpdate {
                    percent_complete,
                    note: note.trim().to_string(),
                    photos,
                    recorded_at: now,
                })?;
                Ok(())
            })
            .await?;

        debug!(
            worker_id = %session.worker_id,
            session_id = %session.id,
            percent_complete,
            "Progress update recorded"
        );
        Ok(session)
    }

    // ========================================================================
    // Locations
    // ========================================================================

    /// Records a device-reported location as a manual sample.
    ///
    /// The sample also lands in the worker's open session, if any, and the
    /// location becomes the worker's latest known position.
    pub async fn record_location(
        &self,
        worker_id: Uuid,
        coordinate: Coordinate,
    ) -> EngineResult<LocationSample> {
        coordinate.validate()?;
        self.ctx.latest.update(worker_id, coordinate);

        let _guard = self.ctx.session_locks.lock(worker_id).await;
        let store = self.ctx.store.as_ref();
        let now = self.ctx.clock.now();

        let mut active = store.find_active_session_for_worker(worker_id).await?;
        let sample = LocationSample::new(
            coordinate,
            now,
            SampleActivity::Manual,
            worker_id,
            active.as_ref().map(|s| s.id),
        );

        persist::append_worker_sample(store, worker_id, &sample, self.ctx.history_capacity())
            .await?;

        if let Some(session) = active.as_mut() {
            session.record_sample(sample.clone());
            session.refresh_elapsed(now);
            persist::save_session(store, session).await?;
        }

        self.sync_tracking(worker_id).await;

        debug!(
            worker_id = %worker_id,
            session_id = ?sample.source_session_id,
            "Manual location recorded"
        );
        Ok(sample)
    }

    /// The worker's most recent samples, newest first.
    ///
    /// `limit` is clamped to `1..=history_capacity`.
    pub async fn worker_location_history(
        &self,
        worker_id: Uuid,
        limit: usize,
    ) -> EngineResult<Vec<LocationSample>> {
        let limit = limit.clamp(1, self.ctx.history_capacity().max(1));
        Ok(self.ctx.store.load_worker_history(worker_id, limit).await?)
    }

    // ========================================================================
    // Queries and administration
    // ========================================================================

    pub async fn get_session(&self, session_id: Uuid) -> EngineResult<AttendanceSession> {
        let session = self.load(session_id).await?;
        self.reconcile_tracking(session.worker_id).await;
        Ok(session)
    }

    pub async fn list_sessions(
        &self,
        filter: &SessionFilter,
    ) -> EngineResult<Vec<AttendanceSession>> {
        if let (Some(from), Some(to)) = (filter.from, filter.to) {
            if to < from {
                return Err(DomainError::validation("'to' must not be before 'from'").into());
            }
        }
        let sessions = self.ctx.store.list_sessions(filter).await?;
        let workers: BTreeSet<Uuid> = sessions.iter().map(|s| s.worker_id).collect();
        for worker_id in workers {
            self.reconcile_tracking(worker_id).await;
        }
        Ok(sessions)
    }

    pub async fn active_session_for_worker(
        &self,
        worker_id: Uuid,
    ) -> EngineResult<Option<AttendanceSession>> {
        let session = self.ctx.store.find_active_session_for_worker(worker_id).await?;
        self.reconcile_tracking(worker_id).await;
        Ok(session)
    }

    /// Hard-deletes a session. Deleting an open session stops its sampler.
    pub async fn delete_session(&self, session_id: Uuid) -> EngineResult<()> {
        let worker_id = self.load(session_id).await?.worker_id;

        let _guard = self.ctx.session_locks.lock(worker_id).await;
        if !persist::delete_session(self.ctx.store.as_ref(), session_id).await? {
            return Err(DomainError::session_not_found(session_id).into());
        }
        self.sync_tracking(worker_id).await;

        info!(worker_id = %worker_id, session_id = %session_id, "Session deleted");
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Loads the session, applies `apply` under the worker lock and saves it.
    async fn transition<F>(&self, session_id: Uuid, apply: F) -> EngineResult<AttendanceSession>
    where
        F: FnOnce(&mut AttendanceSession, DateTime<Utc>) -> EngineResult<()> + Send,
    {
        let worker_id = self.load(session_id).await?.worker_id;

        let _guard = self.ctx.session_locks.lock(worker_id).await;
        let mut session = self.load(session_id).await?;

        let now = self.ctx.clock.now();
        apply(&mut session, now)?;
        if session.is_open() {
            session.refresh_elapsed(now);
        }

        persist::save_session(self.ctx.store.as_ref(), &session).await?;
        self.sync_tracking(worker_id).await;
        Ok(session)
    }

    async fn load(&self, session_id: Uuid) -> EngineResult<AttendanceSession> {
        self.ctx
            .store
            .load_session(session_id)
            .await?
            .ok_or_else(|| DomainError::session_not_found(session_id).into())
    }

    async fn geofence_check(
        &self,
        worker_id: Uuid,
        location: &Coordinate,
        target: &GeofenceTarget,
    ) -> GeofenceCheck {
        let validation = validate_geofence(location, target);
        metrics::record_geofence_validation(validation.valid);
        if !validation.valid {
            warn!(
                worker_id = %worker_id,
                distance_meters = validation.distance_meters,
                "{}",
                validation.message
            );
        }

        let address = match self.addresses.reverse_geocode(location).await {
            Ok(address) => address,
            Err(err) => {
                warn!(worker_id = %worker_id, error = %err, "Reverse geocoding failed, omitting address");
                None
            }
        };
        validation.into_check(*location, address)
    }

    /// Appends to the worker's history after the session itself was saved.
    async fn append_history(&self, worker_id: Uuid, sample: &LocationSample) {
        let store = self.ctx.store.as_ref();
        if let Err(err) =
            persist::append_worker_sample(store, worker_id, sample, self.ctx.history_capacity()).await
        {
            warn!(
                worker_id = %worker_id,
                activity = %sample.activity,
                error = %err,
                "Failed to append worker location sample"
            );
        }
    }

    /// Takes the worker's session lock and reconciles their sampler.
    async fn reconcile_tracking(&self, worker_id: Uuid) {
        let _guard = self.ctx.session_locks.lock(worker_id).await;
        self.sync_tracking(worker_id).await;
    }

    async fn sync_tracking(&self, worker_id: Uuid) {
        if let Err(err) = self.registry.ensure(worker_id).await {
            warn!(worker_id = %worker_id, error = %err, "Failed to reconcile sampler");
        }
    }
}
