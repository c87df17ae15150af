//! Persistence boundary used by the tracking engine.
//!
//! Implementations must support the per-worker atomicity the engine relies
//! on: a `save_session` following a `find_active_session_for_worker` under the
//! engine's worker lock must not be interleaved with another writer for the
//! same worker.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{AttendanceSession, LocationSample, SessionState, WorkerScheduleEntry};

/// Errors reported by a persistence backend.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Record not found: {0}")]
    NotFound(String),

    /// A failure worth retrying (connection reset, pool timeout, serialization failure).
    #[error("Transient storage failure: {0}")]
    Transient(String),

    #[error("Storage failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

/// Query filter for listing sessions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFilter {
    #[serde(rename = "workerID", default)]
    pub worker_id: Option<Uuid>,
    pub state: Option<SessionState>,
    /// Inclusive lower bound on clock-in time.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound on clock-in time.
    pub to: Option<DateTime<Utc>>,
    pub approved: Option<bool>,
}

impl SessionFilter {
    pub fn for_worker(worker_id: Uuid) -> Self {
        Self {
            worker_id: Some(worker_id),
            ..Self::default()
        }
    }

    pub fn matches(&self, session: &AttendanceSession) -> bool {
        self.worker_id.map_or(true, |w| w == session.worker_id)
            && self.state.map_or(true, |s| s == session.state)
            && self.from.map_or(true, |from| session.clock_in_time >= from)
            && self.to.map_or(true, |to| session.clock_in_time < to)
            && self.approved.map_or(true, |a| a == session.is_approved)
    }
}

/// Document store for sessions, worker location history and schedule entries.
#[async_trait::async_trait]
pub trait PersistenceStore: Send + Sync {
    async fn load_session(&self, session_id: Uuid) -> Result<Option<AttendanceSession>, StoreError>;

    /// Inserts or replaces the session document.
    async fn save_session(&self, session: &AttendanceSession) -> Result<(), StoreError>;

    /// Hard delete. Returns whether a session was removed.
    async fn delete_session(&self, session_id: Uuid) -> Result<bool, StoreError>;

    /// The worker's session in state `Active` or `OnBreak`, if any.
    async fn find_active_session_for_worker(
        &self,
        worker_id: Uuid,
    ) -> Result<Option<AttendanceSession>, StoreError>;

    /// Sessions matching the filter, ordered by clock-in time (newest first).
    async fn list_sessions(
        &self,
        filter: &SessionFilter,
    ) -> Result<Vec<AttendanceSession>, StoreError>;

    /// Appends to the worker's bounded history, evicting the oldest past `capacity`.
    async fn append_worker_sample(
        &self,
        worker_id: Uuid,
        sample: &LocationSample,
        capacity: usize,
    ) -> Result<(), StoreError>;

    /// Up to `limit` samples of the worker's history, newest first.
    async fn load_worker_history(
        &self,
        worker_id: Uuid,
        limit: usize,
    ) -> Result<Vec<LocationSample>, StoreError>;

    async fn load_schedule_entry(
        &self,
        entry_id: Uuid,
    ) -> Result<Option<WorkerScheduleEntry>, StoreError>;

    async fn load_schedule_entries_for_worker_on_date(
        &self,
        worker_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<WorkerScheduleEntry>, StoreError>;

    /// Inserts or replaces the schedule entry.
    async fn save_schedule_entry(&self, entry: &WorkerScheduleEntry) -> Result<(), StoreError>;

    async fn delete_schedule_entry(&self, entry_id: Uuid) -> Result<bool, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::NewSession;
    use chrono::{Duration, TimeZone};

    fn session_at(worker_id: Uuid, clock_in: DateTime<Utc>) -> AttendanceSession {
        AttendanceSession::open(
            NewSession {
                worker_id,
                building_id: None,
                work_order_id: None,
                hourly_rate: 15.0,
                geofence_target: None,
                clock_in_check: None,
                history_capacity: 5,
            },
            clock_in,
        )
    }

    #[test]
    fn test_store_error_transient() {
        assert!(StoreError::Transient("pool timed out".into()).is_transient());
        assert!(!StoreError::Backend("syntax error".into()).is_transient());
    }

    #[test]
    fn test_session_filter_matches() {
        let worker = Uuid::new_v4();
        let start = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let session = session_at(worker, start);

        assert!(SessionFilter::default().matches(&session));
        assert!(SessionFilter::for_worker(worker).matches(&session));
        assert!(!SessionFilter::for_worker(Uuid::new_v4()).matches(&session));

        let filter = SessionFilter {
            state: Some(SessionState::Completed),
            ..SessionFilter::default()
        };
        assert!(!filter.matches(&session));

        let filter = SessionFilter {
            from: Some(start),
            to: Some(start + Duration::hours(1)),
            approved: Some(false),
            ..SessionFilter::default()
        };
        assert!(filter.matches(&session));
    }
}
