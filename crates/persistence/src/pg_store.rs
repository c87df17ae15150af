//! PostgreSQL persistence backend.

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use domain::models::{AttendanceSession, LocationSample, WorkerScheduleEntry};
use domain::store::{PersistenceStore, SessionFilter, StoreError};

use crate::repositories::{
    AttendanceSessionRepository, LocationSampleRepository, ScheduleEntryRepository, SessionQuery,
};

/// Maps sqlx errors onto the store taxonomy.
///
/// Connection-level failures and serialization conflicts are retryable.
pub fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::RowNotFound => StoreError::NotFound("Record not found".into()),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Transient(err.to_string())
        }
        sqlx::Error::Database(db_err) => match db_err.code().as_deref() {
            // serialization_failure, deadlock_detected
            Some("40001") | Some("40P01") => StoreError::Transient(db_err.to_string()),
            _ => StoreError::Backend(format!("Database error: {}", db_err)),
        },
        other => StoreError::Backend(format!("Database error: {}", other)),
    }
}

/// [`PersistenceStore`] over the sqlx repositories.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
    sessions: AttendanceSessionRepository,
    locations: LocationSampleRepository,
    schedule: ScheduleEntryRepository,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            sessions: AttendanceSessionRepository::new(pool.clone()),
            locations: LocationSampleRepository::new(pool.clone()),
            schedule: ScheduleEntryRepository::new(pool.clone()),
            pool,
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies the embedded SQL migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./src/migrations").run(&self.pool).await
    }
}

#[async_trait::async_trait]
impl PersistenceStore for PgStore {
    async fn load_session(&self, session_id: Uuid) -> Result<Option<AttendanceSession>, StoreError> {
        let entity = self
            .sessions
            .find_by_id(session_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(entity.map(Into::into))
    }

    async fn save_session(&self, session: &AttendanceSession) -> Result<(), StoreError> {
        self.sessions.upsert(session).await.map_err(map_sqlx_error)
    }

    async fn delete_session(&self, session_id: Uuid) -> Result<bool, StoreError> {
        self.sessions.delete(session_id).await.map_err(map_sqlx_error)
    }

    async fn find_active_session_for_worker(
        &self,
        worker_id: Uuid,
    ) -> Result<Option<AttendanceSession>, StoreError> {
        let entity = self
            .sessions
            .find_open_for_worker(worker_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(entity.map(Into::into))
    }

    async fn list_sessions(
        &self,
        filter: &SessionFilter,
    ) -> Result<Vec<AttendanceSession>, StoreError> {
        let query = SessionQuery {
            worker_id: filter.worker_id,
            state: filter.state.map(|s| s.as_str().to_string()),
            from: filter.from,
            to: filter.to,
            approved: filter.approved,
        };
        let entities = self.sessions.list(&query).await.map_err(map_sqlx_error)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn append_worker_sample(
        &self,
        worker_id: Uuid,
        sample: &LocationSample,
        capacity: usize,
    ) -> Result<(), StoreError> {
        let evicted = self
            .locations
            .append(worker_id, sample, capacity)
            .await
            .map_err(map_sqlx_error)?;
        if evicted > 0 {
            tracing::trace!(worker_id = %worker_id, evicted, "Trimmed worker location history");
        }
        Ok(())
    }

    async fn load_worker_history(
        &self,
        worker_id: Uuid,
        limit: usize,
    ) -> Result<Vec<LocationSample>, StoreError> {
        let entities = self
            .locations
            .recent(worker_id, limit)
            .await
            .map_err(map_sqlx_error)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn load_schedule_entry(
        &self,
        entry_id: Uuid,
    ) -> Result<Option<WorkerScheduleEntry>, StoreError> {
        let entity = self
            .schedule
            .find_by_id(entry_id)
            .await
            .map_err(map_sqlx_error)?;
        Ok(entity.map(Into::into))
    }

    async fn load_schedule_entries_for_worker_on_date(
        &self,
        worker_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<WorkerScheduleEntry>, StoreError> {
        let entities = self
            .schedule
            .list_for_worker_on_date(worker_id, date)
            .await
            .map_err(map_sqlx_error)?;
        Ok(entities.into_iter().map(Into::into).collect())
    }

    async fn save_schedule_entry(&self, entry: &WorkerScheduleEntry) -> Result<(), StoreError> {
        self.schedule.upsert(entry).await.map_err(map_sqlx_error)
    }

    async fn delete_schedule_entry(&self, entry_id: Uuid) -> Result<bool, StoreError> {
        self.schedule.delete(entry_id).await.map_err(map_sqlx_error)
    }
}
