//! Worker schedule entry repository for database operations.

use chrono::NaiveDate;
use domain::models::WorkerScheduleEntry;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::ScheduleEntryEntity;
use crate::metrics::QueryTimer;

/// Repository for schedule entry database operations.
#[derive(Clone)]
pub struct ScheduleEntryRepository {
    pool: PgPool,
}

impl ScheduleEntryRepository {
    /// Creates a new ScheduleEntryRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find entry by ID.
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<ScheduleEntryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_schedule_entry_by_id");

        let result = sqlx::query_as::<_, ScheduleEntryEntity>(
            r#"
            SELECT id, worker_id, building_id, date, start_time, end_time, task, status,
                   created_at, updated_at
            FROM worker_schedule_entries
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.record();
        result
    }

    /// All entries of a worker on a date, ordered by start time.
    pub async fn list_for_worker_on_date(
        &self,
        worker_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<ScheduleEntryEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_schedule_entries_for_worker_on_date");

        let result = sqlx::query_as::<_, ScheduleEntryEntity>(
            r#"
            SELECT id, worker_id, building_id, date, start_time, end_time, task, status,
                   created_at, updated_at
            FROM worker_schedule_entries
            WHERE worker_id = $1 AND date = $2
            ORDER BY start_time, id
            "#,
        )
        .bind(worker_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await;

        timer.record();
        result
    }

    /// Insert or replace an entry.
    pub async fn upsert(&self, entry: &WorkerScheduleEntry) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("upsert_schedule_entry");

        let result = sqlx::query(
            r#"
            INSERT INTO worker_schedule_entries (
                id, worker_id, building_id, date, start_time, end_time, task, status,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (id) DO UPDATE SET
                building_id = EXCLUDED.building_id,
                date = EXCLUDED.date,
                start_time = EXCLUDED.start_time,
                end_time = EXCLUDED.end_time,
                task = EXCLUDED.task,
                status = EXCLUDED.status,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(entry.id)
        .bind(entry.worker_id)
        .bind(entry.building_id)
        .bind(entry.date)
        .bind(entry.start_time)
        .bind(entry.end_time)
        .bind(&entry.task)
        .bind(entry.status.as_str())
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await;

        timer.record();
        result.map(|_| ())
    }

    /// Delete an entry. Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_schedule_entry");

        let result = sqlx::query("DELETE FROM worker_schedule_entries WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
