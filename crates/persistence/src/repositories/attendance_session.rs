//! Attendance session repository for database operations.

use chrono::{DateTime, Utc};
use domain::models::AttendanceSession;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::entities::AttendanceSessionEntity;
use crate::metrics::QueryTimer;

const SESSION_COLUMNS: &str = r#"
    id, worker_id, building_id, work_order_id, state, clock_in_time, clock_out_time,
    breaks, total_break_minutes, elapsed_seconds, raw_hours, corrected_hours,
    geofence_target, geofence, hourly_rate, calculated_pay,
    is_approved, approved_by, approved_at, rejection_reason,
    original_hours, correction_reason, corrected_by, corrected_at,
    progress_updates, location_history, created_at, updated_at
"#;

/// Query parameters for listing sessions.
#[derive(Debug, Clone, Default)]
pub struct SessionQuery {
    pub worker_id: Option<Uuid>,
    pub state: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub approved: Option<bool>,
}

/// Repository for attendance session database operations.
#[derive(Clone)]
pub struct AttendanceSessionRepository {
    pool: PgPool,
}

impl AttendanceSessionRepository {
    /// Creates a new AttendanceSessionRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Find session by ID.
    pub async fn find_by_id(
        &self,
        id: Uuid,
    ) -> Result<Option<AttendanceSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_attendance_session_by_id");

        let query = format!("SELECT {} FROM attendance_sessions WHERE id = $1", SESSION_COLUMNS);
        let result = sqlx::query_as::<_, AttendanceSessionEntity>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await;

        timer.record();
        result
    }

    /// Find the worker's active or on-break session.
    pub async fn find_open_for_worker(
        &self,
        worker_id: Uuid,
    ) -> Result<Option<AttendanceSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("find_open_attendance_session_for_worker");

        let query = format!(
            r#"
            SELECT {} FROM attendance_sessions
            WHERE worker_id = $1 AND state IN ('active', 'on_break')
            ORDER BY clock_in_time DESC
            LIMIT 1
            "#,
            SESSION_COLUMNS
        );
        let result = sqlx::query_as::<_, AttendanceSessionEntity>(&query)
            .bind(worker_id)
            .fetch_optional(&self.pool)
            .await;

        timer.record();
        result
    }

    /// List sessions, newest clock-in first.
    pub async fn list(
        &self,
        query: &SessionQuery,
    ) -> Result<Vec<AttendanceSessionEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_attendance_sessions");

        let sql = format!(
            r#"
            SELECT {} FROM attendance_sessions
            WHERE ($1::uuid IS NULL OR worker_id = $1)
              AND ($2::text IS NULL OR state = $2)
              AND ($3::timestamptz IS NULL OR clock_in_time >= $3)
              AND ($4::timestamptz IS NULL OR clock_in_time < $4)
              AND ($5::boolean IS NULL OR is_approved = $5)
            ORDER BY clock_in_time DESC, id
            "#,
            SESSION_COLUMNS
        );
        let result = sqlx::query_as::<_, AttendanceSessionEntity>(&sql)
            .bind(query.worker_id)
            .bind(query.state.as_deref())
            .bind(query.from)
            .bind(query.to)
            .bind(query.approved)
            .fetch_all(&self.pool)
            .await;

        timer.record();
        result
    }

    /// Insert or replace the whole session document.
    pub async fn upsert(&self, session: &AttendanceSession) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("upsert_attendance_session");

        let result = sqlx::query(
            r#"
            INSERT INTO attendance_sessions (
                id, worker_id, building_id, work_order_id, state, clock_in_time, clock_out_time,
                breaks, total_break_minutes, elapsed_seconds, raw_hours, corrected_hours,
                geofence_target, geofence, hourly_rate, calculated_pay,
                is_approved, approved_by, approved_at, rejection_reason,
                original_hours, correction_reason, corrected_by, corrected_at,
                progress_updates, location_history, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14,
                $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28
            )
            ON CONFLICT (id) DO UPDATE SET
                building_id = EXCLUDED.building_id,
                work_order_id = EXCLUDED.work_order_id,
                state = EXCLUDED.state,
                clock_out_time = EXCLUDED.clock_out_time,
                breaks = EXCLUDED.breaks,
                total_break_minutes = EXCLUDED.total_break_minutes,
                elapsed_seconds = EXCLUDED.elapsed_seconds,
                raw_hours = EXCLUDED.raw_hours,
                corrected_hours = EXCLUDED.corrected_hours,
                geofence_target = EXCLUDED.geofence_target,
                geofence = EXCLUDED.geofence,
                hourly_rate = EXCLUDED.hourly_rate,
                calculated_pay = EXCLUDED.calculated_pay,
                is_approved = EXCLUDED.is_approved,
                approved_by = EXCLUDED.approved_by,
                approved_at = EXCLUDED.approved_at,
                rejection_reason = EXCLUDED.rejection_reason,
                original_hours = EXCLUDED.original_hours,
                correction_reason = EXCLUDED.correction_reason,
                corrected_by = EXCLUDED.corrected_by,
                corrected_at = EXCLUDED.corrected_at,
                progress_updates = EXCLUDED.progress_updates,
                location_history = EXCLUDED.location_history,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(session.id)
        .bind(session.worker_id)
        .bind(session.building_id)
        .bind(session.work_order_id)
        .bind(session.state.as_str())
        .bind(session.clock_in_time)
        .bind(session.clock_out_time)
        .bind(Json(&session.breaks))
        .bind(session.total_break_minutes)
        .bind(session.elapsed_seconds)
        .bind(session.raw_hours)
        .bind(session.corrected_hours)
        .bind(session.geofence_target.as_ref().map(Json))
        .bind(session.geofence.as_ref().map(Json))
        .bind(session.hourly_rate)
        .bind(session.calculated_pay)
        .bind(session.is_approved)
        .bind(session.approved_by)
        .bind(session.approved_at)
        .bind(session.rejection_reason.as_deref())
        .bind(session.original_hours)
        .bind(session.correction_reason.as_deref())
        .bind(session.corrected_by)
        .bind(session.corrected_at)
        .bind(Json(&session.progress_updates))
        .bind(Json(&session.location_history))
        .bind(session.created_at)
        .bind(session.updated_at)
        .execute(&self.pool)
        .await;

        timer.record();
        result.map(|_| ())
    }

    /// Delete a session. Returns whether a row was removed.
    pub async fn delete(&self, id: Uuid) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("delete_attendance_session");

        let result = sqlx::query("DELETE FROM attendance_sessions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await;

        timer.record();
        Ok(result?.rows_affected() > 0)
    }
}
