//! Attendance session entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{
    AttendanceSession, BreakRecord, GeofenceTarget, LocationHistory, ProgressUpdate,
    SessionGeofence, SessionState,
};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the attendance_sessions table.
///
/// Nested records are JSONB columns decoded through `sqlx::types::Json`.
#[derive(Debug, Clone, FromRow)]
pub struct AttendanceSessionEntity {
    pub id: Uuid,
    pub worker_id: Uuid,
    pub building_id: Option<Uuid>,
    pub work_order_id: Option<Uuid>,
    pub state: String,
    pub clock_in_time: DateTime<Utc>,
    pub clock_out_time: Option<DateTime<Utc>>,
    pub breaks: Json<Vec<BreakRecord>>,
    pub total_break_minutes: i64,
    pub elapsed_seconds: i64,
    pub raw_hours: Option<f64>,
    pub corrected_hours: Option<f64>,
    pub geofence_target: Option<Json<GeofenceTarget>>,
    pub geofence: Option<Json<SessionGeofence>>,
    pub hourly_rate: f64,
    pub calculated_pay: f64,
    pub is_approved: bool,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub original_hours: Option<f64>,
    pub correction_reason: Option<String>,
    pub corrected_by: Option<Uuid>,
    pub corrected_at: Option<DateTime<Utc>>,
    pub progress_updates: Json<Vec<ProgressUpdate>>,
    pub location_history: Json<LocationHistory>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttendanceSessionEntity {
    /// Convert to domain model.
    ///
    /// An unrecognized state is read as completed so a corrupt row can never
    /// count as the worker's open session.
    pub fn into_domain(self) -> AttendanceSession {
        let state = self.state.parse::<SessionState>().unwrap_or_else(|err| {
            tracing::warn!(session_id = %self.id, error = %err, "Unrecognized session state");
            SessionState::Completed
        });

        AttendanceSession {
            id: self.id,
            worker_id: self.worker_id,
            building_id: self.building_id,
            work_order_id: self.work_order_id,
            state,
            clock_in_time: self.clock_in_time,
            clock_out_time: self.clock_out_time,
            breaks: self.breaks.0,
            total_break_minutes: self.total_break_minutes,
            elapsed_seconds: self.elapsed_seconds,
            raw_hours: self.raw_hours,
            corrected_hours: self.corrected_hours,
            effective_hours: self.corrected_hours.or(self.raw_hours).unwrap_or(0.0),
            geofence_target: self.geofence_target.map(|g| g.0),
            geofence: self.geofence.map(|g| g.0),
            hourly_rate: self.hourly_rate,
            calculated_pay: self.calculated_pay,
            is_approved: self.is_approved,
            approved_by: self.approved_by,
            approved_at: self.approved_at,
            rejection_reason: self.rejection_reason,
            original_hours: self.original_hours,
            correction_reason: self.correction_reason,
            corrected_by: self.corrected_by,
            corrected_at: self.corrected_at,
            progress_updates: self.progress_updates.0,
            location_history: self.location_history.0,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl From<AttendanceSessionEntity> for AttendanceSession {
    fn from(entity: AttendanceSessionEntity) -> Self {
        entity.into_domain()
    }
}
