//! Attendance session domain model and its state machine.
//!
//! A session covers one continuous presence interval of a worker, from
//! check-in to check-out, with any number of breaks in between. Transition
//! methods are pure: they take the current instant from the caller and only
//! mutate `self` when the transition is allowed.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use super::coordinate::{Coordinate, GeofenceTarget};
use super::location_sample::{LocationHistory, LocationSample};
use crate::errors::StateConflict;
use shared::numeric::round2;

// ============================================================================
// Session State Enum
// ============================================================================

/// State of an attendance session in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    OnBreak,
    Completed,
}

impl SessionState {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Active => "active",
            SessionState::OnBreak => "on_break",
            SessionState::Completed => "completed",
        }
    }

    /// Active and on-break sessions are "open": the worker is on site.
    pub fn is_open(&self) -> bool {
        !matches!(self, SessionState::Completed)
    }

    /// Check if transition to target state is valid.
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        matches!(
            (self, target),
            (SessionState::Active, SessionState::OnBreak)
                | (SessionState::OnBreak, SessionState::Active)
                | (SessionState::Active, SessionState::Completed)
                | (SessionState::OnBreak, SessionState::Completed)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SessionState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SessionState::Active),
            "on_break" => Ok(SessionState::OnBreak),
            "completed" => Ok(SessionState::Completed),
            _ => Err(format!(
                "Invalid session state: {}. Must be one of: active, on_break, completed",
                s
            )),
        }
    }
}

// ============================================================================
// Nested records
// ============================================================================

/// A pause inside an attendance session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakRecord {
    pub start_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub reason: String,
}

impl BreakRecord {
    pub fn is_open(&self) -> bool {
        self.end_time.is_none()
    }

    /// Time spent on this break, counting an open break up to `until`.
    pub fn elapsed(&self, until: DateTime<Utc>) -> Duration {
        let end = self.end_time.unwrap_or(until);
        (end - self.start_time).max(Duration::zero())
    }

    fn close(&mut self, at: DateTime<Utc>) {
        let end = at.max(self.start_time);
        self.end_time = Some(end);
        let minutes = (end - self.start_time).num_seconds() as f64 / 60.0;
        self.duration_minutes = Some(minutes.round() as i64);
    }
}

/// Outcome of a geofence check at a session boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceCheck {
    pub coordinate: Coordinate,
    pub validated: bool,
    pub distance_meters: f64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Geofence checks recorded at check-in and check-out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionGeofence {
    pub clock_in: GeofenceCheck,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_out: Option<GeofenceCheck>,
}

/// Work progress reported while on site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub percent_complete: u8,
    pub note: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub photos: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

// ============================================================================
// Core Model
// ============================================================================

/// One worker's continuous presence interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSession {
    #[serde(rename = "sessionID")]
    pub id: Uuid,
    #[serde(rename = "workerID")]
    pub worker_id: Uuid,
    #[serde(rename = "buildingID", default, skip_serializing_if = "Option::is_none")]
    pub building_id: Option<Uuid>,
    #[serde(rename = "workOrderID", default, skip_serializing_if = "Option::is_none")]
    pub work_order_id: Option<Uuid>,

    pub state: SessionState,
    pub clock_in_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clock_out_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub breaks: Vec<BreakRecord>,
    #[serde(default)]
    pub total_break_minutes: i64,
    /// Worked seconds so far (excluding breaks), refreshed by sampler ticks.
    #[serde(default)]
    pub elapsed_seconds: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_hours: Option<f64>,
    /// Snapshot of [`AttendanceSession::effective_hours`], kept by `recalculate_pay`.
    #[serde(default)]
    pub effective_hours: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geofence_target: Option<GeofenceTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geofence: Option<SessionGeofence>,

    pub hourly_rate: f64,
    pub calculated_pay: f64,

    #[serde(default)]
    pub is_approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_hours: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction_reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_by: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub progress_updates: Vec<ProgressUpdate>,
    #[serde(default)]
    pub location_history: LocationHistory,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Everything needed to open a session at check-in.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub worker_id: Uuid,
    pub building_id: Option<Uuid>,
    pub work_order_id: Option<Uuid>,
    pub hourly_rate: f64,
    pub geofence_target: Option<GeofenceTarget>,
    pub clock_in_check: Option<GeofenceCheck>,
    pub history_capacity: usize,
}

impl AttendanceSession {
    /// Opens a new `Active` session at `now`.
    pub fn open(params: NewSession, now: DateTime<Utc>) -> Self {
        let geofence = params.clock_in_check.map(|clock_in| SessionGeofence {
            clock_in,
            clock_out: None,
        });

        Self {
            id: Uuid::new_v4(),
            worker_id: params.worker_id,
            building_id: params.building_id,
            work_order_id: params.work_order_id,
            state: SessionState::Active,
            clock_in_time: now,
            clock_out_time: None,
            breaks: Vec::new(),
            total_break_minutes: 0,
            elapsed_seconds: 0,
            raw_hours: None,
            corrected_hours: None,
            effective_hours: 0.0,
            geofence_target: params.geofence_target,
            geofence,
            hourly_rate: params.hourly_rate,
            calculated_pay: 0.0,
            is_approved: false,
            approved_by: None,
            approved_at: None,
            rejection_reason: None,
            original_hours: None,
            correction_reason: None,
            corrected_by: None,
            corrected_at: None,
            progress_updates: Vec::new(),
            location_history: LocationHistory::new(params.history_capacity),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    pub fn open_break(&self) -> Option<&BreakRecord> {
        self.breaks.iter().rev().find(|b| b.is_open())
    }

    /// Corrected hours when an override exists, else raw hours (0 while open).
    pub fn effective_hours(&self) -> f64 {
        self.corrected_hours.or(self.raw_hours).unwrap_or(0.0)
    }

    /// Recomputes `calculated_pay` from effective hours and the hourly rate.
    pub fn recalculate_pay(&mut self) {
        self.effective_hours = self.effective_hours();
        self.calculated_pay = round2(self.effective_hours * self.hourly_rate);
    }

    /// Total break time, counting an open break up to `until`.
    pub fn break_time(&self, until: DateTime<Utc>) -> Duration {
        self.breaks
            .iter()
            .fold(Duration::zero(), |acc, b| acc + b.elapsed(until))
    }

    /// Worked time between check-in and `until`, excluding breaks.
    pub fn worked_time(&self, until: DateTime<Utc>) -> Duration {
        let end = self.clock_out_time.unwrap_or(until);
        let gross = (end - self.clock_in_time).max(Duration::zero());
        (gross - self.break_time(end)).max(Duration::zero())
    }

    /// Refreshes `elapsed_seconds` for a still-open session.
    pub fn refresh_elapsed(&mut self, now: DateTime<Utc>) {
        self.elapsed_seconds = self.worked_time(now).num_seconds();
        self.updated_at = now;
    }

    /// Appends a sample to the session's own bounded history.
    pub fn record_sample(&mut self, sample: LocationSample) {
        self.updated_at = self.updated_at.max(sample.captured_at);
        self.location_history.push(sample);
    }

    /// `Active` → `OnBreak`.
    pub fn start_break(
        &mut self,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<(), StateConflict> {
        if self.state.is_open() && self.open_break().is_some() {
            return Err(StateConflict::AlreadyOnBreak {
                session_id: self.id,
            });
        }
        if self.state != SessionState::Active {
            return Err(StateConflict::NotActive {
                session_id: self.id,
                state: self.state,
            });
        }

        self.breaks.push(BreakRecord {
            start_time: now,
            end_time: None,
            duration_minutes: None,
            reason: reason.into(),
        });
        self.state = SessionState::OnBreak;
        self.updated_at = now;
        Ok(())
    }

    /// `OnBreak` → `Active`. Returns the closed break.
    pub fn end_break(&mut self, now: DateTime<Utc>) -> Result<&BreakRecord, StateConflict> {
        let session_id = self.id;
        let state = self.state;
        let index = self
            .breaks
            .iter()
            .rposition(|b| b.is_open())
            .filter(|_| state.is_open())
            .ok_or(StateConflict::NoActiveBreak { session_id, state })?;

        self.breaks[index].close(now);
        self.total_break_minutes = self.closed_break_minutes();
        self.state = SessionState::Active;
        self.updated_at = now;
        Ok(&self.breaks[index])
    }

    /// `Active | OnBreak` → `Completed`.
    ///
    /// An open break is closed at check-out. Raw hours exclude break time.
    pub fn check_out(
        &mut self,
        now: DateTime<Utc>,
        clock_out_check: Option<GeofenceCheck>,
    ) -> Result<(), StateConflict> {
        if !self.state.is_open() {
            return Err(StateConflict::NotCheckedIn {
                session_id: self.id,
                state: self.state,
            });
        }

        let clock_out = now.max(self.clock_in_time);
        if let Some(open) = self.breaks.iter_mut().rev().find(|b| b.is_open()) {
            open.close(clock_out);
        }
        self.total_break_minutes = self.closed_break_minutes();

        self.clock_out_time = Some(clock_out);
        let worked = self.worked_time(clock_out);
        self.elapsed_seconds = worked.num_seconds();
        self.raw_hours = Some(round2(worked.num_seconds() as f64 / 3600.0));

        if let (Some(check), Some(geofence)) = (clock_out_check, self.geofence.as_mut()) {
            geofence.clock_out = Some(check);
        }

        self.state = SessionState::Completed;
        self.recalculate_pay();
        self.updated_at = now;
        Ok(())
    }

    /// Additive progress report; not allowed once completed.
    pub fn add_progress_update(
        &mut self,
        update: ProgressUpdate,
    ) -> Result<(), StateConflict> {
        if !self.state.is_open() {
            return Err(StateConflict::SessionCompleted {
                session_id: self.id,
            });
        }
        self.updated_at = self.updated_at.max(update.recorded_at);
        self.progress_updates.push(update);
        Ok(())
    }

    fn closed_break_minutes(&self) -> i64 {
        self.breaks.iter().filter_map(|b| b.duration_minutes).sum()
    }
}

// ============================================================================
// Request DTOs
// ============================================================================

/// Request payload for checking a worker in.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    #[serde(rename = "workerID")]
    pub worker_id: Uuid,

    /// Device location; when absent the location source is queried.
    pub location: Option<Coordinate>,

    #[serde(rename = "buildingID", default)]
    pub building_id: Option<Uuid>,

    #[serde(rename = "workOrderID", default)]
    pub work_order_id: Option<Uuid>,

    /// Geofence of the building, when the building has one.
    #[serde(default)]
    pub geofence: Option<GeofenceTarget>,

    #[validate(custom(function = "shared::validation::validate_hourly_rate"))]
    pub hourly_rate: f64,
}

/// Request payload for starting a break.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct StartBreakRequest {
    #[validate(length(max = 200, message = "Reason must be at most 200 characters"))]
    #[serde(default)]
    pub reason: String,
}

/// Request payload for a progress update.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdateRequest {
    #[validate(range(max = 100, message = "Percent complete must be between 0 and 100"))]
    pub percent_complete: u8,

    #[validate(length(max = 2000, message = "Note must be at most 2000 characters"))]
    #[serde(default)]
    pub note: String,

    #[validate(length(max = 20, message = "At most 20 photos per update"))]
    #[serde(default)]
    pub photos: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 6, 8, 0, 0).unwrap()
    }

    fn new_session(rate: f64) -> AttendanceSession {
        AttendanceSession::open(
            NewSession {
                worker_id: Uuid::new_v4(),
                building_id: Some(Uuid::new_v4()),
                work_order_id: None,
                hourly_rate: rate,
                geofence_target: None,
                clock_in_check: None,
                history_capacity: 10,
            },
            t0(),
        )
    }

    // =========================================================================
    // SessionState Tests
    // =========================================================================

    #[test]
    fn test_session_state_as_str() {
        assert_eq!(SessionState::Active.as_str(), "active");
        assert_eq!(SessionState::OnBreak.as_str(), "on_break");
        assert_eq!(SessionState::Completed.as_str(), "completed");
    }

    #[test]
    fn test_session_state_from_str() {
        assert_eq!("active".parse::<SessionState>().unwrap(), SessionState::Active);
        assert_eq!("on_break".parse::<SessionState>().unwrap(), SessionState::OnBreak);
        assert!("ACTIVE".parse::<SessionState>().is_err());
    }

    #[test]
    fn test_session_state_serde() {
        let json = serde_json::to_string(&SessionState::OnBreak).unwrap();
        assert_eq!(json, "\"on_break\"");
    }

    #[test]
    fn test_session_state_transitions() {
        assert!(SessionState::Active.can_transition_to(SessionState::OnBreak));
        assert!(SessionState::OnBreak.can_transition_to(SessionState::Active));
        assert!(SessionState::OnBreak.can_transition_to(SessionState::Completed));
        assert!(!SessionState::Completed.can_transition_to(SessionState::Active));
        assert!(!SessionState::Completed.can_transition_to(SessionState::OnBreak));
        assert!(!SessionState::Active.can_transition_to(SessionState::Active));
    }

    // =========================================================================
    // Transition Tests
    // =========================================================================

    #[test]
    fn test_open_session_defaults() {
        let session = new_session(20.0);
        assert_eq!(session.state, SessionState::Active);
        assert_eq!(session.clock_in_time, t0());
        assert!(session.clock_out_time.is_none());
        assert!(!session.is_approved);
        assert_eq!(session.effective_hours(), 0.0);
        assert_eq!(session.calculated_pay, 0.0);
    }

    #[test]
    fn test_check_out_computes_raw_hours_and_pay() {
        let mut session = new_session(20.0);
        let out = t0() + Duration::minutes(450);
        session.check_out(out, None).unwrap();

        assert_eq!(session.state, SessionState::Completed);
        assert_eq!(session.clock_out_time, Some(out));
        assert_eq!(session.raw_hours, Some(7.5));
        assert_eq!(session.calculated_pay, 150.0);
    }

    #[test]
    fn test_zero_duration_session() {
        let mut session = new_session(20.0);
        session.check_out(t0(), None).unwrap();
        assert_eq!(session.raw_hours, Some(0.0));
        assert_eq!(session.calculated_pay, 0.0);
    }

    #[test]
    fn test_break_round_trip_without_time_passing() {
        let mut session = new_session(20.0);
        session.start_break("coffee", t0()).unwrap();
        assert_eq!(session.state, SessionState::OnBreak);

        let closed = session.end_break(t0()).unwrap();
        assert_eq!(closed.duration_minutes, Some(0));
        assert_eq!(session.state, SessionState::Active);
        assert_eq!(session.total_break_minutes, 0);
    }

    #[test]
    fn test_break_duration_is_rounded_minutes() {
        let mut session = new_session(20.0);
        session.start_break("lunch", t0()).unwrap();
        let closed = session
            .end_break(t0() + Duration::seconds(29 * 60 + 40))
            .unwrap();
        assert_eq!(closed.duration_minutes, Some(30));
        assert_eq!(session.total_break_minutes, 30);
    }

    #[test]
    fn test_start_break_twice_is_already_on_break() {
        let mut session = new_session(20.0);
        session.start_break("lunch", t0()).unwrap();
        let err = session.start_break("again", t0()).unwrap_err();
        assert!(matches!(err, StateConflict::AlreadyOnBreak { .. }));
    }

    #[test]
    fn test_end_break_without_break() {
        let mut session = new_session(20.0);
        let err = session.end_break(t0()).unwrap_err();
        assert!(matches!(
            err,
            StateConflict::NoActiveBreak {
                state: SessionState::Active,
                ..
            }
        ));
    }

    #[test]
    fn test_start_break_on_completed_session() {
        let mut session = new_session(20.0);
        session.check_out(t0() + Duration::hours(1), None).unwrap();
        let err = session.start_break("late", t0()).unwrap_err();
        assert!(matches!(
            err,
            StateConflict::NotActive {
                state: SessionState::Completed,
                ..
            }
        ));
    }

    #[test]
    fn test_check_out_twice_is_not_checked_in() {
        let mut session = new_session(20.0);
        session.check_out(t0() + Duration::hours(1), None).unwrap();
        let err = session
            .check_out(t0() + Duration::hours(2), None)
            .unwrap_err();
        assert!(matches!(err, StateConflict::NotCheckedIn { .. }));
        assert_eq!(session.raw_hours, Some(1.0));
    }

    #[test]
    fn test_break_time_is_excluded_from_raw_hours() {
        let mut session = new_session(10.0);
        session
            .start_break("lunch", t0() + Duration::hours(4))
            .unwrap();
        session
            .end_break(t0() + Duration::hours(4) + Duration::minutes(30))
            .unwrap();
        session.check_out(t0() + Duration::hours(8), None).unwrap();

        assert_eq!(session.raw_hours, Some(7.5));
        assert_eq!(session.calculated_pay, 75.0);
    }

    #[test]
    fn test_check_out_while_on_break_closes_break() {
        let mut session = new_session(10.0);
        session.start_break("lunch", t0() + Duration::hours(2)).unwrap();
        session.check_out(t0() + Duration::hours(3), None).unwrap();

        let last = session.breaks.last().unwrap();
        assert_eq!(last.end_time, Some(t0() + Duration::hours(3)));
        assert_eq!(last.duration_minutes, Some(60));
        assert_eq!(session.raw_hours, Some(2.0));
        assert!(session.open_break().is_none());
    }

    #[test]
    fn test_elapsed_excludes_open_break() {
        let mut session = new_session(10.0);
        session.start_break("lunch", t0() + Duration::hours(1)).unwrap();
        session.refresh_elapsed(t0() + Duration::hours(2));
        assert_eq!(session.elapsed_seconds, 3600);
    }

    #[test]
    fn test_progress_update_rejected_when_completed() {
        let mut session = new_session(10.0);
        let update = ProgressUpdate {
            percent_complete: 40,
            note: "framing done".to_string(),
            photos: vec![],
            recorded_at: t0(),
        };
        session.add_progress_update(update.clone()).unwrap();
        assert_eq!(session.progress_updates.len(), 1);

        session.check_out(t0() + Duration::hours(1), None).unwrap();
        let err = session.add_progress_update(update).unwrap_err();
        assert!(matches!(err, StateConflict::SessionCompleted { .. }));
    }

    #[test]
    fn test_effective_hours_prefers_correction() {
        let mut session = new_session(20.0);
        session.check_out(t0() + Duration::hours(8), None).unwrap();
        session.corrected_hours = Some(6.0);
        session.recalculate_pay();
        assert_eq!(session.effective_hours(), 6.0);
        assert_eq!(session.calculated_pay, 120.0);
    }

    #[test]
    fn test_session_serializes_effective_hours() {
        let mut session = new_session(20.0);
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["effectiveHours"], 0.0);

        session.check_out(t0() + Duration::hours(8), None).unwrap();
        session.corrected_hours = Some(6.5);
        session.recalculate_pay();
        let json = serde_json::to_value(&session).unwrap();
        assert_eq!(json["rawHours"], 8.0);
        assert_eq!(json["effectiveHours"], 6.5);
        assert_eq!(json["calculatedPay"], 130.0);
    }

    #[test]
    fn test_session_serialization_field_names() {
        let session = new_session(20.0);
        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"sessionID\""));
        assert!(json.contains("\"workerID\""));
        assert!(json.contains("\"buildingID\""));
        assert!(json.contains("\"clockInTime\""));
        assert!(json.contains("\"state\":\"active\""));
        assert!(!json.contains("workOrderID"));
    }

    #[test]
    fn test_session_json_round_trip() {
        let mut session = new_session(20.0);
        session.start_break("lunch", t0() + Duration::hours(1)).unwrap();
        let json = serde_json::to_string(&session).unwrap();
        let parsed: AttendanceSession = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, session);
    }

    // =========================================================================
    // Request Validation Tests
    // =========================================================================

    #[test]
    fn test_progress_request_percent_range() {
        let request = ProgressUpdateRequest {
            percent_complete: 101,
            note: String::new(),
            photos: vec![],
        };
        assert!(request.validate().is_err());

        let request = ProgressUpdateRequest {
            percent_complete: 100,
            note: "done".to_string(),
            photos: vec!["https://photos.example/1.jpg".to_string()],
        };
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_check_in_request_deserialization() {
        let json = r#"{
            "workerID": "550e8400-e29b-41d4-a716-446655440000",
            "location": {"latitude": 38.9, "longitude": -77.0, "accuracy": 5.0},
            "hourlyRate": 22.5
        }"#;
        let request: CheckInRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.hourly_rate, 22.5);
        assert!(request.building_id.is_none());
        assert!(request.geofence.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_check_in_request_negative_rate() {
        let request = CheckInRequest {
            worker_id: Uuid::new_v4(),
            location: None,
            building_id: None,
            work_order_id: None,
            geofence: None,
            hourly_rate: -1.0,
        };
        assert!(request.validate().is_err());
    }
}
