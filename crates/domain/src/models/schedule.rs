//! Worker schedule domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::errors::DomainError;
use shared::time::anchor_on_date;

/// Lifecycle status of a schedule entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl ScheduleStatus {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            ScheduleStatus::Scheduled => "scheduled",
            ScheduleStatus::InProgress => "in_progress",
            ScheduleStatus::Completed => "completed",
            ScheduleStatus::Cancelled => "cancelled",
        }
    }

    /// Cancelled entries free their time slot.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, ScheduleStatus::Cancelled)
    }
}

impl fmt::Display for ScheduleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScheduleStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(ScheduleStatus::Scheduled),
            "in_progress" => Ok(ScheduleStatus::InProgress),
            "completed" => Ok(ScheduleStatus::Completed),
            "cancelled" => Ok(ScheduleStatus::Cancelled),
            _ => Err(format!(
                "Invalid schedule status: {}. Must be one of: scheduled, in_progress, completed, cancelled",
                s
            )),
        }
    }
}

/// A planned assignment of a worker to a building for a time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerScheduleEntry {
    pub id: Uuid,
    #[serde(rename = "workerID")]
    pub worker_id: Uuid,
    #[serde(rename = "buildingID")]
    pub building_id: Uuid,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub task: String,
    pub status: ScheduleStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WorkerScheduleEntry {
    /// Half-open overlap: `[start, end)` windows touching at a boundary do not overlap.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start_time < end && self.end_time > start
    }
}

/// A normalized `[start, end)` window on a calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleWindow {
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl ScheduleWindow {
    /// Anchors both instants on `date` and checks `end > start`.
    pub fn normalize(
        date: NaiveDate,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let start_time = anchor_on_date(date, start_time);
        let end_time = anchor_on_date(date, end_time);
        if end_time <= start_time {
            return Err(DomainError::validation(
                "endTime must be after startTime",
            ));
        }
        Ok(Self {
            date,
            start_time,
            end_time,
        })
    }
}

/// Request payload for creating a schedule entry.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateScheduleEntryRequest {
    #[serde(rename = "workerID")]
    pub worker_id: Uuid,

    #[serde(rename = "buildingID")]
    pub building_id: Uuid,

    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,

    #[validate(length(min = 1, max = 500, message = "Task must be 1-500 characters"))]
    pub task: String,
}

/// Request payload for updating a schedule entry (partial update).
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateScheduleEntryRequest {
    #[serde(rename = "buildingID", default)]
    pub building_id: Option<Uuid>,

    pub date: Option<NaiveDate>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,

    #[validate(length(min = 1, max = 500, message = "Task must be 1-500 characters"))]
    pub task: Option<String>,

    pub status: Option<ScheduleStatus>,
}

impl UpdateScheduleEntryRequest {
    /// Whether the update moves the entry in time.
    pub fn changes_window(&self) -> bool {
        self.date.is_some() || self.start_time.is_some() || self.end_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, hour, minute, 0).unwrap()
    }

    fn entry(start: DateTime<Utc>, end: DateTime<Utc>) -> WorkerScheduleEntry {
        WorkerScheduleEntry {
            id: Uuid::new_v4(),
            worker_id: Uuid::new_v4(),
            building_id: Uuid::new_v4(),
            date: date(),
            start_time: start,
            end_time: end,
            task: "Drywall".to_string(),
            status: ScheduleStatus::Scheduled,
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn test_schedule_status_round_trip() {
        for status in [
            ScheduleStatus::Scheduled,
            ScheduleStatus::InProgress,
            ScheduleStatus::Completed,
            ScheduleStatus::Cancelled,
        ] {
            assert_eq!(status.as_str().parse::<ScheduleStatus>(), Ok(status));
        }
        assert!("done".parse::<ScheduleStatus>().is_err());
    }

    #[test]
    fn test_schedule_status_serde() {
        let json = serde_json::to_string(&ScheduleStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_overlap_partial() {
        let existing = entry(at(9, 0), at(12, 0));
        assert!(existing.overlaps(at(11, 0), at(13, 0)));
    }

    #[test]
    fn test_overlap_touching_boundary_is_free() {
        let existing = entry(at(9, 0), at(12, 0));
        assert!(!existing.overlaps(at(12, 0), at(14, 0)));
        assert!(!existing.overlaps(at(7, 0), at(9, 0)));
    }

    #[test]
    fn test_overlap_containment() {
        let existing = entry(at(9, 0), at(12, 0));
        assert!(existing.overlaps(at(10, 0), at(11, 0)));
        assert!(existing.overlaps(at(8, 0), at(13, 0)));
    }

    #[test]
    fn test_window_normalizes_dates() {
        let other_day_start = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
        let other_day_end = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let window = ScheduleWindow::normalize(date(), other_day_start, other_day_end).unwrap();
        assert_eq!(window.start_time, at(9, 0));
        assert_eq!(window.end_time, at(12, 0));
    }

    #[test]
    fn test_window_rejects_non_positive_range() {
        assert!(ScheduleWindow::normalize(date(), at(12, 0), at(12, 0)).is_err());
        assert!(ScheduleWindow::normalize(date(), at(12, 0), at(9, 0)).is_err());
    }

    #[test]
    fn test_cancelled_does_not_occupy_slot() {
        assert!(ScheduleStatus::Scheduled.occupies_slot());
        assert!(ScheduleStatus::InProgress.occupies_slot());
        assert!(!ScheduleStatus::Cancelled.occupies_slot());
    }

    #[test]
    fn test_create_request_validation() {
        let request = CreateScheduleEntryRequest {
            worker_id: Uuid::new_v4(),
            building_id: Uuid::new_v4(),
            date: date(),
            start_time: at(9, 0),
            end_time: at(12, 0),
            task: String::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_update_request_changes_window() {
        let mut request = UpdateScheduleEntryRequest::default();
        assert!(!request.changes_window());
        request.end_time = Some(at(15, 0));
        assert!(request.changes_window());
    }
}
