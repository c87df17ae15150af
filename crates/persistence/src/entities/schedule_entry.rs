//! Worker schedule entry entity (database row mapping).

use chrono::{DateTime, NaiveDate, Utc};
use domain::models::{ScheduleStatus, WorkerScheduleEntry};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the worker_schedule_entries table.
#[derive(Debug, Clone, FromRow)]
pub struct ScheduleEntryEntity {
    pub id: Uuid,
    pub worker_id: Uuid,
    pub building_id: Uuid,
    pub date: NaiveDate,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub task: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ScheduleEntryEntity> for WorkerScheduleEntry {
    fn from(entity: ScheduleEntryEntity) -> Self {
        let status = entity
            .status
            .parse::<ScheduleStatus>()
            .unwrap_or_default();

        Self {
            id: entity.id,
            worker_id: entity.worker_id,
            building_id: entity.building_id,
            date: entity.date,
            start_time: entity.start_time,
            end_time: entity.end_time,
            task: entity.task,
            status,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}
