//! Worker schedule entries with overlap protection.

use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use domain::errors::DomainError;
use domain::models::{
    CreateScheduleEntryRequest, ScheduleStatus, ScheduleWindow, UpdateScheduleEntryRequest,
    WorkerScheduleEntry,
};
use domain::services::find_conflict;

use crate::context::EngineContext;
use crate::error::EngineResult;
use crate::{metrics, persist};

/// Schedule writes. Conflict check and write run under the worker's schedule lock.
pub struct ScheduleService {
    ctx: Arc<EngineContext>,
}

impl ScheduleService {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    pub async fn create_entry(
        &self,
        request: CreateScheduleEntryRequest,
    ) -> EngineResult<WorkerScheduleEntry> {
        request.validate()?;
        let window = ScheduleWindow::normalize(request.date, request.start_time, request.end_time)?;
        let worker_id = request.worker_id;

        let _guard = self.ctx.schedule_locks.lock(worker_id).await;
        self.ensure_free(worker_id, &window, None).await?;

        let now = self.ctx.clock.now();
        let entry = WorkerScheduleEntry {
            id: Uuid::new_v4(),
            worker_id,
            building_id: request.building_id,
            date: window.date,
            start_time: window.start_time,
            end_time: window.end_time,
            task: request.task.trim().to_string(),
            status: ScheduleStatus::Scheduled,
            created_at: now,
            updated_at: now,
        };
        persist::save_schedule_entry(self.ctx.store.as_ref(), &entry).await?;

        info!(
            worker_id = %worker_id,
            entry_id = %entry.id,
            date = %entry.date,
            "Schedule entry created"
        );
        Ok(entry)
    }

    /// Partial update. Moving the entry in time, or reviving a cancelled
    /// entry, is checked against the worker's other entries.
    pub async fn update_entry(
        &self,
        entry_id: Uuid,
        request: UpdateScheduleEntryRequest,
    ) -> EngineResult<WorkerScheduleEntry> {
        request.validate()?;
        let worker_id = self.load(entry_id).await?.worker_id;

        let _guard = self.ctx.schedule_locks.lock(worker_id).await;
        let mut entry = self.load(entry_id).await?;

        let window = ScheduleWindow::normalize(
            request.date.unwrap_or(entry.date),
            request.start_time.unwrap_or(entry.start_time),
            request.end_time.unwrap_or(entry.end_time),
        )?;
        let status = request.status.unwrap_or(entry.status);
        let revived = !entry.status.occupies_slot() && status.occupies_slot();

        if status.occupies_slot() && (request.changes_window() || revived) {
            self.ensure_free(worker_id, &window, Some(entry_id)).await?;
        }

        entry.date = window.date;
        entry.start_time = window.start_time;
        entry.end_time = window.end_time;
        entry.status = status;
        if let Some(building_id) = request.building_id {
            entry.building_id = building_id;
        }
        if let Some(task) = request.task {
            entry.task = task.trim().to_string();
        }
        entry.updated_at = self.ctx.clock.now();

        persist::save_schedule_entry(self.ctx.store.as_ref(), &entry).await?;

        info!(
            worker_id = %worker_id,
            entry_id = %entry_id,
            status = %entry.status,
            "Schedule entry updated"
        );
        Ok(entry)
    }

    /// Status-only update.
    pub async fn update_status(
        &self,
        entry_id: Uuid,
        status: ScheduleStatus,
    ) -> EngineResult<WorkerScheduleEntry> {
        self.update_entry(
            entry_id,
            UpdateScheduleEntryRequest {
                status: Some(status),
                ..UpdateScheduleEntryRequest::default()
            },
        )
        .await
    }

    pub async fn get_entry(&self, entry_id: Uuid) -> EngineResult<WorkerScheduleEntry> {
        self.load(entry_id).await
    }

    /// The worker's entries on `date`, ordered by start time.
    pub async fn list_for_worker_on_date(
        &self,
        worker_id: Uuid,
        date: NaiveDate,
    ) -> EngineResult<Vec<WorkerScheduleEntry>> {
        let mut entries = self
            .ctx
            .store
            .load_schedule_entries_for_worker_on_date(worker_id, date)
            .await?;
        entries.sort_by_key(|e| e.start_time);
        Ok(entries)
    }

    pub async fn delete_entry(&self, entry_id: Uuid) -> EngineResult<()> {
        let worker_id = self.load(entry_id).await?.worker_id;

        let _guard = self.ctx.schedule_locks.lock(worker_id).await;
        if !persist::delete_schedule_entry(self.ctx.store.as_ref(), entry_id).await? {
            return Err(DomainError::schedule_entry_not_found(entry_id).into());
        }

        info!(worker_id = %worker_id, entry_id = %entry_id, "Schedule entry deleted");
        Ok(())
    }

    /// Whether `[start, end)` on `date` overlaps another of the worker's entries.
    pub async fn has_conflict(
        &self,
        worker_id: Uuid,
        date: NaiveDate,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        exclude_entry_id: Option<Uuid>,
    ) -> EngineResult<bool> {
        let window = ScheduleWindow::normalize(date, start_time, end_time)?;
        let existing = self
            .ctx
            .store
            .load_schedule_entries_for_worker_on_date(worker_id, date)
            .await?;
        Ok(find_conflict(&existing, worker_id, &window, exclude_entry_id).is_some())
    }

    async fn ensure_free(
        &self,
        worker_id: Uuid,
        window: &ScheduleWindow,
        exclude: Option<Uuid>,
    ) -> EngineResult<()> {
        let existing = self
            .ctx
            .store
            .load_schedule_entries_for_worker_on_date(worker_id, window.date)
            .await?;

        if let Some(conflicting) = find_conflict(&existing, worker_id, window, exclude) {
            metrics::record_schedule_conflict();
            warn!(
                worker_id = %worker_id,
                date = %window.date,
                conflicting_entry_id = %conflicting.id,
                "Schedule conflict"
            );
            return Err(DomainError::ScheduleConflict {
                worker_id,
                date: window.date,
                conflicting_entry_id: conflicting.id,
            }
            .into());
        }
        Ok(())
    }

    async fn load(&self, entry_id: Uuid) -> EngineResult<WorkerScheduleEntry> {
        self.ctx
            .store
            .load_schedule_entry(entry_id)
            .await?
            .ok_or_else(|| DomainError::schedule_entry_not_found(entry_id).into())
    }
}
