//! Schedule overlap detection.

use uuid::Uuid;

use crate::models::{ScheduleWindow, WorkerScheduleEntry};

/// First entry of `worker_id` on the window's date that overlaps the window.
///
/// `exclude` skips the entry being updated. Cancelled entries never conflict.
pub fn find_conflict<'a>(
    existing: &'a [WorkerScheduleEntry],
    worker_id: Uuid,
    window: &ScheduleWindow,
    exclude: Option<Uuid>,
) -> Option<&'a WorkerScheduleEntry> {
    existing.iter().find(|entry| {
        entry.worker_id == worker_id
            && entry.date == window.date
            && Some(entry.id) != exclude
            && entry.status.occupies_slot()
            && entry.overlaps(window.start_time, window.end_time)
    })
}

pub fn has_conflict(
    existing: &[WorkerScheduleEntry],
    worker_id: Uuid,
    window: &ScheduleWindow,
    exclude: Option<Uuid>,
) -> bool {
    find_conflict(existing, worker_id, window, exclude).is_some()
}
