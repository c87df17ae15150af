//! Store writes with a single retry on transient failures.

use domain::models::{AttendanceSession, LocationSample, WorkerScheduleEntry};
use domain::store::{PersistenceStore, StoreError};
use uuid::Uuid;

macro_rules! retry_transient {
    ($operation:expr, $call:expr) => {{
        match $call.await {
            Err(err) if err.is_transient() => {
                tracing::warn!(
                    operation = $operation,
                    error = %err,
                    "Transient store failure, retrying once"
                );
                $call.await
            }
            other => other,
        }
    }};
}

pub(crate) async fn save_session(
    store: &dyn PersistenceStore,
    session: &AttendanceSession,
) -> Result<(), StoreError> {
    retry_transient!("save_session", store.save_session(session))
}

pub(crate) async fn delete_session(
    store: &dyn PersistenceStore,
    session_id: Uuid,
) -> Result<bool, StoreError> {
    retry_transient!("delete_session", store.delete_session(session_id))
}

pub(crate) async fn append_worker_sample(
    store: &dyn PersistenceStore,
    worker_id: Uuid,
    sample: &LocationSample,
    capacity: usize,
) -> Result<(), StoreError> {
    retry_transient!(
        "append_worker_sample",
        store.append_worker_sample(worker_id, sample, capacity)
    )
}

pub(crate) async fn save_schedule_entry(
    store: &dyn PersistenceStore,
    entry: &WorkerScheduleEntry,
) -> Result<(), StoreError> {
    retry_transient!("save_schedule_entry", store.save_schedule_entry(entry))
}

pub(crate) async fn delete_schedule_entry(
    store: &dyn PersistenceStore,
    entry_id: Uuid,
) -> Result<bool, StoreError> {
    retry_transient!("delete_schedule_entry", store.delete_schedule_entry(entry_id))
}
