//! In-memory persistence backend.
//!
//! Used by the `memory` storage backend and by tests. Data lives only as long
//! as the process.

use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

use domain::models::{AttendanceSession, LocationSample, WorkerScheduleEntry};
use domain::store::{PersistenceStore, SessionFilter, StoreError};

/// Document store backed by in-process maps.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    sessions: RwLock<HashMap<Uuid, AttendanceSession>>,
    worker_history: RwLock<HashMap<Uuid, VecDeque<LocationSample>>>,
    schedule: RwLock<HashMap<Uuid, WorkerScheduleEntry>>,
    failing_writes: AtomicUsize,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` writes fail with `StoreError::Transient`.
    pub fn fail_next_writes(&self, count: usize) {
        self.failing_writes.store(count, Ordering::SeqCst);
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    fn check_write(&self) -> Result<(), StoreError> {
        let consumed = self
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        match consumed {
            Ok(_) => Err(StoreError::Transient("Simulated write failure".to_string())),
            Err(_) => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl PersistenceStore for InMemoryStore {
    async fn load_session(&self, session_id: Uuid) -> Result<Option<AttendanceSession>, StoreError> {
        Ok(self.sessions.read().await.get(&session_id).cloned())
    }

    async fn save_session(&self, session: &AttendanceSession) -> Result<(), StoreError> {
        self.check_write()?;
        self.sessions
            .write()
            .await
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn delete_session(&self, session_id: Uuid) -> Result<bool, StoreError> {
        self.check_write()?;
        Ok(self.sessions.write().await.remove(&session_id).is_some())
    }

    async fn find_active_session_for_worker(
        &self,
        worker_id: Uuid,
    ) -> Result<Option<AttendanceSession>, StoreError> {
        let sessions = self.sessions.read().await;
        Ok(sessions
            .values()
            .filter(|s| s.worker_id == worker_id && s.is_open())
            .max_by_key(|s| s.clock_in_time)
            .cloned())
    }

    async fn list_sessions(
        &self,
        filter: &SessionFilter,
    ) -> Result<Vec<AttendanceSession>, StoreError> {
        let sessions = self.sessions.read().await;
        let mut matching: Vec<AttendanceSession> = sessions
            .values()
            .filter(|s| filter.matches(s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.clock_in_time
                .cmp(&a.clock_in_time)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(matching)
    }

    async fn append_worker_sample(
        &self,
        worker_id: Uuid,
        sample: &LocationSample,
        capacity: usize,
    ) -> Result<(), StoreError> {
        self.check_write()?;
        let mut history = self.worker_history.write().await;
        let samples = history.entry(worker_id).or_default();
        samples.push_back(sample.clone());
        while samples.len() > capacity.max(1) {
            samples.pop_front();
        }
        Ok(())
    }

    async fn load_worker_history(
        &self,
        worker_id: Uuid,
        limit: usize,
    ) -> Result<Vec<LocationSample>, StoreError> {
        let history = self.worker_history.read().await;
        Ok(history
            .get(&worker_id)
            .map(|samples| samples.iter().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn load_schedule_entry(
        &self,
        entry_id: Uuid,
    ) -> Result<Option<WorkerScheduleEntry>, StoreError> {
        Ok(self.schedule.read().await.get(&entry_id).cloned())
    }

    async fn load_schedule_entries_for_worker_on_date(
        &self,
        worker_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<WorkerScheduleEntry>, StoreError> {
        let schedule = self.schedule.read().await;
        let mut entries: Vec<WorkerScheduleEntry> = schedule
            .values()
            .filter(|e| e.worker_id == worker_id && e.date == date)
            .cloned()
            .collect();
        entries.sort_by_key(|e| (e.start_time, e.id));
        Ok(entries)
    }

    async fn save_schedule_entry(&self, entry: &WorkerScheduleEntry) -> Result<(), StoreError> {
        self.check_write()?;
        self.schedule.write().await.insert(entry.id, entry.clone());
        Ok(())
    }

    async fn delete_schedule_entry(&self, entry_id: Uuid) -> Result<bool, StoreError> {
        self.check_write()?;
        Ok(self.schedule.write().await.remove(&entry_id).is_some())
    }
}
