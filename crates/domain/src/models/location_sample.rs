//! Location samples and bounded location history.

use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::coordinate::Coordinate;

/// Default number of samples retained per worker and per session.
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

/// What produced a location sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SampleActivity {
    CheckIn,
    CheckOut,
    Tracking,
    Manual,
}

impl SampleActivity {
    /// Returns the string representation for database storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleActivity::CheckIn => "check-in",
            SampleActivity::CheckOut => "check-out",
            SampleActivity::Tracking => "tracking",
            SampleActivity::Manual => "manual",
        }
    }
}

impl fmt::Display for SampleActivity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SampleActivity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "check-in" => Ok(SampleActivity::CheckIn),
            "check-out" => Ok(SampleActivity::CheckOut),
            "tracking" => Ok(SampleActivity::Tracking),
            "manual" => Ok(SampleActivity::Manual),
            _ => Err(format!("Invalid sample activity: {}", s)),
        }
    }
}

/// A single recorded position. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationSample {
    pub coordinate: Coordinate,
    pub captured_at: DateTime<Utc>,
    pub activity: SampleActivity,
    #[serde(rename = "sourceWorkerID")]
    pub source_worker_id: Uuid,
    #[serde(
        rename = "sourceSessionID",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_session_id: Option<Uuid>,
}

impl LocationSample {
    pub fn new(
        coordinate: Coordinate,
        captured_at: DateTime<Utc>,
        activity: SampleActivity,
        source_worker_id: Uuid,
        source_session_id: Option<Uuid>,
    ) -> Self {
        Self {
            coordinate,
            captured_at,
            activity,
            source_worker_id,
            source_session_id,
        }
    }
}

/// Bounded FIFO of samples; pushing past capacity evicts the oldest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationHistory {
    capacity: usize,
    samples: VecDeque<LocationSample>,
}

impl LocationHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            samples: VecDeque::new(),
        }
    }

    /// Appends a sample, returning how many old samples were evicted.
    pub fn push(&mut self, sample: LocationSample) -> usize {
        self.samples.push_back(sample);
        let mut evicted = 0;
        while self.samples.len() > self.capacity {
            self.samples.pop_front();
            evicted += 1;
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn latest(&self) -> Option<&LocationSample> {
        self.samples.back()
    }

    pub fn oldest(&self) -> Option<&LocationSample> {
        self.samples.front()
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LocationSample> {
        self.samples.iter()
    }

    /// Returns up to `limit` samples, newest first.
    pub fn newest(&self, limit: usize) -> Vec<LocationSample> {
        self.samples.iter().rev().take(limit).cloned().collect()
    }
}

impl Default for LocationHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}
