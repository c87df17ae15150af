//! Worker location sample entity (database row mapping).

use chrono::{DateTime, Utc};
use domain::models::{Coordinate, LocationSample, SampleActivity};
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for the worker_location_samples table.
#[derive(Debug, Clone, FromRow)]
pub struct LocationSampleEntity {
    pub id: i64,
    pub worker_id: Uuid,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub activity: String,
    pub source_session_id: Option<Uuid>,
    pub captured_at: DateTime<Utc>,
}

impl From<LocationSampleEntity> for LocationSample {
    fn from(entity: LocationSampleEntity) -> Self {
        let activity = entity
            .activity
            .parse::<SampleActivity>()
            .unwrap_or(SampleActivity::Manual);

        LocationSample {
            coordinate: Coordinate {
                latitude: entity.latitude,
                longitude: entity.longitude,
                accuracy: entity.accuracy,
            },
            captured_at: entity.captured_at,
            activity,
            source_worker_id: entity.worker_id,
            source_session_id: entity.source_session_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_to_domain() {
        let entity = LocationSampleEntity {
            id: 7,
            worker_id: Uuid::new_v4(),
            latitude: 38.9,
            longitude: -77.0,
            accuracy: Some(12.0),
            activity: "check-in".to_string(),
            source_session_id: Some(Uuid::new_v4()),
            captured_at: Utc::now(),
        };

        let sample: LocationSample = entity.clone().into();
        assert_eq!(sample.source_worker_id, entity.worker_id);
        assert_eq!(sample.activity, SampleActivity::CheckIn);
        assert_eq!(sample.coordinate.accuracy, Some(12.0));
        assert_eq!(sample.source_session_id, entity.source_session_id);
    }
}
