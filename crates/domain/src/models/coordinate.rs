//! Coordinate and geofence target models.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// A WGS84 position as reported by a worker's device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Coordinate {
    #[validate(custom(function = "shared::validation::validate_latitude"))]
    pub latitude: f64,

    #[validate(custom(function = "shared::validation::validate_longitude"))]
    pub longitude: f64,

    /// Horizontal accuracy in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "shared::validation::validate_accuracy"))]
    pub accuracy: Option<f64>,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            accuracy: None,
        }
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }
}

/// Circular zone around a building used to validate presence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceTarget {
    pub center: Coordinate,

    #[validate(custom(function = "shared::validation::validate_radius"))]
    pub radius_meters: f64,
}

impl GeofenceTarget {
    pub fn new(center: Coordinate, radius_meters: f64) -> Self {
        Self {
            center,
            radius_meters,
        }
    }

    /// Validates the target including its center coordinate.
    pub fn validate_all(&self) -> Result<(), validator::ValidationErrors> {
        self.center.validate()?;
        self.validate()
    }
}
