//! Geofence presence validation.
//!
//! The result is advisory: callers record it on the session and decide
//! whether an invalid result blocks anything. Check-in and check-out never
//! block on it.

use serde::Serialize;

use super::geo::distance_meters;
use crate::models::{Coordinate, GeofenceCheck, GeofenceTarget};
use shared::numeric::round0;

/// Message recorded when the observed location is inside the zone.
pub const INSIDE_MESSAGE: &str = "Location is within the allowed area";

/// Outcome of validating one observed location against a target.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceValidation {
    pub valid: bool,
    pub distance_meters: f64,
    pub message: String,
}

impl GeofenceValidation {
    /// Converts into the record stored on a session.
    pub fn into_check(self, coordinate: Coordinate, address: Option<String>) -> GeofenceCheck {
        GeofenceCheck {
            coordinate,
            validated: self.valid,
            distance_meters: self.distance_meters,
            message: self.message,
            address,
        }
    }
}

/// Checks `observed` against `target`, widening the radius by the reported accuracy.
pub fn validate(observed: &Coordinate, target: &GeofenceTarget) -> GeofenceValidation {
    let effective_radius = target.radius_meters + observed.accuracy.unwrap_or(0.0);
    let distance = distance_meters(observed, &target.center);
    let valid = distance <= effective_radius;

    let message = if valid {
        INSIDE_MESSAGE.to_string()
    } else {
        format!(
            "Location is {}m outside the allowed area",
            round0(distance - effective_radius)
        )
    };

    GeofenceValidation {
        valid,
        distance_meters: distance,
        message,
    }
}
