//! Common validation utilities.

use validator::ValidationError;

/// Minimum length of a free-text justification (corrections, rejections).
pub const MIN_REASON_LENGTH: usize = 5;

/// Upper bound for a corrected work day.
pub const MAX_CORRECTED_HOURS: f64 = 24.0;

/// Validates that a latitude value is within valid range (-90 to 90).
pub fn validate_latitude(lat: f64) -> Result<(), ValidationError> {
    if (-90.0..=90.0).contains(&lat) {
        Ok(())
    } else {
        let mut err = ValidationError::new("latitude_range");
        err.message = Some("Latitude must be between -90 and 90".into());
        Err(err)
    }
}

/// Validates that a longitude value is within valid range (-180 to 180).
pub fn validate_longitude(lon: f64) -> Result<(), ValidationError> {
    if (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        let mut err = ValidationError::new("longitude_range");
        err.message = Some("Longitude must be between -180 and 180".into());
        Err(err)
    }
}

/// Validates that accuracy is finite and non-negative.
pub fn validate_accuracy(accuracy: f64) -> Result<(), ValidationError> {
    if accuracy >= 0.0 && accuracy.is_finite() {
        Ok(())
    } else {
        let mut err = ValidationError::new("accuracy_range");
        err.message = Some("Accuracy must be non-negative".into());
        Err(err)
    }
}

/// Validates that a geofence radius is strictly positive.
pub fn validate_radius(radius: f64) -> Result<(), ValidationError> {
    if radius > 0.0 && radius.is_finite() {
        Ok(())
    } else {
        let mut err = ValidationError::new("radius_range");
        err.message = Some("Radius must be greater than 0 meters".into());
        Err(err)
    }
}

/// Validates that an hourly rate is a finite, non-negative amount.
pub fn validate_hourly_rate(rate: f64) -> Result<(), ValidationError> {
    if rate >= 0.0 && rate.is_finite() {
        Ok(())
    } else {
        let mut err = ValidationError::new("hourly_rate_range");
        err.message = Some("Hourly rate must be a non-negative amount".into());
        Err(err)
    }
}

/// Validates corrected hours: finite and within a single day.
pub fn validate_corrected_hours(hours: f64) -> Result<(), ValidationError> {
    if hours.is_finite() && (0.0..=MAX_CORRECTED_HOURS).contains(&hours) {
        Ok(())
    } else {
        let mut err = ValidationError::new("corrected_hours_range");
        err.message = Some("Corrected hours must be between 0 and 24".into());
        Err(err)
    }
}

/// Validates a justification text, ignoring surrounding whitespace.
pub fn validate_reason(reason: &str) -> Result<(), ValidationError> {
    if reason.trim().chars().count() >= MIN_REASON_LENGTH {
        Ok(())
    } else {
        let mut err = ValidationError::new("reason_length");
        err.message = Some(
            format!("Reason must be at least {} characters", MIN_REASON_LENGTH).into(),
        );
        Err(err)
    }
}
