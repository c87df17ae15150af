//! Rounding helpers for hours, pay and distances.

/// Rounds to two decimal places (hours and currency amounts).
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds to the nearest whole number, keeping the `f64` type.
pub fn round0(value: f64) -> f64 {
    value.round()
}
