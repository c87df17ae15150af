//! Great-circle distance.

use crate::models::Coordinate;

/// Earth radius used for Haversine distances, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Haversine distance between two coordinates, in meters.
///
/// Coordinates are not clamped; callers validate ranges at the boundary.
pub fn distance_meters(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Point at `meters` due north of `origin`. Used to build fixtures at exact distances.
pub fn offset_north(origin: &Coordinate, meters: f64) -> Coordinate {
    let d_lat = (meters / EARTH_RADIUS_METERS).to_degrees();
    Coordinate {
        latitude: origin.latitude + d_lat,
        longitude: origin.longitude,
        accuracy: origin.accuracy,
    }
}
