//! Great-circle distance on a spherical Earth.

use crate::constants::EARTH_RADIUS_M;
use crate::types::GeoPoint;

/// Haversine distance between two points in meters.
///
/// Symmetric, zero for identical points. NaN inputs propagate NaN; callers
/// treat a NaN distance as unclassifiable.
pub fn distance_meters(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    // Rounding can push h a hair outside [0, 1] for antipodal points.
    let c = 2.0 * h.clamp(0.0, 1.0).sqrt().asin();
    EARTH_RADIUS_M * c
}

/// Point reached by travelling `meters` due north from `origin`.
/// Used to build fixtures at known distances.
pub fn offset_north(origin: GeoPoint, meters: f64) -> GeoPoint {
    let dlat = (meters / EARTH_RADIUS_M).to_degrees();
    GeoPoint::new(origin.latitude + dlat, origin.longitude)
}
