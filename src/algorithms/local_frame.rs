//! Local tangent frame around an observer
//!
//! Flat-earth approximation good for the short ranges nearby queries work
//! with. East/North/Up axes in meters, origin at the reference point.

use crate::core::{GeoPoint, EARTH_MEAN_RADIUS_M};
use nalgebra::Vector3;

/// Offset of `point` from `reference` as (east, north, up) meters.
///
/// Missing altitudes count as zero.
pub fn local_offset(reference: &GeoPoint, point: &GeoPoint) -> Vector3<f64> {
    let lat_diff = (point.latitude - reference.latitude).to_radians();
    let lon_diff = wrap_degrees(point.longitude - reference.longitude).to_radians();
    let ref_lat_rad = reference.latitude.to_radians();

    let east = EARTH_MEAN_RADIUS_M * lon_diff * ref_lat_rad.cos();
    let north = EARTH_MEAN_RADIUS_M * lat_diff;
    let up = point.altitude.unwrap_or(0.0) - reference.altitude.unwrap_or(0.0);

    Vector3::new(east, north, up)
}

/// Inverse of [`local_offset`]
pub fn from_local_offset(reference: &GeoPoint, offset: &Vector3<f64>) -> GeoPoint {
    let ref_lat_rad = reference.latitude.to_radians();

    let lat_diff = offset.y / EARTH_MEAN_RADIUS_M;
    let lon_diff = offset.x / (EARTH_MEAN_RADIUS_M * ref_lat_rad.cos());

    let mut point = GeoPoint::new(
        reference.latitude + lat_diff.to_degrees(),
        wrap_degrees(reference.longitude + lon_diff.to_degrees()),
    );
    if reference.altitude.is_some() || offset.z != 0.0 {
        point.altitude = Some(reference.altitude.unwrap_or(0.0) + offset.z);
    }
    point
}

/// Initial great-circle bearing from `from` to `to`, degrees clockwise from north in [0, 360)
pub fn bearing_deg(from: &GeoPoint, to: &GeoPoint) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let delta_lambda = (to.longitude - from.longitude).to_radians();

    let y = delta_lambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * delta_lambda.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Normalize a longitude difference into [-180, 180)
fn wrap_degrees(degrees: f64) -> f64 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}
