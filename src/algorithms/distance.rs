//! Great-circle distance on a spherical Earth
//!
//! Haversine formulation over the mean Earth radius. Inputs are degrees,
//! intermediate math is radians, output is meters.

use crate::core::{
    GeoError, GeoPoint, GeoResult, DEFAULT_PROXIMITY_THRESHOLD_M, EARTH_MEAN_RADIUS_M,
};

/// Great-circle distance between two points in meters
pub fn distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let phi1 = a.latitude.to_radians();
    let phi2 = b.latitude.to_radians();
    let delta_phi = (b.latitude - a.latitude).to_radians();
    let delta_lambda = (b.longitude - a.longitude).to_radians();

    let sin_half_phi = (delta_phi / 2.0).sin();
    let sin_half_lambda = (delta_lambda / 2.0).sin();
    let h = sin_half_phi * sin_half_phi
        + phi1.cos() * phi2.cos() * sin_half_lambda * sin_half_lambda;

    // Rounding can push h just past either end of [0, 1]: above 1 for
    // near-antipodal points, below 0 when out-of-range latitudes make the
    // cosine product negative
    let h = h.clamp(0.0, 1.0);
    2.0 * EARTH_MEAN_RADIUS_M * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Check whether `b` lies within `max_distance` meters of `a`
pub fn is_within(a: &GeoPoint, b: &GeoPoint, max_distance: f64) -> GeoResult<bool> {
    validate_distance("max_distance", max_distance)?;
    Ok(distance(a, b) <= max_distance)
}

/// Check whether two points are within the default proximity threshold
pub fn is_nearby(a: &GeoPoint, b: &GeoPoint) -> bool {
    distance(a, b) <= DEFAULT_PROXIMITY_THRESHOLD_M
}

/// Reject negative or NaN distance limits
pub(crate) fn validate_distance(parameter: &str, value: f64) -> GeoResult<()> {
    if value.is_nan() {
        return Err(GeoError::invalid(parameter, value, "must be a number"));
    }
    if value < 0.0 {
        return Err(GeoError::invalid(parameter, value, "must be non-negative"));
    }
    Ok(())
}
