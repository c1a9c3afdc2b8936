//! Physical constants and engine defaults

/// Mean Earth radius used by the spherical model (meters)
pub const EARTH_MEAN_RADIUS_M: f64 = 6_371_000.0;

/// Default radius for nearby queries (meters)
pub const DEFAULT_NEARBY_RADIUS_M: f64 = 500.0;

/// Default threshold for point-to-point "is nearby" checks (meters)
pub const DEFAULT_PROXIMITY_THRESHOLD_M: f64 = 100.0;

/// Latitude bounds in degrees
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);

/// Longitude bounds in degrees
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);
