//! Coordinate validation policies

use crate::core::{GeoError, GeoPoint, GeoResult, LATITUDE_RANGE, LONGITUDE_RANGE};
use serde::{Deserialize, Serialize};

/// How strictly incoming coordinates are checked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinatePolicy {
    /// Only reject non-finite latitude/longitude
    #[default]
    Lenient,
    /// Also reject values outside [-90, 90] / [-180, 180]
    Strict,
}

impl CoordinatePolicy {
    /// Validate a point against this policy
    pub fn check(&self, point: &GeoPoint) -> GeoResult<()> {
        check_finite("latitude", point.latitude)?;
        check_finite("longitude", point.longitude)?;

        if *self == CoordinatePolicy::Strict {
            check_range("latitude", point.latitude, LATITUDE_RANGE)?;
            check_range("longitude", point.longitude, LONGITUDE_RANGE)?;
        }
        Ok(())
    }
}

fn check_finite(parameter: &str, value: f64) -> GeoResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(GeoError::invalid(parameter, value, "must be a finite number of degrees"))
    }
}

fn check_range(parameter: &str, value: f64, (min, max): (f64, f64)) -> GeoResult<()> {
    if value < min || value > max {
        return Err(GeoError::invalid(
            parameter,
            value,
            &format!("must be within [{}, {}]", min, max),
        ));
    }
    Ok(())
}
