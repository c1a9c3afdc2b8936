//! Core data types for the proximity engine

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Geographic position in degrees with optional measurement metadata
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
    /// Altitude above the reference surface (meters)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    /// Reported measurement uncertainty (meters)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    /// Milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude: None,
            accuracy: None,
            timestamp: None,
        }
    }

    pub fn with_altitude(mut self, altitude: f64) -> Self {
        self.altitude = Some(altitude);
        self
    }

    pub fn with_accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    pub fn with_timestamp(mut self, timestamp_ms: u64) -> Self {
        self.timestamp = Some(timestamp_ms);
        self
    }

    /// Stamp the point with the current wall-clock time
    pub fn stamped_now(self) -> Self {
        self.with_timestamp(now_ms())
    }

    /// Latitude and longitude are both finite numbers
    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)?;
        if let Some(altitude) = self.altitude {
            write!(f, " alt {:.1}m", altitude)?;
        }
        if let Some(accuracy) = self.accuracy {
            write!(f, " ±{:.1}m", accuracy)?;
        }
        Ok(())
    }
}

/// Role tag of a geo-anchored entity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntityKind {
    Land,
    Building,
    PointOfInterest,
    Other(String),
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Land => write!(f, "land"),
            EntityKind::Building => write!(f, "building"),
            EntityKind::PointOfInterest => write!(f, "point-of-interest"),
            EntityKind::Other(tag) => write!(f, "{}", tag),
        }
    }
}

/// Application object anchored to a geographic position.
///
/// The payload belongs to the caller and is never inspected by the index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoEntity<K, T> {
    pub id: K,
    pub position: GeoPoint,
    pub kind: EntityKind,
    pub payload: T,
}

impl<K, T> GeoEntity<K, T> {
    pub fn new(id: K, position: GeoPoint, kind: EntityKind, payload: T) -> Self {
        Self {
            id,
            position,
            kind,
            payload,
        }
    }
}

/// Current wall-clock time in milliseconds since the Unix epoch
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
