//! Geospatial Proximity Engine
//!
//! Great-circle distance between coordinates, tracking of one subject's
//! current location, and a radius-queryable set of geo-anchored markers
//! and land parcels.

pub mod core;
pub mod algorithms;
pub mod validation;
pub mod utils;
pub mod hardware;
pub mod api;

// Re-export commonly used types
pub use self::core::{
    EntityKind, GeoEntity, GeoError, GeoPoint, GeoResult, DEFAULT_NEARBY_RADIUS_M,
    DEFAULT_PROXIMITY_THRESHOLD_M, EARTH_MEAN_RADIUS_M,
};
pub use algorithms::{bearing_deg, distance, is_nearby, is_within, local_offset};
pub use validation::CoordinatePolicy;
pub use utils::{ConfigError, ConfigurationManager, FeedConfig, ProximityConfig, SimulationConfig};
pub use hardware::{
    FeedPump, FeedStats, LocationFeed, LocationSource, PumpOutcome, ScriptedLocationSource,
    SimulatedLocationSource, SourceError, SourceResult,
};
pub use api::{
    LandMetadata, LandParcel, LandRegistry, LocationTracker, NearbyEntity, ProximityEngine,
    ProximityIndex, Subscription, SubscriptionId,
};
