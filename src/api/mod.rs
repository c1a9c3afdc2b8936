//! Proximity engine API
//!
//! This module provides the entity index, the location tracker, the engine
//! combining them, and the land parcel registry built on the index.

pub mod index;
pub mod tracker;
pub mod engine;
pub mod land;

// Re-export commonly used API types
pub use index::{NearbyEntity, ProximityIndex};
pub use tracker::{LocationCallback, LocationTracker, Subscription, SubscriptionId};
pub use engine::ProximityEngine;
pub use land::{LandMetadata, LandParcel, LandRegistry};
