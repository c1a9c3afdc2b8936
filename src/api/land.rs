//! Land parcel registry
//!
//! A [`ProximityIndex`] keyed by parcel token id. Parcels carry their own
//! coordinates; the registry anchors each one as an [`EntityKind::Land`]
//! entity so radius queries go through the same distance code as markers.

use crate::api::ProximityIndex;
use crate::core::{EntityKind, GeoEntity, GeoPoint, GeoResult, DEFAULT_NEARBY_RADIUS_M};
use crate::validation::CoordinatePolicy;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Descriptive metadata attached to a parcel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LandMetadata {
    pub name: String,
    pub description: String,
    pub image: String,
}

/// Owned parcel of virtual land anchored at a real-world coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandParcel {
    pub token_id: u64,
    pub latitude: f64,
    pub longitude: f64,
    pub owner: String,
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<LandMetadata>,
}

impl LandParcel {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Registry of land parcels queryable by radius
#[derive(Clone, Default)]
pub struct LandRegistry {
    index: ProximityIndex<u64, LandParcel>,
}

impl LandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: CoordinatePolicy) -> Self {
        Self {
            index: ProximityIndex::with_policy(policy),
        }
    }

    /// Add or replace a parcel, returning the parcel it replaced
    pub fn add_land(&self, land: LandParcel) -> GeoResult<Option<LandParcel>> {
        let entity = GeoEntity::new(land.token_id, land.position(), EntityKind::Land, land);
        Ok(self.index.add_entity(entity)?.map(|previous| previous.payload))
    }

    pub fn remove_land(&self, token_id: u64) -> Option<LandParcel> {
        self.index.remove_entity(&token_id).map(|entity| entity.payload)
    }

    pub fn get_land(&self, token_id: u64) -> Option<LandParcel> {
        self.index.get_entity(&token_id).map(|entity| entity.payload)
    }

    /// All parcels in registration order
    pub fn get_all_lands(&self) -> Vec<LandParcel> {
        self.index
            .get_all_entities()
            .into_iter()
            .map(|entity| entity.payload)
            .collect()
    }

    /// Parcels within `radius` meters of `position`, nearest first
    pub fn get_nearby_lands(&self, position: &GeoPoint, radius: f64) -> GeoResult<Vec<LandParcel>> {
        Ok(self
            .index
            .get_nearby(position, radius)?
            .into_iter()
            .map(|entity| entity.payload)
            .collect())
    }

    pub fn get_nearby_lands_default(&self, position: &GeoPoint) -> GeoResult<Vec<LandParcel>> {
        self.get_nearby_lands(position, DEFAULT_NEARBY_RADIUS_M)
    }

    /// Record a change of ownership, returning the previous owner.
    ///
    /// The parcel is read and rewritten under a single index lock, so a
    /// concurrent `remove_land` is never undone.
    pub fn transfer(&self, token_id: u64, new_owner: &str) -> GeoResult<String> {
        let previous = self.index.update_payload(&token_id, |land| {
            std::mem::replace(&mut land.owner, new_owner.to_string())
        })?;
        info!(token_id, from = %previous, to = %new_owner, "Transferred land parcel");
        Ok(previous)
    }

    /// Parcels held by `owner`, in registration order
    pub fn lands_owned_by(&self, owner: &str) -> Vec<LandParcel> {
        self.get_all_lands()
            .into_iter()
            .filter(|land| land.owner == owner)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Underlying entity index, for detailed queries
    pub fn index(&self) -> &ProximityIndex<u64, LandParcel> {
        &self.index
    }
}
