//! Radius-queryable store of geo-anchored entities
//!
//! Entities are keyed by id and remember the order they were first added.
//! Radius queries scan the whole map; expected entity counts are small.
//!
//! # Thread Safety
//!
//! The backing map sits behind an `RwLock`. `get_nearby` and the other
//! readers share the lock, `add_entity`/`remove_entity` take it exclusively.
//! Cloning the index yields another handle onto the same entities.

use crate::algorithms::distance::{distance, validate_distance};
use crate::algorithms::local_frame::{bearing_deg, local_offset};
use crate::core::{GeoEntity, GeoError, GeoPoint, GeoResult, DEFAULT_NEARBY_RADIUS_M};
use crate::validation::CoordinatePolicy;
use nalgebra::Vector3;
use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, trace};

/// Entity returned by a radius query together with its geometry relative to the query point
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyEntity<K, T> {
    pub entity: GeoEntity<K, T>,
    /// Great-circle distance from the reference point (meters)
    pub distance_m: f64,
    /// Initial bearing from the reference point (degrees from north)
    pub bearing_deg: f64,
    /// East/North/Up offset from the reference point (meters)
    pub offset_m: Vector3<f64>,
}

struct Slot<K, T> {
    sequence: u64,
    entity: GeoEntity<K, T>,
}

struct IndexState<K, T> {
    entities: HashMap<K, Slot<K, T>>,
    next_sequence: u64,
}

/// Keyed collection of geo-anchored entities supporting radius queries
pub struct ProximityIndex<K, T> {
    state: Arc<RwLock<IndexState<K, T>>>,
    policy: CoordinatePolicy,
}

impl<K, T> Clone for ProximityIndex<K, T> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            policy: self.policy,
        }
    }
}

impl<K, T> Default for ProximityIndex<K, T>
where
    K: Eq + Hash + Clone + Display,
    T: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> ProximityIndex<K, T>
where
    K: Eq + Hash + Clone + Display,
    T: Clone,
{
    /// Create an empty index with lenient coordinate checks
    pub fn new() -> Self {
        Self::with_policy(CoordinatePolicy::default())
    }

    /// Create an empty index with the given coordinate policy
    pub fn with_policy(policy: CoordinatePolicy) -> Self {
        Self {
            state: Arc::new(RwLock::new(IndexState {
                entities: HashMap::new(),
                next_sequence: 0,
            })),
            policy,
        }
    }

    pub fn policy(&self) -> CoordinatePolicy {
        self.policy
    }

    /// Insert an entity, replacing any entity with the same id.
    ///
    /// A replaced entity keeps its original insertion position.
    /// Returns the previous entity, if any.
    pub fn add_entity(&self, entity: GeoEntity<K, T>) -> GeoResult<Option<GeoEntity<K, T>>> {
        self.policy.check(&entity.position)?;

        let mut state = self.write();
        if let Some(slot) = state.entities.get_mut(&entity.id) {
            debug!(
                id = %entity.id,
                kind = %entity.kind,
                position = %entity.position,
                "Replacing entity"
            );
            let previous = std::mem::replace(&mut slot.entity, entity);
            return Ok(Some(previous));
        }

        debug!(
            id = %entity.id,
            kind = %entity.kind,
            position = %entity.position,
            "Adding entity"
        );
        let sequence = state.next_sequence;
        state.next_sequence += 1;
        state
            .entities
            .insert(entity.id.clone(), Slot { sequence, entity });
        Ok(None)
    }

    /// Remove an entity by id. Absent ids are not an error.
    pub fn remove_entity(&self, id: &K) -> Option<GeoEntity<K, T>> {
        let removed = self.write().entities.remove(id).map(|slot| slot.entity);
        if removed.is_some() {
            debug!(id = %id, "Removed entity");
        }
        removed
    }

    pub fn get_entity(&self, id: &K) -> Option<GeoEntity<K, T>> {
        self.read().entities.get(id).map(|slot| slot.entity.clone())
    }

    /// Like [`get_entity`](Self::get_entity) but absence is an error
    pub fn require_entity(&self, id: &K) -> GeoResult<GeoEntity<K, T>> {
        self.get_entity(id).ok_or_else(|| not_found(id))
    }

    /// Modify the payload of an existing entity in place.
    ///
    /// The lookup and the write happen under one exclusive lock, so a
    /// concurrent removal either wins (and this returns `NotFound`) or sees
    /// the modified entity. Position, id and insertion order are untouched.
    /// `update` runs while the lock is held and must not call back into the
    /// index.
    pub fn update_payload<F, R>(&self, id: &K, update: F) -> GeoResult<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut state = self.write();
        let slot = state.entities.get_mut(id).ok_or_else(|| not_found(id))?;
        let result = update(&mut slot.entity.payload);
        debug!(id = %id, "Updated entity payload");
        Ok(result)
    }

    pub fn contains(&self, id: &K) -> bool {
        self.read().entities.contains_key(id)
    }

    /// All entities in insertion order
    pub fn get_all_entities(&self) -> Vec<GeoEntity<K, T>> {
        let state = self.read();
        let mut slots: Vec<&Slot<K, T>> = state.entities.values().collect();
        slots.sort_by_key(|slot| slot.sequence);
        slots.into_iter().map(|slot| slot.entity.clone()).collect()
    }

    /// Entities within `radius` meters of `reference`, nearest first.
    ///
    /// Ties are broken by insertion order.
    pub fn get_nearby(
        &self,
        reference: &GeoPoint,
        radius: f64,
    ) -> GeoResult<Vec<GeoEntity<K, T>>> {
        Ok(self
            .get_nearby_detailed(reference, radius)?
            .into_iter()
            .map(|hit| hit.entity)
            .collect())
    }

    /// [`get_nearby`](Self::get_nearby) with the default 500 m radius
    pub fn get_nearby_default(&self, reference: &GeoPoint) -> GeoResult<Vec<GeoEntity<K, T>>> {
        self.get_nearby(reference, DEFAULT_NEARBY_RADIUS_M)
    }

    /// Radius query returning distance, bearing and local offset for each hit
    pub fn get_nearby_detailed(
        &self,
        reference: &GeoPoint,
        radius: f64,
    ) -> GeoResult<Vec<NearbyEntity<K, T>>> {
        validate_distance("radius", radius)?;
        self.policy.check(reference)?;

        let state = self.read();
        let mut hits: Vec<(u64, f64, &GeoEntity<K, T>)> = state
            .entities
            .values()
            .filter_map(|slot| {
                let d = distance(reference, &slot.entity.position);
                (d <= radius).then_some((slot.sequence, d, &slot.entity))
            })
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));

        trace!(
            reference = %reference,
            radius,
            scanned = state.entities.len(),
            matched = hits.len(),
            "Nearby query"
        );

        Ok(hits
            .into_iter()
            .map(|(_, distance_m, entity)| NearbyEntity {
                entity: entity.clone(),
                distance_m,
                bearing_deg: bearing_deg(reference, &entity.position),
                offset_m: local_offset(reference, &entity.position),
            })
            .collect())
    }

    pub fn len(&self) -> usize {
        self.read().entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().entities.is_empty()
    }

    /// Remove every entity
    pub fn clear(&self) {
        let mut state = self.write();
        debug!(count = state.entities.len(), "Clearing index");
        state.entities.clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, IndexState<K, T>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, IndexState<K, T>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found<K: Display>(id: &K) -> GeoError {
    GeoError::NotFound { id: id.to_string() }
}
