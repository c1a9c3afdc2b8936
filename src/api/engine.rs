//! Tracker and index wired together around the observer's position

use crate::algorithms::distance::{distance, validate_distance};
use crate::api::index::NearbyEntity;
use crate::api::{LocationTracker, ProximityIndex, Subscription};
use crate::core::{GeoEntity, GeoPoint, GeoResult};
use crate::hardware::{LocationFeed, LocationSource, SimulatedLocationSource};
use crate::utils::config::{ConfigResult, ProximityConfig};
use std::fmt::Display;
use std::hash::Hash;
use std::io;
use tracing::warn;

/// Proximity engine: one tracked subject plus a set of anchored entities
pub struct ProximityEngine<K, T> {
    tracker: LocationTracker,
    index: ProximityIndex<K, T>,
    config: ProximityConfig,
}

impl<K, T> ProximityEngine<K, T>
where
    K: Eq + Hash + Clone + Display + Send + Sync + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Create an engine after validating `config`
    pub fn new(config: ProximityConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            tracker: LocationTracker::new(),
            index: ProximityIndex::with_policy(config.coordinate_policy),
            config,
        })
    }

    pub fn tracker(&self) -> &LocationTracker {
        &self.tracker
    }

    pub fn index(&self) -> &ProximityIndex<K, T> {
        &self.index
    }

    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    pub fn current_location(&self) -> Option<GeoPoint> {
        self.tracker.get_current_location()
    }

    /// Push a fix into the engine's tracker
    pub fn update_location(&self, point: GeoPoint) -> usize {
        self.tracker.update_location(point)
    }

    pub fn add_entity(&self, entity: GeoEntity<K, T>) -> GeoResult<Option<GeoEntity<K, T>>> {
        self.index.add_entity(entity)
    }

    pub fn remove_entity(&self, id: &K) -> Option<GeoEntity<K, T>> {
        self.index.remove_entity(id)
    }

    /// Entities within `radius` meters of the current location.
    ///
    /// Empty until the tracker has received its first fix.
    pub fn nearby(&self, radius: f64) -> GeoResult<Vec<GeoEntity<K, T>>> {
        validate_distance("radius", radius)?;
        match self.current_location() {
            Some(location) => self.index.get_nearby(&location, radius),
            None => Ok(Vec::new()),
        }
    }

    /// [`nearby`](Self::nearby) using the configured default radius
    pub fn nearby_default(&self) -> GeoResult<Vec<GeoEntity<K, T>>> {
        self.nearby(self.config.default_radius_m)
    }

    pub fn nearby_detailed(&self, radius: f64) -> GeoResult<Vec<NearbyEntity<K, T>>> {
        validate_distance("radius", radius)?;
        match self.current_location() {
            Some(location) => self.index.get_nearby_detailed(&location, radius),
            None => Ok(Vec::new()),
        }
    }

    /// Whether `point` is within the configured proximity threshold of the
    /// current location. `None` before the first fix.
    pub fn is_near_current(&self, point: &GeoPoint) -> Option<bool> {
        self.current_location()
            .map(|location| distance(&location, point) <= self.config.proximity_threshold_m)
    }

    /// Call `callback` with the nearby set every time the location changes
    pub fn subscribe_nearby<F>(&self, radius: f64, callback: F) -> GeoResult<Subscription>
    where
        F: Fn(&GeoPoint, &[NearbyEntity<K, T>]) + Send + Sync + 'static,
    {
        validate_distance("radius", radius)?;
        let index = self.index.clone();

        Ok(self.tracker.subscribe(move |location| {
            match index.get_nearby_detailed(location, radius) {
                Ok(hits) => callback(location, &hits),
                Err(e) => warn!(location = %location, error = %e, "Skipping nearby notification"),
            }
        }))
    }

    /// Start pushing fixes from `source` into this engine's tracker
    pub fn start_feed<S>(&self, source: S) -> io::Result<LocationFeed>
    where
        S: LocationSource + 'static,
    {
        LocationFeed::spawn(source, self.tracker.clone(), self.config.feed.clone())
    }

    /// Start the simulated jitter feed described by the configuration
    pub fn start_simulation(&self) -> io::Result<LocationFeed> {
        self.start_feed(SimulatedLocationSource::new(self.config.simulation.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EntityKind, GeoError};
    use crate::hardware::ScriptedLocationSource;
    use crate::validation::CoordinatePolicy;
    use std::sync::{Arc, Mutex};
    use std::thread;
    use std::time::{Duration, Instant};

    type MarkerEngine = ProximityEngine<String, ()>;

    fn engine() -> MarkerEngine {
        let engine = MarkerEngine::new(ProximityConfig::default()).unwrap();
        for (id, lat, lon) in [("A", 40.713, -74.006), ("B", 40.730, -73.935)] {
            engine
                .add_entity(GeoEntity::new(
                    id.to_string(),
                    GeoPoint::new(lat, lon),
                    EntityKind::Building,
                    (),
                ))
                .unwrap();
        }
        engine
    }

    #[test]
    fn test_nearby_empty_without_location() {
        let engine = engine();
        assert!(engine.nearby_default().unwrap().is_empty());
        assert!(engine.is_near_current(&GeoPoint::new(0.0, 0.0)).is_none());
        assert!(engine.nearby(-1.0).is_err());
    }

    #[test]
    fn test_nearby_follows_location() {
        let engine = engine();

        engine.update_location(GeoPoint::new(40.7128, -74.0060));
        let ids: Vec<String> = engine.nearby_default().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["A".to_string()]);

        engine.update_location(GeoPoint::new(40.730, -73.935));
        let ids: Vec<String> = engine.nearby_default().unwrap().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["B".to_string()]);

        let detailed = engine.nearby_detailed(20_000.0).unwrap();
        assert_eq!(detailed.len(), 2);
        assert_eq!(detailed[0].entity.id, "B");
        assert!(detailed[1].distance_m > 500.0);
    }

    #[test]
    fn test_is_near_current() {
        let engine = engine();
        engine.update_location(GeoPoint::new(0.0, 0.0));
        assert_eq!(engine.is_near_current(&GeoPoint::new(0.0005, 0.0)), Some(true));
        assert_eq!(engine.is_near_current(&GeoPoint::new(0.01, 0.0)), Some(false));
    }

    #[test]
    fn test_subscribe_nearby() {
        let engine = engine();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let subscription = engine
            .subscribe_nearby(500.0, move |_, hits| {
                let ids: Vec<String> = hits.iter().map(|h| h.entity.id.clone()).collect();
                sink.lock().unwrap().push(ids);
            })
            .unwrap();

        engine.update_location(GeoPoint::new(40.7128, -74.0060));
        engine.update_location(GeoPoint::new(0.0, 0.0));
        subscription.unsubscribe();
        engine.update_location(GeoPoint::new(40.730, -73.935));

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![vec!["A".to_string()], vec![]]);
    }

    #[test]
    fn test_subscribe_nearby_rejects_bad_radius() {
        let engine = engine();
        let result = engine.subscribe_nearby(f64::NAN, |_, _| {});
        assert!(matches!(result, Err(GeoError::InvalidArgument { .. })));
        assert_eq!(engine.tracker().subscriber_count(), 0);
    }

    #[test]
    fn test_strict_engine_skips_out_of_range_fix() {
        let config = ProximityConfig::default().with_coordinate_policy(CoordinatePolicy::Strict);
        let engine: MarkerEngine = ProximityEngine::new(config).unwrap();
        let calls = Arc::new(Mutex::new(0));
        let counter = Arc::clone(&calls);
        engine
            .subscribe_nearby(500.0, move |_, _| *counter.lock().unwrap() += 1)
            .unwrap();

        engine.update_location(GeoPoint::new(120.0, 0.0));
        assert_eq!(*calls.lock().unwrap(), 0);
        assert!(engine.nearby_default().is_err());

        engine.update_location(GeoPoint::new(10.0, 0.0));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ProximityConfig::default().with_default_radius(-1.0);
        assert!(MarkerEngine::new(config).is_err());
    }

    #[test]
    fn test_start_feed() {
        let engine = MarkerEngine::new(ProximityConfig::default().with_feed_interval(5)).unwrap();
        let source = ScriptedLocationSource::with_fixes("script", [GeoPoint::new(10.0, 20.0)]);
        let feed = engine.start_feed(source).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while engine.current_location().is_none() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        feed.stop();
        assert_eq!(engine.current_location(), Some(GeoPoint::new(10.0, 20.0)));
    }
}
