//! Simulated location source for demos and development

use crate::core::GeoPoint;
use crate::hardware::{LocationSource, SourceResult};
use crate::utils::config::SimulationConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces fixes scattered uniformly around a centre point
pub struct SimulatedLocationSource {
    config: SimulationConfig,
    rng: StdRng,
    fixes_generated: u64,
}

impl SimulatedLocationSource {
    /// Create a source seeded from system entropy
    pub fn new(config: SimulationConfig) -> Self {
        Self::from_rng(config, StdRng::from_entropy())
    }

    /// Create a reproducible source
    pub fn with_seed(config: SimulationConfig, seed: u64) -> Self {
        Self::from_rng(config, StdRng::seed_from_u64(seed))
    }

    fn from_rng(config: SimulationConfig, rng: StdRng) -> Self {
        Self {
            config,
            rng,
            fixes_generated: 0,
        }
    }

    pub fn center(&self) -> GeoPoint {
        GeoPoint::new(self.config.center_latitude, self.config.center_longitude)
    }

    pub fn fixes_generated(&self) -> u64 {
        self.fixes_generated
    }

    fn jitter(&mut self) -> f64 {
        let half = self.config.jitter_span_deg / 2.0;
        if half > 0.0 {
            self.rng.gen_range(-half..half)
        } else {
            0.0
        }
    }
}

impl LocationSource for SimulatedLocationSource {
    fn next_fix(&mut self) -> SourceResult<Option<GeoPoint>> {
        let latitude = self.config.center_latitude + self.jitter();
        let longitude = self.config.center_longitude + self.jitter();
        self.fixes_generated += 1;

        Ok(Some(
            GeoPoint::new(latitude, longitude)
                .with_accuracy(self.config.accuracy_m)
                .stamped_now(),
        ))
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixes_stay_within_jitter_window() {
        let config = SimulationConfig::default();
        let mut source = SimulatedLocationSource::with_seed(config.clone(), 7);

        for _ in 0..200 {
            let fix = source.next_fix().unwrap().unwrap();
            let half_span = config.jitter_span_deg / 2.0;
            assert!((fix.latitude - config.center_latitude).abs() <= half_span);
            assert!((fix.longitude - config.center_longitude).abs() <= half_span);
            assert_eq!(fix.accuracy, Some(10.0));
            assert!(fix.timestamp.is_some());
        }
        assert_eq!(source.fixes_generated(), 200);
    }

    #[test]
    fn test_seeded_sources_repeat() {
        let mut a = SimulatedLocationSource::with_seed(SimulationConfig::default(), 42);
        let mut b = SimulatedLocationSource::with_seed(SimulationConfig::default(), 42);

        for _ in 0..5 {
            let fa = a.next_fix().unwrap().unwrap();
            let fb = b.next_fix().unwrap().unwrap();
            assert_eq!(fa.latitude, fb.latitude);
            assert_eq!(fa.longitude, fb.longitude);
        }
    }

    #[test]
    fn test_zero_span_returns_center() {
        let config = SimulationConfig {
            jitter_span_deg: 0.0,
            ..SimulationConfig::default()
        };
        let mut source = SimulatedLocationSource::new(config);
        let fix = source.next_fix().unwrap().unwrap();
        assert_eq!(fix.latitude, source.center().latitude);
        assert_eq!(fix.longitude, source.center().longitude);
    }
}
