use crate::core::{DEFAULT_NEARBY_RADIUS_M, DEFAULT_PROXIMITY_THRESHOLD_M};
use crate::validation::CoordinatePolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Engine-wide configuration parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityConfig {
    /// Radius used when a nearby query does not name one (meters)
    pub default_radius_m: f64,
    /// Threshold for point-to-point "is nearby" checks (meters)
    pub proximity_threshold_m: f64,
    /// Coordinate validation applied to entities and query points
    pub coordinate_policy: CoordinatePolicy,
    /// Simulated location source settings
    pub simulation: SimulationConfig,
    /// Location feed settings
    pub feed: FeedConfig,
}

/// Parameters for the simulated jitter source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Latitude the simulated fixes scatter around (degrees)
    pub center_latitude: f64,
    /// Longitude the simulated fixes scatter around (degrees)
    pub center_longitude: f64,
    /// Full width of the jitter window (degrees); fixes land within ±half of it
    pub jitter_span_deg: f64,
    /// Accuracy reported with each simulated fix (meters)
    pub accuracy_m: f64,
}

/// Parameters for driving a location source into a tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Delay between polls of the source (milliseconds)
    pub interval_ms: u64,
    /// Fixes whose timestamp is older than this are dropped (milliseconds)
    pub max_fix_age_ms: u64,
    /// Minimum movement from the last pushed fix before pushing again (meters, 0 disables)
    pub distance_filter_m: f64,
}

impl Default for ProximityConfig {
    fn default() -> Self {
        Self {
            default_radius_m: DEFAULT_NEARBY_RADIUS_M,
            proximity_threshold_m: DEFAULT_PROXIMITY_THRESHOLD_M,
            coordinate_policy: CoordinatePolicy::Lenient,
            simulation: SimulationConfig::default(),
            feed: FeedConfig::default(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        // Lower Manhattan
        Self {
            center_latitude: 40.7128,
            center_longitude: -74.0060,
            jitter_span_deg: 0.001,
            accuracy_m: 10.0,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5000,
            max_fix_age_ms: 10_000,
            distance_filter_m: 0.0,
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Invalid parameter value
    #[error("invalid {parameter} = {value}: {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    /// Configuration file I/O error
    #[error("failed to access config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// JSON serialization/deserialization error
    #[error("failed to parse config: {0}")]
    Serialization(#[from] serde_json::Error),
    /// `save` called before any file path was known
    #[error("no file path set for saving configuration")]
    NoPath,
}

impl ConfigError {
    fn invalid(parameter: &str, value: impl ToString, reason: &str) -> Self {
        ConfigError::InvalidParameter {
            parameter: parameter.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl ProximityConfig {
    /// Check every parameter, returning the first problem found
    pub fn validate(&self) -> ConfigResult<()> {
        check_non_negative("default_radius_m", self.default_radius_m)?;
        check_non_negative("proximity_threshold_m", self.proximity_threshold_m)?;
        self.simulation.validate()?;
        self.feed.validate()?;
        Ok(())
    }

    pub fn with_default_radius(mut self, radius_m: f64) -> Self {
        self.default_radius_m = radius_m;
        self
    }

    pub fn with_proximity_threshold(mut self, threshold_m: f64) -> Self {
        self.proximity_threshold_m = threshold_m;
        self
    }

    pub fn with_coordinate_policy(mut self, policy: CoordinatePolicy) -> Self {
        self.coordinate_policy = policy;
        self
    }

    pub fn with_feed_interval(mut self, interval_ms: u64) -> Self {
        self.feed.interval_ms = interval_ms;
        self
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !(-90.0..=90.0).contains(&self.center_latitude) {
            return Err(ConfigError::invalid(
                "simulation.center_latitude",
                self.center_latitude,
                "must be within [-90, 90]",
            ));
        }
        if !(-180.0..=180.0).contains(&self.center_longitude) {
            return Err(ConfigError::invalid(
                "simulation.center_longitude",
                self.center_longitude,
                "must be within [-180, 180]",
            ));
        }
        check_non_negative("simulation.jitter_span_deg", self.jitter_span_deg)?;
        check_non_negative("simulation.accuracy_m", self.accuracy_m)?;
        Ok(())
    }
}

impl FeedConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.interval_ms == 0 {
            return Err(ConfigError::invalid(
                "feed.interval_ms",
                self.interval_ms,
                "must be greater than zero",
            ));
        }
        check_non_negative("feed.distance_filter_m", self.distance_filter_m)?;
        Ok(())
    }
}

fn check_non_negative(parameter: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(parameter, value, "must be a finite, non-negative number"))
    }
}

/// Loads, validates and saves [`ProximityConfig`] as JSON
#[derive(Debug, Default)]
pub struct ConfigurationManager {
    config: ProximityConfig,
    config_file_path: Option<PathBuf>,
    is_modified: bool,
}

impl ConfigurationManager {
    /// Create a manager holding the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    /// Replace the configuration after validating it
    pub fn update_config(&mut self, config: ProximityConfig) -> ConfigResult<()> {
        config.validate()?;
        self.config = config;
        self.is_modified = true;
        Ok(())
    }

    /// Change the default nearby radius, returning the old value
    pub fn set_default_radius(&mut self, radius_m: f64) -> ConfigResult<f64> {
        check_non_negative("default_radius_m", radius_m)?;
        let old = self.config.default_radius_m;
        self.config.default_radius_m = radius_m;
        self.is_modified = true;
        Ok(old)
    }

    /// Change the feed interval, returning the old value
    pub fn set_feed_interval(&mut self, interval_ms: u64) -> ConfigResult<u64> {
        let candidate = FeedConfig {
            interval_ms,
            ..self.config.feed.clone()
        };
        candidate.validate()?;
        let old = self.config.feed.interval_ms;
        self.config.feed = candidate;
        self.is_modified = true;
        Ok(old)
    }

    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let config: ProximityConfig = serde_json::from_str(&content)?;
        config.validate()?;

        info!(path = %path.display(), "Loaded proximity configuration");
        self.config = config;
        self.config_file_path = Some(path.to_path_buf());
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(&self.config)?;
        fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        debug!(path = %path.display(), "Saved proximity configuration");
        self.config_file_path = Some(path.to_path_buf());
        self.is_modified = false;
        Ok(())
    }

    /// Save to the file the configuration was last loaded from or saved to
    pub fn save(&mut self) -> ConfigResult<()> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::NoPath),
        }
    }

    /// Check if configuration has been modified since last load/save
    pub fn is_modified(&self) -> bool {
        self.is_modified
    }
}
