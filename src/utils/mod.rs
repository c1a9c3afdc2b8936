//! Configuration support

pub mod config;

pub use config::{
    ConfigError, ConfigResult, ConfigurationManager, FeedConfig, ProximityConfig, SimulationConfig,
};
