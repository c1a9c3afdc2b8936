//! Core types, constants and errors for the proximity engine

pub mod types;
pub mod constants;
pub mod error;

pub use types::*;
pub use constants::*;
pub use error::{GeoError, GeoResult};
