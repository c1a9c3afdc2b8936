//! Input validation

pub mod coordinates;

pub use coordinates::CoordinatePolicy;
