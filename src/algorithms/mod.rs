//! Geodesic algorithms

pub mod distance;
pub mod local_frame;

pub use distance::{distance, is_nearby, is_within};
pub use local_frame::{bearing_deg, from_local_offset, local_offset};
