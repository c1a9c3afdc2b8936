//! Location source adapters
//!
//! The tracker only defines a push contract. This module holds the pieces
//! that produce pushes: the [`LocationSource`] trait, a simulated jitter
//! source, a scripted source for tests, and the [`LocationFeed`] that
//! polls a source on an interval.

pub mod source;
pub mod simulated;
pub mod mock;
pub mod feed;
pub mod error;

pub use source::LocationSource;
pub use simulated::SimulatedLocationSource;
pub use mock::ScriptedLocationSource;
pub use feed::{FeedPump, FeedStats, LocationFeed, PumpOutcome};
pub use error::{SourceError, SourceResult};
