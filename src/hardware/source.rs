//! Location source trait

use crate::core::GeoPoint;
use crate::hardware::SourceResult;

/// Adapter producing position fixes for a tracker.
///
/// Device GPS bindings, simulated feeds and test harnesses implement this;
/// a [`LocationFeed`](crate::hardware::LocationFeed) polls it and pushes the
/// results into a [`LocationTracker`](crate::api::LocationTracker).
pub trait LocationSource: Send {
    /// Poll for the next fix.
    /// Returns Ok(Some(point)) when a fix is available
    /// Returns Ok(None) when nothing new is available (non-blocking)
    /// Returns Err(error) if the source failed
    fn next_fix(&mut self) -> SourceResult<Option<GeoPoint>>;

    /// Human-readable name used in logs
    fn name(&self) -> &str;
}

impl<S: LocationSource + ?Sized> LocationSource for Box<S> {
    fn next_fix(&mut self) -> SourceResult<Option<GeoPoint>> {
        (**self).next_fix()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
