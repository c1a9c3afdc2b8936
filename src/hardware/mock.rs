//! Scripted location source for testing

use crate::core::GeoPoint;
use crate::hardware::{LocationSource, SourceError, SourceResult};
use std::collections::VecDeque;

/// Location source that replays queued fixes and errors
pub struct ScriptedLocationSource {
    name: String,
    queue: VecDeque<SourceResult<GeoPoint>>,
    connected: bool,
    polls: u64,
}

impl ScriptedLocationSource {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            queue: VecDeque::new(),
            connected: true,
            polls: 0,
        }
    }

    /// Create a source preloaded with fixes
    pub fn with_fixes(name: &str, fixes: impl IntoIterator<Item = GeoPoint>) -> Self {
        let mut source = Self::new(name);
        for fix in fixes {
            source.push_fix(fix);
        }
        source
    }

    pub fn push_fix(&mut self, fix: GeoPoint) {
        self.queue.push_back(Ok(fix));
    }

    /// Queue an error to be returned in place of a fix
    pub fn push_error(&mut self, error: SourceError) {
        self.queue.push_back(Err(error));
    }

    /// Simulate losing the underlying device
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    pub fn reconnect(&mut self) {
        self.connected = true;
    }

    pub fn queued_count(&self) -> usize {
        self.queue.len()
    }

    /// Number of times `next_fix` was called
    pub fn poll_count(&self) -> u64 {
        self.polls
    }
}

impl LocationSource for ScriptedLocationSource {
    fn next_fix(&mut self) -> SourceResult<Option<GeoPoint>> {
        self.polls += 1;

        if !self.connected {
            return Err(SourceError::Unavailable {
                source_name: self.name.clone(),
            });
        }

        match self.queue.pop_front() {
            Some(Ok(fix)) => Ok(Some(fix)),
            Some(Err(error)) => Err(error),
            None => Ok(None),
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replays_in_order() {
        let mut source = ScriptedLocationSource::with_fixes(
            "script",
            [GeoPoint::new(1.0, 1.0), GeoPoint::new(2.0, 2.0)],
        );
        assert_eq!(source.queued_count(), 2);

        assert_eq!(source.next_fix().unwrap(), Some(GeoPoint::new(1.0, 1.0)));
        assert_eq!(source.next_fix().unwrap(), Some(GeoPoint::new(2.0, 2.0)));
        assert_eq!(source.next_fix().unwrap(), None);
        assert_eq!(source.poll_count(), 3);
    }

    #[test]
    fn test_queued_errors() {
        let mut source = ScriptedLocationSource::new("script");
        source.push_error(SourceError::Timeout { timeout_ms: 15_000 });
        source.push_fix(GeoPoint::new(0.0, 0.0));

        assert!(matches!(source.next_fix(), Err(SourceError::Timeout { .. })));
        assert!(source.next_fix().unwrap().is_some());
    }

    #[test]
    fn test_connection_simulation() {
        let mut source = ScriptedLocationSource::with_fixes("gps", [GeoPoint::new(0.0, 0.0)]);

        source.disconnect();
        let result = source.next_fix();
        assert!(matches!(result, Err(SourceError::Unavailable { .. })));
        assert_eq!(source.queued_count(), 1);

        source.reconnect();
        assert!(source.next_fix().unwrap().is_some());
    }
}
