//! Drives a location source into a tracker
//!
//! [`FeedPump`] performs one poll-filter-push step synchronously.
//! [`LocationFeed`] runs a pump on a background thread, polling every
//! `interval_ms` until stopped, dropped, or the source reports an
//! unrecoverable error.

use crate::algorithms::distance::distance;
use crate::api::LocationTracker;
use crate::core::{now_ms, GeoPoint};
use crate::hardware::{LocationSource, SourceError};
use crate::utils::config::FeedConfig;
use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Result of a single pump step
#[derive(Debug, Clone, PartialEq)]
pub enum PumpOutcome {
    /// Fix pushed to the tracker
    Pushed(GeoPoint),
    /// Source had nothing new
    NoFix,
    /// Fix older than `max_fix_age_ms`
    Stale { age_ms: u64 },
    /// Fix closer than `distance_filter_m` to the last pushed one
    Filtered { moved_m: f64 },
    /// Source reported an error
    Failed(SourceError),
}

/// Counters kept by a pump
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedStats {
    pub polls: u64,
    pub pushed: u64,
    pub dropped_stale: u64,
    pub dropped_filtered: u64,
    pub errors: u64,
}

/// Synchronous poll-filter-push step over a source
pub struct FeedPump<S> {
    source: S,
    tracker: LocationTracker,
    config: FeedConfig,
    last_pushed: Option<GeoPoint>,
    stats: FeedStats,
}

impl<S: LocationSource> FeedPump<S> {
    pub fn new(source: S, tracker: LocationTracker, config: FeedConfig) -> Self {
        Self {
            source,
            tracker,
            config,
            last_pushed: None,
            stats: FeedStats::default(),
        }
    }

    /// Poll the source once and push the fix if it passes the filters
    pub fn pump_once(&mut self) -> PumpOutcome {
        self.stats.polls += 1;

        let fix = match self.source.next_fix() {
            Ok(Some(fix)) => fix,
            Ok(None) => return PumpOutcome::NoFix,
            Err(e) => {
                self.stats.errors += 1;
                return PumpOutcome::Failed(e);
            }
        };

        if !fix.is_finite() {
            self.stats.errors += 1;
            return PumpOutcome::Failed(SourceError::InvalidFix {
                reason: format!("non-finite coordinates {}", fix),
            });
        }

        if self.config.max_fix_age_ms > 0 {
            if let Some(timestamp) = fix.timestamp {
                let age_ms = now_ms().saturating_sub(timestamp);
                if age_ms > self.config.max_fix_age_ms {
                    self.stats.dropped_stale += 1;
                    debug!(source = self.source.name(), age_ms, "Dropping stale fix");
                    return PumpOutcome::Stale { age_ms };
                }
            }
        }

        if self.config.distance_filter_m > 0.0 {
            if let Some(last) = &self.last_pushed {
                let moved_m = distance(last, &fix);
                if moved_m < self.config.distance_filter_m {
                    self.stats.dropped_filtered += 1;
                    return PumpOutcome::Filtered { moved_m };
                }
            }
        }

        self.tracker.update_location(fix);
        self.last_pushed = Some(fix);
        self.stats.pushed += 1;
        PumpOutcome::Pushed(fix)
    }

    pub fn stats(&self) -> FeedStats {
        self.stats
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

/// Background thread polling a location source on a fixed interval
pub struct LocationFeed {
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
    stats: Arc<Mutex<FeedStats>>,
}

impl LocationFeed {
    /// Start polling `source` every `config.interval_ms`, pushing into `tracker`.
    ///
    /// The first poll happens immediately. An invalid `config` is rejected
    /// with [`io::ErrorKind::InvalidInput`] before any thread starts.
    pub fn spawn<S>(source: S, tracker: LocationTracker, config: FeedConfig) -> io::Result<Self>
    where
        S: LocationSource + 'static,
    {
        config
            .validate()
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let stats = Arc::new(Mutex::new(FeedStats::default()));
        let shared = Arc::clone(&stats);
        let interval = Duration::from_millis(config.interval_ms);

        let handle = thread::Builder::new()
            .name("location-feed".to_string())
            .spawn(move || {
                let mut pump = FeedPump::new(source, tracker, config);
                let name = pump.source().name().to_string();
                info!(
                    source = %name,
                    interval_ms = interval.as_millis() as u64,
                    "Location feed started"
                );

                loop {
                    let outcome = pump.pump_once();
                    *shared.lock().unwrap_or_else(PoisonError::into_inner) = pump.stats();

                    if let PumpOutcome::Failed(e) = outcome {
                        if e.is_recoverable() {
                            warn!(source = %name, error = %e, "Location source error");
                        } else {
                            error!(
                                source = %name,
                                error = %e,
                                "Location source failed, stopping feed"
                            );
                            break;
                        }
                    }

                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }

                let stats = pump.stats();
                info!(
                    source = %name,
                    polls = stats.polls,
                    pushed = stats.pushed,
                    errors = stats.errors,
                    "Location feed stopped"
                );
            })?;

        Ok(Self {
            stop_tx: Some(stop_tx),
            handle: Some(handle),
            stats,
        })
    }

    /// Latest counters published by the feed thread
    pub fn stats(&self) -> FeedStats {
        *self.stats.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether the feed thread is still polling
    pub fn is_running(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Stop the feed thread, wait for it, and return its final counters
    pub fn stop(mut self) -> FeedStats {
        self.shutdown();
        self.stats()
    }

    fn shutdown(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            // Send fails only when the thread already exited
            let _ = stop_tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Location feed thread panicked");
            }
        }
    }
}

impl Drop for LocationFeed {
    fn drop(&mut self) {
        self.shutdown();
    }
}
