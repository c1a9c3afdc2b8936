//! Current-location tracking with push notifications
//!
//! The tracker never acquires positions itself. A location source adapter
//! pushes fixes through [`LocationTracker::update_location`] and every
//! subscriber registered at that moment is called with the new point, in
//! registration order. Subscribing does not replay the last known location.

use crate::core::GeoPoint;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tracing::{debug, error, trace};

/// Callback invoked with each new location
pub type LocationCallback = Arc<dyn Fn(&GeoPoint) + Send + Sync>;

/// Identifier of a registered subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn id(&self) -> u64 {
        self.0
    }
}

struct TrackerState {
    current_location: Option<GeoPoint>,
    subscribers: Vec<(SubscriptionId, LocationCallback)>,
    next_id: u64,
    updates: u64,
}

/// Owner of the observing subject's current position.
///
/// Cloning yields another handle onto the same state, so a feed thread
/// and the consumers can share one tracker.
#[derive(Clone)]
pub struct LocationTracker {
    state: Arc<Mutex<TrackerState>>,
}

impl LocationTracker {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(TrackerState {
                current_location: None,
                subscribers: Vec::new(),
                next_id: 0,
                updates: 0,
            })),
        }
    }

    /// Last pushed location, `None` before the first update
    pub fn get_current_location(&self) -> Option<GeoPoint> {
        self.lock().current_location
    }

    /// Register a callback for future location updates.
    ///
    /// The callback is not invoked with the current location.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&GeoPoint) + Send + Sync + 'static,
    {
        let mut state = self.lock();
        state.next_id += 1;
        let id = SubscriptionId(state.next_id);
        state.subscribers.push((id, Arc::new(callback)));
        debug!(subscription = id.0, total = state.subscribers.len(), "Subscriber registered");

        Subscription {
            id,
            tracker: Arc::downgrade(&self.state),
        }
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        remove_subscriber(&self.state, id)
    }

    /// Store a new location and notify subscribers.
    ///
    /// The location is replaced unconditionally, identical consecutive
    /// points included. Callbacks run outside the lock on a snapshot of the
    /// subscriber list; a panicking callback is logged and skipped without
    /// affecting the others. Returns how many callbacks completed.
    pub fn update_location(&self, point: GeoPoint) -> usize {
        let (snapshot, sequence) = {
            let mut state = self.lock();
            state.current_location = Some(point);
            state.updates += 1;
            (state.subscribers.clone(), state.updates)
        };

        trace!(location = %point, sequence, subscribers = snapshot.len(), "Location updated");

        let mut delivered = 0;
        for (id, callback) in snapshot {
            match panic::catch_unwind(AssertUnwindSafe(|| callback(&point))) {
                Ok(()) => delivered += 1,
                Err(payload) => {
                    error!(
                        subscription = id.0,
                        reason = panic_message(&*payload),
                        "Location subscriber panicked"
                    );
                }
            }
        }
        delivered
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock().subscribers.len()
    }

    /// Number of updates received since creation
    pub fn update_count(&self) -> u64 {
        self.lock().updates
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for LocationTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by [`LocationTracker::subscribe`].
///
/// Dropping the handle keeps the subscriber registered; call
/// [`unsubscribe`](Subscription::unsubscribe) to remove it. The handle does
/// not keep the tracker alive.
#[derive(Debug, Clone)]
pub struct Subscription {
    id: SubscriptionId,
    tracker: Weak<Mutex<TrackerState>>,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Remove the subscriber. Safe to call any number of times.
    pub fn unsubscribe(&self) -> bool {
        match self.tracker.upgrade() {
            Some(state) => remove_subscriber(&state, self.id),
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        match self.tracker.upgrade() {
            Some(state) => state
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .subscribers
                .iter()
                .any(|(id, _)| *id == self.id),
            None => false,
        }
    }
}

fn remove_subscriber(state: &Mutex<TrackerState>, id: SubscriptionId) -> bool {
    let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
    let before = state.subscribers.len();
    state.subscribers.retain(|(existing, _)| *existing != id);
    let removed = state.subscribers.len() < before;
    if removed {
        debug!(subscription = id.0, total = state.subscribers.len(), "Subscriber removed");
    }
    removed
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<GeoPoint>>>, impl Fn(&GeoPoint) + Send + Sync + 'static) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&log);
        (log, move |point: &GeoPoint| sink.lock().unwrap().push(*point))
    }

    #[test]
    fn test_location_absent_before_first_update() {
        let tracker = LocationTracker::new();
        assert!(tracker.get_current_location().is_none());

        tracker.update_location(GeoPoint::new(10.0, 20.0));
        assert_eq!(tracker.get_current_location(), Some(GeoPoint::new(10.0, 20.0)));
    }

    #[test]
    fn test_subscriber_receives_updates_in_order() {
        let tracker = LocationTracker::new();
        let (log, callback) = recorder();
        tracker.subscribe(callback);

        tracker.update_location(GeoPoint::new(10.0, 20.0));
        tracker.update_location(GeoPoint::new(11.0, 21.0));

        let log = log.lock().unwrap();
        assert_eq!(*log, vec![GeoPoint::new(10.0, 20.0), GeoPoint::new(11.0, 21.0)]);
    }

    #[test]
    fn test_subscribe_does_not_replay() {
        let tracker = LocationTracker::new();
        tracker.update_location(GeoPoint::new(1.0, 1.0));

        let (log, callback) = recorder();
        tracker.subscribe(callback);
        assert!(log.lock().unwrap().is_empty());

        tracker.update_location(GeoPoint::new(2.0, 2.0));
        assert_eq!(log.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_identical_updates_not_deduplicated() {
        let tracker = LocationTracker::new();
        let (log, callback) = recorder();
        tracker.subscribe(callback);

        let point = GeoPoint::new(5.0, 5.0);
        tracker.update_location(point);
        tracker.update_location(point);
        assert_eq!(log.lock().unwrap().len(), 2);
        assert_eq!(tracker.update_count(), 2);
    }

    #[test]
    fn test_unsubscribe_is_idempotent() {
        let tracker = LocationTracker::new();
        let (log, callback) = recorder();
        let subscription = tracker.subscribe(callback);
        assert!(subscription.is_active());

        assert!(subscription.unsubscribe());
        assert!(!subscription.unsubscribe());
        assert!(!tracker.unsubscribe(subscription.id()));
        assert!(!subscription.is_active());

        tracker.update_location(GeoPoint::new(1.0, 1.0));
        assert!(log.lock().unwrap().is_empty());
        assert_eq!(tracker.subscriber_count(), 0);
    }

    #[test]
    fn test_notification_order_follows_registration() {
        let tracker = LocationTracker::new();
        let order = Arc::new(Mutex::new(Vec::new()));

        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            tracker.subscribe(move |_| order.lock().unwrap().push(label));
        }
        tracker.update_location(GeoPoint::new(0.0, 0.0));

        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_panicking_subscriber_is_isolated() {
        let tracker = LocationTracker::new();
        let (before_log, before) = recorder();
        let (after_log, after) = recorder();

        tracker.subscribe(before);
        tracker.subscribe(|_| panic!("observer failure"));
        tracker.subscribe(after);

        let delivered = tracker.update_location(GeoPoint::new(3.0, 4.0));
        assert_eq!(delivered, 2);
        assert_eq!(before_log.lock().unwrap().len(), 1);
        assert_eq!(after_log.lock().unwrap().len(), 1);
        assert_eq!(tracker.get_current_location(), Some(GeoPoint::new(3.0, 4.0)));

        // Tracker stays usable afterwards
        tracker.update_location(GeoPoint::new(5.0, 6.0));
        assert_eq!(after_log.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_subscriber_may_unsubscribe_itself() {
        let tracker = LocationTracker::new();
        let calls = Arc::new(Mutex::new(0));
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let subscription = {
            let calls = Arc::clone(&calls);
            let slot = Arc::clone(&slot);
            tracker.subscribe(move |_| {
                *calls.lock().unwrap() += 1;
                if let Some(own) = slot.lock().unwrap().as_ref() {
                    own.unsubscribe();
                }
            })
        };
        *slot.lock().unwrap() = Some(subscription);

        tracker.update_location(GeoPoint::new(0.0, 0.0));
        tracker.update_location(GeoPoint::new(0.0, 0.0));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_subscription_outliving_tracker() {
        let tracker = LocationTracker::new();
        let subscription = tracker.subscribe(|_| {});
        drop(tracker);

        assert!(!subscription.unsubscribe());
        assert!(!subscription.is_active());
    }

    #[test]
    fn test_updates_from_another_thread() {
        let tracker = LocationTracker::new();
        let (log, callback) = recorder();
        tracker.subscribe(callback);

        let feeder = tracker.clone();
        std::thread::spawn(move || {
            for i in 0..10 {
                feeder.update_location(GeoPoint::new(i as f64, 0.0));
            }
        })
        .join()
        .unwrap();

        assert_eq!(log.lock().unwrap().len(), 10);
        assert_eq!(tracker.get_current_location(), Some(GeoPoint::new(9.0, 0.0)));
    }
}
