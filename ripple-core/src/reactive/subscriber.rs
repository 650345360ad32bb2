//! Subscriber types for the reactive system.
//!
//! A Subscriber is a registration on a signal's notification list: an
//! effect's scheduling wrapper, or a plain callback added through
//! `subscribe`. Signals hold subscribers weakly; the runtime keeps the
//! callback itself alive for the rest of the thread's life.

use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use super::runtime::with_runtime;

/// Unique identifier for a subscriber.
///
/// The same subscriber may appear on a signal's list many times; the ID is
/// what lets callers tell those entries apart from other subscribers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub#{}", self.0)
    }
}

/// A weak registration of a notification callback.
///
/// Cloning a subscriber clones the registration, not the callback.
#[derive(Clone)]
pub struct Subscriber {
    id: SubscriberId,
    callback: Weak<dyn Fn()>,
}

impl Subscriber {
    /// Create a subscriber for the given callback.
    ///
    /// The callback is handed to the current thread's runtime, which owns
    /// it from now on.
    pub fn new<F>(notify: F) -> Self
    where
        F: Fn() + 'static,
    {
        Self::with_id(SubscriberId::new(), notify)
    }

    /// Like [`Subscriber::new`], for callers that need the ID up front.
    pub(crate) fn with_id<F>(id: SubscriberId, notify: F) -> Self
    where
        F: Fn() + 'static,
    {
        let callback: Rc<dyn Fn()> = Rc::new(notify);
        let weak = Rc::downgrade(&callback);
        with_runtime(|rt| rt.retain(callback));

        Self {
            id,
            callback: weak,
        }
    }

    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Invoke the callback.
    ///
    /// Does nothing once the owning runtime has been torn down.
    pub fn notify(&self) {
        if let Some(callback) = self.callback.upgrade() {
            callback();
        }
    }

    /// Whether the callback is still owned by a live runtime.
    pub fn is_alive(&self) -> bool {
        self.callback.strong_count() > 0
    }
}

impl fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscriber")
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn subscriber_ids_are_unique() {
        let id1 = SubscriberId::new();
        let id2 = SubscriberId::new();
        let id3 = SubscriberId::new();

        assert_ne!(id1, id2);
        assert_ne!(id2, id3);
        assert_ne!(id1, id3);
    }

    #[test]
    fn subscriber_notify_calls_callback() {
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();

        let subscriber = Subscriber::new(move || {
            calls_clone.set(calls_clone.get() + 1);
        });

        assert_eq!(calls.get(), 0);
        subscriber.notify();
        subscriber.notify();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn clones_share_callback_and_id() {
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();

        let subscriber = Subscriber::new(move || calls_clone.set(calls_clone.get() + 1));
        let copy = subscriber.clone();

        assert_eq!(subscriber.id(), copy.id());
        copy.notify();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn callback_outlives_creating_scope() {
        let subscriber = {
            let flag = Rc::new(Cell::new(false));
            Subscriber::new(move || flag.set(true))
        };
        assert!(subscriber.is_alive());
    }
}
