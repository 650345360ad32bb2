//! Tracking Context
//!
//! The tracking context records which effect is currently capturing
//! dependencies. When a signal is read while the context is occupied, the
//! signal appends the occupant to its subscriber list.
//!
//! # Implementation
//!
//! The context is a single slot held by the thread's [`Runtime`]. It is not
//! a stack: entering a scope overwrites whatever was there, and leaving a
//! scope clears the slot to empty. If an effect is created while another
//! effect's first run is in progress, the outer run loses its context when
//! the inner one finishes, and anything it reads afterwards is untracked.
//!
//! [`Runtime`]: super::Runtime

use super::runtime::with_runtime;
use super::subscriber::{Subscriber, SubscriberId};

/// Guard that owns the tracking slot for the duration of a tracked run.
///
/// The slot is cleared when the guard is dropped, including while
/// unwinding from a panic in the tracked body.
pub struct TrackingScope {
    subscriber_id: SubscriberId,
}

impl TrackingScope {
    /// Start tracking on behalf of `subscriber`.
    pub fn enter(subscriber: Subscriber) -> Self {
        let subscriber_id = subscriber.id();
        let displaced = with_runtime(|rt| rt.replace_tracked(Some(subscriber)));
        if let Some(displaced) = displaced {
            tracing::trace!(
                displaced = %displaced.id(),
                subscriber = %subscriber_id,
                "tracking slot overwritten by nested run"
            );
        }

        Self { subscriber_id }
    }

    /// Check if a tracked run is in progress.
    pub fn is_active() -> bool {
        with_runtime(|rt| rt.is_tracking())
    }

    /// The subscriber currently capturing dependencies, if any.
    pub fn current() -> Option<Subscriber> {
        with_runtime(|rt| rt.tracked())
    }

    /// The subscriber this scope was opened for.
    pub fn subscriber_id(&self) -> SubscriberId {
        self.subscriber_id
    }
}

impl Drop for TrackingScope {
    fn drop(&mut self) {
        with_runtime(|rt| rt.replace_tracked(None));
    }
}

/// Run `f` with the tracking slot empty, restoring its occupant afterwards.
///
/// Reads inside `f` register nothing.
pub fn untrack<F, R>(f: F) -> R
where
    F: FnOnce() -> R,
{
    struct Restore(Option<Subscriber>);

    impl Drop for Restore {
        fn drop(&mut self) {
            let previous = self.0.take();
            with_runtime(|rt| rt.replace_tracked(previous));
        }
    }

    let _restore = Restore(with_runtime(|rt| rt.replace_tracked(None)));
    f()
}
