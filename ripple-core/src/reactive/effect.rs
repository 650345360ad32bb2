//! Effect Implementation
//!
//! An Effect is a side-effecting computation that re-runs after the
//! signals it depends on are written.
//!
//! # How Effects Work
//!
//! 1. When created, the effect runs its function immediately, inside a
//!    tracking scope opened for the effect's *scheduling wrapper*. Every
//!    signal read during this run subscribes the wrapper.
//!
//! 2. When a dependency is written, the signal invokes the wrapper. If the
//!    effect is not already pending, the wrapper marks it pending and queues
//!    one microtask. Further notifications before that microtask runs are
//!    dropped.
//!
//! 3. The microtask clears the pending flag and calls the function again,
//!    *without* a tracking scope.
//!
//! # Static Dependencies
//!
//! Because only the first run is tracked, the dependency set is fixed at
//! creation. A signal read only on a branch the first run did not take is
//! never a dependency, no matter what later runs read.
//!
//! # Failures
//!
//! A panic in the first run unwinds out of [`Effect::new`] after the
//! tracking slot has been cleared. A panic in a deferred run fails that
//! microtask's turn (see [`flush`](super::flush)); the pending flag was
//! already cleared, so the next notification schedules normally.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use super::context::TrackingScope;
use super::runtime::with_runtime;
use super::scheduler::queue_microtask;
use super::subscriber::{Subscriber, SubscriberId};

struct EffectState {
    run: Box<dyn Fn()>,
    pending: Cell<bool>,
    run_count: Cell<usize>,
}

impl EffectState {
    /// The scheduling wrapper body.
    fn schedule(state: &Rc<Self>, id: SubscriberId) {
        if state.pending.get() {
            return;
        }
        state.pending.set(true);

        let state = Rc::clone(state);
        queue_microtask(move || {
            state.pending.set(false);
            tracing::trace!(effect = %id, "effect re-run");
            state.invoke();
        });
    }

    fn invoke(&self) {
        self.run_count.set(self.run_count.get() + 1);
        (self.run)();
    }
}

/// A side-effecting computation that re-runs when its dependencies change.
///
/// The handle is only needed for introspection; dropping it does not stop
/// the effect. There is no way to dispose of an effect.
///
/// # Example
///
/// ```rust,ignore
/// let count = Signal::new(0);
///
/// let c = count.clone();
/// Effect::new(move || {
///     println!("Count is: {}", c.get());
/// });
///
/// count.set(5);
/// flush()?; // Prints: "Count is: 5"
/// ```
#[derive(Clone)]
pub struct Effect {
    state: Rc<EffectState>,
    wrapper: Subscriber,
}

impl Effect {
    /// Create a new effect and run it once, synchronously and tracked.
    pub fn new<F>(run: F) -> Self
    where
        F: Fn() + 'static,
    {
        let state = Rc::new(EffectState {
            run: Box::new(run),
            pending: Cell::new(false),
            run_count: Cell::new(0),
        });

        let wrapper = {
            let state = Rc::clone(&state);
            let id = SubscriberId::new();
            Subscriber::with_id(id, move || EffectState::schedule(&state, id))
        };

        with_runtime(|rt| rt.record_effect());
        tracing::debug!(effect = %wrapper.id(), "effect created");

        {
            let _scope = TrackingScope::enter(wrapper.clone());
            state.invoke();
        }

        Self { state, wrapper }
    }

    /// Get the effect's unique ID (the ID of its scheduling wrapper).
    pub fn id(&self) -> SubscriberId {
        self.wrapper.id()
    }

    /// The scheduling wrapper that signals hold on their lists.
    pub fn subscriber(&self) -> &Subscriber {
        &self.wrapper
    }

    /// Whether a re-run is queued and has not started yet.
    pub fn is_pending(&self) -> bool {
        self.state.pending.get()
    }

    /// Number of times the function has been invoked, first run included.
    pub fn run_count(&self) -> usize {
        self.state.run_count.get()
    }
}

impl fmt::Debug for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Effect")
            .field("id", &self.id())
            .field("run_count", &self.run_count())
            .field("pending", &self.is_pending())
            .finish()
    }
}

/// Create a fire-and-forget effect.
pub fn effect<F>(run: F)
where
    F: Fn() + 'static,
{
    Effect::new(run);
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
