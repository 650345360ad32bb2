//! Reactive Runtime
//!
//! The runtime is the per-thread context object that every reactive
//! primitive talks to. It owns:
//!
//! - the tracking slot (see [`TrackingScope`](super::TrackingScope)),
//! - the microtask queue that deferred effect re-runs go through,
//! - the strong half of every subscriber callback, which signals only
//!   reference weakly,
//! - the active [`RuntimeConfig`] and a handful of counters.
//!
//! # Threading
//!
//! Execution is single-threaded and cooperative. The runtime lives in a
//! `thread_local!`, so each OS thread gets a fully independent engine and
//! reactive handles are `!Send`. Nothing is ever unregistered: callbacks
//! stay alive until the thread exits and its runtime is dropped.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::Serialize;

use super::scheduler::MicrotaskQueue;
use super::subscriber::Subscriber;
use crate::config::RuntimeConfig;

/// Point-in-time counters for the current thread's runtime.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RuntimeStats {
    pub signals_created: u64,
    pub effects_created: u64,
    /// Subscriber invocations made by `set`/`update`, duplicates included.
    pub notifications: u64,
    pub microtasks_queued: u64,
    pub microtasks_run: u64,
    pub microtasks_failed: u64,
    pub pending_microtasks: usize,
    pub retained_callbacks: usize,
}

#[derive(Default)]
struct Counters {
    signals_created: Cell<u64>,
    effects_created: Cell<u64>,
    notifications: Cell<u64>,
    microtasks_queued: Cell<u64>,
    microtasks_run: Cell<u64>,
    microtasks_failed: Cell<u64>,
}

fn bump(counter: &Cell<u64>, by: u64) {
    counter.set(counter.get() + by);
}

/// The per-thread reactive runtime.
pub struct Runtime {
    /// The currently tracked subscriber. A single slot, never a stack.
    tracking: RefCell<Option<Subscriber>>,
    queue: MicrotaskQueue,
    /// Strong references to every subscriber callback ever created.
    retained: RefCell<Vec<Rc<dyn Fn()>>>,
    config: RefCell<RuntimeConfig>,
    counters: Counters,
}

impl Runtime {
    fn new() -> Self {
        Self {
            tracking: RefCell::new(None),
            queue: MicrotaskQueue::default(),
            retained: RefCell::new(Vec::new()),
            config: RefCell::new(RuntimeConfig::default()),
            counters: Counters::default(),
        }
    }

    /// Overwrite the tracking slot, returning the previous occupant.
    pub(crate) fn replace_tracked(&self, subscriber: Option<Subscriber>) -> Option<Subscriber> {
        self.tracking.replace(subscriber)
    }

    pub(crate) fn tracked(&self) -> Option<Subscriber> {
        self.tracking.borrow().clone()
    }

    pub(crate) fn is_tracking(&self) -> bool {
        self.tracking.borrow().is_some()
    }

    pub(crate) fn queue(&self) -> &MicrotaskQueue {
        &self.queue
    }

    pub(crate) fn retain(&self, callback: Rc<dyn Fn()>) {
        self.retained.borrow_mut().push(callback);
    }

    pub(crate) fn config(&self) -> RuntimeConfig {
        self.config.borrow().clone()
    }

    pub(crate) fn record_signal(&self) {
        bump(&self.counters.signals_created, 1);
    }

    pub(crate) fn record_effect(&self) {
        bump(&self.counters.effects_created, 1);
    }

    pub(crate) fn record_notifications(&self, count: usize) {
        bump(&self.counters.notifications, count as u64);
    }

    pub(crate) fn record_queued(&self) {
        bump(&self.counters.microtasks_queued, 1);
    }

    pub(crate) fn record_run(&self, failed: bool) {
        bump(&self.counters.microtasks_run, 1);
        if failed {
            bump(&self.counters.microtasks_failed, 1);
        }
    }

    /// Snapshot the counters.
    pub fn stats(&self) -> RuntimeStats {
        RuntimeStats {
            signals_created: self.counters.signals_created.get(),
            effects_created: self.counters.effects_created.get(),
            notifications: self.counters.notifications.get(),
            microtasks_queued: self.counters.microtasks_queued.get(),
            microtasks_run: self.counters.microtasks_run.get(),
            microtasks_failed: self.counters.microtasks_failed.get(),
            pending_microtasks: self.queue.len(),
            retained_callbacks: self.retained.borrow().len(),
        }
    }
}

thread_local! {
    static RUNTIME: Runtime = Runtime::new();
}

/// Run `f` against the current thread's runtime.
///
/// Callers must not invoke user code while holding one of the runtime's
/// internal borrows.
pub fn with_runtime<F, R>(f: F) -> R
where
    F: FnOnce(&Runtime) -> R,
{
    RUNTIME.with(f)
}

/// Replace the current thread's runtime configuration.
pub fn configure(config: RuntimeConfig) {
    tracing::debug!(?config, "runtime configured");
    with_runtime(|rt| *rt.config.borrow_mut() = config);
}

/// Snapshot the current thread's runtime counters.
pub fn stats() -> RuntimeStats {
    with_runtime(Runtime::stats)
}
