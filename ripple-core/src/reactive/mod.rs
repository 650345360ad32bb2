//! Reactive Primitives
//!
//! This module implements the signal engine: signals, effects, and derived
//! signals, wired together by automatic dependency tracking and a
//! microtask queue.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for mutable state. When a signal is read during
//! an effect's first run, the signal records that effect's scheduling
//! wrapper as a subscriber. Every write invokes all subscribers,
//! synchronously and in registration order, whether or not the value
//! changed.
//!
//! ## Effects
//!
//! An Effect is a side-effecting computation. It runs once, tracked, when
//! created. After that, a write to any of its dependencies queues a single
//! deferred re-run; any number of writes before the next checkpoint
//! collapse into that one run. Re-runs are untracked, so an effect's
//! dependencies never change after creation.
//!
//! ## Derived
//!
//! A derived signal is a read-only signal written only by an effect it
//! owns, which recomputes an expression over other signals.
//!
//! # Implementation Notes
//!
//! All state lives in a per-thread [`Runtime`]: the single tracking slot,
//! the microtask queue, and the callbacks that signals reference weakly.
//! [`flush`] is the microtask checkpoint; the embedder calls it wherever a
//! JavaScript host would drain microtasks.
//!
//! Nothing can be unsubscribed or disposed, and there is no error isolation
//! inside the engine itself.

mod signal;
mod context;
mod subscriber;
mod scheduler;
mod effect;
mod derived;
mod runtime;

pub use signal::{get, signal, Readable, ReadSignal, Signal};
pub use context::{untrack, TrackingScope};
pub use subscriber::{Subscriber, SubscriberId};
pub use scheduler::{flush, pending_microtasks, queue_microtask, FlushReport, Microtask, MicrotaskQueue};
pub use effect::{effect, Effect};
pub use derived::derived;
pub use runtime::{configure, stats, with_runtime, Runtime, RuntimeStats};
