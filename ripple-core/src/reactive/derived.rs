//! Derived Signals
//!
//! A derived signal is a plain [`Signal`] whose only writer is an effect
//! the derived owns. Upstream writes schedule that effect; one microtask
//! later it recomputes and `set`s the signal, which in turn notifies the
//! derived's own subscribers. Nothing is cached beyond the signal's value
//! and nothing is compared.
//!
//! # Seed Computation
//!
//! The initial value is computed before the internal effect exists, under
//! whatever tracking scope is active at the call site. When `derived` is
//! called from inside another effect's first run, the signals read by that
//! seed computation become dependencies of the *outer* effect. The internal
//! effect's own first run then captures the real dependencies. This edge
//! case is implementation-defined and kept as is.

use super::effect::Effect;
use super::signal::{ReadSignal, Signal};

/// Create a read-only signal kept in sync with `compute`.
///
/// `compute` runs twice on creation: once to seed the value and once as
/// the internal effect's tracked first run.
pub fn derived<T, F>(compute: F) -> ReadSignal<T>
where
    T: Clone + 'static,
    F: Fn() -> T + 'static,
{
    let signal = Signal::new(compute());

    let target = signal.clone();
    let effect = Effect::new(move || target.set(compute()));
    tracing::debug!(signal = signal.id(), effect = %effect.id(), "derived created");

    signal.read_only()
}
