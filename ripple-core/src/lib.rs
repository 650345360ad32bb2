//! Ripple Core
//!
//! This crate provides a minimal fine-grained reactive runtime:
//!
//! - Signals: mutable cells with an ordered subscriber list
//! - Effects: callbacks re-run, deferred and coalesced, after their
//!   dependencies are written
//! - Derived signals: read-only signals kept in sync by an internal effect
//!
//! The engine is single-threaded. Each thread has its own runtime, and
//! deferred work runs when the embedder calls [`reactive::flush`].
//!
//! With the `python` feature the crate also builds as a Python extension
//! module via PyO3.
//!
//! # Architecture
//!
//! - `reactive`: the engine (signals, tracking context, scheduler, effects)
//! - `config`: per-thread runtime configuration
//! - `error`: error types for checkpoints and configuration
//!
//! # Example
//!
//! ```rust
//! use ripple_core::reactive::{derived, effect, flush, get, signal};
//!
//! let value = signal(5);
//! let source = value.clone();
//! let double = derived(move || get(&source) * 2);
//!
//! let (v, d) = (value.clone(), double.clone());
//! effect(move || println!("value: {}, double: {}", get(&v), get(&d)));
//! // Prints: "value: 5, double: 10"
//!
//! value.set(6);
//! flush().unwrap();
//! // Prints: "value: 6, double: 12"
//! assert_eq!(double.get_untracked(), 12);
//! ```

pub mod reactive;
pub mod config;
pub mod error;

#[cfg(feature = "python")]
mod python;

pub use config::RuntimeConfig;
pub use error::{ReactiveError, Result};

#[cfg(feature = "python")]
use pyo3::prelude::*;

/// Python module definition.
///
/// This function is called by Python when importing the module.
/// It registers all Python-exposed types and functions.
#[cfg(feature = "python")]
#[pymodule]
fn _core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    python::register(m)?;

    // Add version info
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;

    Ok(())
}
