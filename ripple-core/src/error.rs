//! Error Types
//!
//! Reads, writes, effects and derived values never fail on their own; a
//! panic raised by user code simply unwinds through them. The errors here
//! belong to the microtask checkpoint and to configuration loading.

use thiserror::Error;

/// Errors surfaced by the reactive runtime.
#[derive(Debug, Error)]
pub enum ReactiveError {
    /// One or more microtasks panicked while the queue was drained.
    ///
    /// Every other queued task still ran; `message` is the payload of the
    /// first failure.
    #[error("{failed} microtask(s) panicked during flush: {message}")]
    TaskPanicked { failed: usize, message: String },

    /// `flush` was called from inside a running microtask.
    #[error("flush called while the microtask queue is already draining")]
    ReentrantFlush,

    /// The configured turn limit was reached with work still queued.
    #[error("turn limit of {limit} microtasks reached with {pending} still queued")]
    TurnLimitExceeded { limit: usize, pending: usize },

    /// The runtime configuration could not be parsed.
    #[error("invalid runtime configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ReactiveError>;

#[cfg(feature = "python")]
impl From<ReactiveError> for pyo3::PyErr {
    fn from(err: ReactiveError) -> Self {
        pyo3::exceptions::PyRuntimeError::new_err(err.to_string())
    }
}
