//! Runtime Configuration
//!
//! Configuration is per thread, like the runtime itself. It is plain data
//! and can be loaded from JSON:
//!
//! ```rust,ignore
//! let config = RuntimeConfig::from_json(r#"{ "turn_limit": 10000 }"#)?;
//! ripple_core::reactive::configure(config);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for the per-thread reactive runtime.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Maximum number of microtasks a single `flush` may run.
    ///
    /// `None` drains until the queue is empty, however long that takes.
    /// When the limit is hit the remaining tasks stay queued for the next
    /// checkpoint.
    pub turn_limit: Option<usize>,
}

impl RuntimeConfig {
    /// Parse a configuration from a JSON document.
    ///
    /// Missing fields take their default values.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builder-style setter for [`RuntimeConfig::turn_limit`].
    pub fn with_turn_limit(mut self, limit: usize) -> Self {
        self.turn_limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReactiveError;

    #[test]
    fn default_is_unbounded() {
        assert_eq!(RuntimeConfig::default().turn_limit, None);
    }

    #[test]
    fn parses_turn_limit() {
        let config = RuntimeConfig::from_json(r#"{ "turn_limit": 64 }"#).unwrap();
        assert_eq!(config, RuntimeConfig::default().with_turn_limit(64));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config = RuntimeConfig::from_json("{}").unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }

    #[test]
    fn rejects_malformed_json() {
        let err = RuntimeConfig::from_json("{ turn_limit: ").unwrap_err();
        assert!(matches!(err, ReactiveError::Config(_)));
    }
}
