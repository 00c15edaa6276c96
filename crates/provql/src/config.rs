//! Explicit API configuration.
//!
//! The configuration is a plain value passed to the entry points that need
//! it, never a process-wide singleton; a host application typically builds
//! one at startup (e.g. from its own config file) and threads it through.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default ceiling on the number of rows a single query may return.
pub const DEFAULT_ENTITY_LIMIT: u32 = 100;

/// Configuration consumed by the query entry points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Reject mutating operations when set.
    #[serde(default)]
    pub read_only: bool,

    /// Maximum number of rows a single query may return.
    #[serde(default = "default_entity_limit")]
    pub entity_limit: u32,
}

fn default_entity_limit() -> u32 {
    DEFAULT_ENTITY_LIMIT
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            read_only: false,
            entity_limit: DEFAULT_ENTITY_LIMIT,
        }
    }
}

/// Errors raised when validating request parameters against the
/// configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The requested page size exceeds the configured ceiling.
    #[error("'limit' must be no more than {maximum}, got {requested}")]
    LimitTooLarge {
        /// The page size the client asked for.
        requested: u32,
        /// The configured ceiling.
        maximum: u32,
    },
}

impl ApiConfig {
    /// Validates a requested page size against the configured ceiling.
    pub fn validate_limit(&self, requested: u32) -> Result<u32, ConfigError> {
        if requested > self.entity_limit {
            return Err(ConfigError::LimitTooLarge {
                requested,
                maximum: self.entity_limit,
            });
        }
        Ok(requested)
    }
}
