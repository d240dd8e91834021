//! Error types for the shield providers.
//!
//! Load-time errors abort provider construction; per-call errors abort a
//! single shield invocation. Error text never carries matched secret values.

use thiserror::Error;

/// Unified error type for shield operations.
#[derive(Debug, Error)]
pub enum ShieldError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid pattern at position {position}: {source}")]
    PatternCompile {
        position: usize,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid replacement template for rule '{label}': {reason}")]
    Replacement { label: String, reason: String },

    #[error("Classification backend error: {0}")]
    Backend(String),

    #[error("Configuration loading failed: {0}")]
    ConfigLoad(#[from] config::ConfigError),
}

/// Result type alias for shield operations.
pub type ShieldResult<T> = Result<T, ShieldError>;
