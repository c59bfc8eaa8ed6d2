//! Error types for the hunter controller and its drivers.
//!
//! The controller's tick never fails; these errors only surface at the
//! edges (configuration loading and the driver binary).

use thiserror::Error;

/// Top-level error type for hunter operations.
#[derive(Debug, Error)]
pub enum HunterError {
    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The document could not be parsed
    #[error("Failed to parse config: {0}")]
    Parse(String),

    /// A field holds a value that cannot be repaired by clamping
    #[error("Invalid value for `{field}`: {reason}")]
    Invalid {
        /// Offending field
        field: &'static str,
        /// Why the value was rejected
        reason: String,
    },
}

impl ConfigError {
    /// Shorthand for an [`ConfigError::Invalid`] error.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Result type alias for hunter operations.
pub type HunterResult<T> = Result<T, HunterError>;
