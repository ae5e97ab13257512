//! Error types for grafwatch-core.

use thiserror::Error;

/// Errors raised while validating the startup configuration.
///
/// Every variant is fatal: the daemon refuses to start.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required setting was empty.
    #[error("missing required setting: {0}")]
    Missing(&'static str),

    /// A setting was present but unusable.
    #[error("invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Convenience constructor for [`ConfigError::Invalid`].
pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}
