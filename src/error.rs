//! Error types for sqlspy-tracing

use thiserror::Error;

/// Result type alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading spy logging configuration.
///
/// Routing itself never fails; only reading configuration does.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A dump flag that is not `true` or `false`
    #[error("Invalid boolean for '{key}': {value:?}")]
    InvalidBool { key: String, value: String },

    /// A threshold that is not a non-negative number of milliseconds
    #[error("Invalid threshold for '{key}': {value:?} (expected milliseconds)")]
    InvalidThreshold { key: String, value: String },

    /// Properties text is not valid `key=value` syntax
    #[error("Parse error: {0}")]
    Parse(#[from] ini::ParseError),

    /// Properties file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ini::Error> for ConfigError {
    fn from(err: ini::Error) -> Self {
        match err {
            ini::Error::Io(err) => Self::Io(err),
            ini::Error::Parse(err) => Self::Parse(err),
        }
    }
}

impl ConfigError {
    pub fn invalid_bool(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidBool {
            key: key.into(),
            value: value.into(),
        }
    }

    pub fn invalid_threshold(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidThreshold {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Returned by [`install_global`](crate::install_global) when a delegator is
/// already in place.
#[derive(Debug, Error)]
#[error("a global spy log delegator is already installed")]
pub struct GlobalAlreadyInstalled;
