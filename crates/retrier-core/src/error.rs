//! Error types for retrier-core
//!
//! The retry engine itself never produces these: it hands back the
//! operation's own error. They cover loading retry policies.

use thiserror::Error;

/// Result type alias using retrier-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading or resolving retry policies
#[derive(Error, Debug)]
pub enum Error {
    /// Policy file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: String },

    /// Invalid configuration value
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Named policy does not exist and no fallback was requested
    #[error("Unknown retry policy: {name}")]
    UnknownPolicy { name: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config_not_found(path: impl Into<String>) -> Self {
        Self::ConfigNotFound { path: path.into() }
    }

    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }

    pub fn unknown_policy(name: impl Into<String>) -> Self {
        Self::UnknownPolicy { name: name.into() }
    }
}
