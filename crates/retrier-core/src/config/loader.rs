//! Retry policy loader with precedence
//!
//! Loads policies from the following sources (low to high):
//! 1. Built-in defaults
//! 2. Policy file (explicit path, or `<config dir>/retrier/retrier.yaml`)
//! 3. Environment variables (`RETRIER_*` prefix, applied to the default policy)
//! 4. CLI flags (handled by caller)

use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use std::fs;

use crate::error::{Error, Result};
use crate::types::RetryPoliciesConfig;

/// Overrides `default.max-attempts`
pub const ENV_MAX_ATTEMPTS: &str = "RETRIER_MAX_ATTEMPTS";

/// Overrides `default.log-threshold`
pub const ENV_LOG_THRESHOLD: &str = "RETRIER_LOG_THRESHOLD";

/// File name looked up in the config directory
pub const POLICY_FILE_NAME: &str = "retrier.yaml";

/// Policy configuration loader
#[derive(Debug, Clone)]
pub struct PolicyLoader {
    /// Directory searched when no explicit file is given
    config_dir: Option<Utf8PathBuf>,
}

impl Default for PolicyLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyLoader {
    /// Create a loader rooted at the platform config directory
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .and_then(|dir| Utf8PathBuf::from_path_buf(dir).ok())
            .map(|dir| dir.join("retrier"));
        Self { config_dir }
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            config_dir: Some(config_dir.into()),
        }
    }

    /// Path of the implicit policy file, whether or not it exists
    pub fn default_path(&self) -> Option<Utf8PathBuf> {
        self.config_dir
            .as_ref()
            .map(|dir| dir.join(POLICY_FILE_NAME))
    }

    /// Load policies with full precedence
    ///
    /// An explicit `path` must exist. Without one, the implicit file is used
    /// when present and built-in defaults otherwise.
    pub fn load(&self, path: Option<&Utf8Path>) -> Result<RetryPoliciesConfig> {
        let mut config = match path {
            Some(path) => Self::load_file(path)?,
            None => match self.default_path() {
                Some(default_path) if default_path.exists() => Self::load_file(&default_path)?,
                _ => RetryPoliciesConfig::default(),
            },
        };

        Self::apply_env_overrides(&mut config)?;

        Ok(config)
    }

    /// Parse a single policy file
    pub fn load_file(path: &Utf8Path) -> Result<RetryPoliciesConfig> {
        if !path.exists() {
            return Err(Error::config_not_found(path.as_str()));
        }

        let content = fs::read_to_string(path)?;
        let config: RetryPoliciesConfig = serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))?;

        tracing::debug!(path = %path, operations = config.operations.len(), "loaded retry policies");

        Ok(config)
    }

    /// Apply `RETRIER_*` overrides to the default policy
    fn apply_env_overrides(config: &mut RetryPoliciesConfig) -> Result<()> {
        if let Some(max_attempts) = Self::env_u32(ENV_MAX_ATTEMPTS)? {
            config.default.max_attempts = max_attempts;
        }

        if let Some(log_threshold) = Self::env_u32(ENV_LOG_THRESHOLD)? {
            config.default.log_threshold = log_threshold;
        }

        Ok(())
    }

    fn env_u32(key: &str) -> Result<Option<u32>> {
        match env::var(key) {
            Ok(value) => value.trim().parse().map(Some).map_err(|_| {
                Error::invalid_config(format!(
                    "{} must be a non-negative integer, got '{}'",
                    key, value
                ))
            }),
            Err(_) => Ok(None),
        }
    }
}
