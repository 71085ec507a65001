//! Retry policy configuration types
//!
//! These types describe retry behaviour in configuration files and resolve
//! into the engine's [`RetryOptions`] and [`RetryConfig`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::backoff::{BackoffStrategy, ConstantBackoff, ExponentialBackoff, LinearBackoff};
use crate::error::{Error, Result};
use crate::retry::{Retry, RetryConfig, RetryOptions};

/// Named retry policies
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPoliciesConfig {
    /// Policy used when no operation-specific policy applies
    #[serde(default)]
    pub default: RetryPolicy,

    /// Per-operation retry policies
    #[serde(default)]
    pub operations: HashMap<String, RetryPolicy>,
}

impl RetryPoliciesConfig {
    /// Look up a policy by operation name, `None` for the default policy
    pub fn policy(&self, name: Option<&str>) -> Result<&RetryPolicy> {
        match name {
            None => Ok(&self.default),
            Some(name) => self
                .operations
                .get(name)
                .ok_or_else(|| Error::unknown_policy(name)),
        }
    }

    /// Look up a policy by operation name, falling back to the default
    pub fn policy_or_default(&self, name: &str) -> &RetryPolicy {
        self.operations.get(name).unwrap_or(&self.default)
    }
}

/// Retry policy for an operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RetryPolicy {
    /// Total attempts including the first; `0` means the engine default
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Failing attempts numbered at or above this are logged
    #[serde(default)]
    pub log_threshold: u32,

    /// Delay strategy; omitted means the engine default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff: Option<BackoffSpec>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            log_threshold: 0,
            backoff: Some(BackoffSpec::default()),
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

impl RetryPolicy {
    /// Partial options for [`Retry::new`]; unset values stay unset
    pub fn to_options(&self) -> RetryOptions {
        RetryOptions {
            max_attempts: self.max_attempts,
            backoff: self.backoff.map(|spec| spec.build()),
            log_threshold: self.log_threshold,
        }
    }

    /// Fully resolved config, suitable for [`Retry::execute_with_config`]
    pub fn to_config(&self) -> RetryConfig {
        RetryConfig::from_options(self.to_options())
    }

    /// An engine using this policy as its default
    pub fn build(&self) -> Retry {
        Retry::new(self.to_options())
    }
}

/// Backoff strategy as written in configuration
///
/// ```yaml
/// backoff:
///   kind: exponential
///   base-ms: 1000
///   max-delay-ms: 30000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "kebab-case")]
pub enum BackoffSpec {
    /// Fixed delay between attempts
    Constant { delay_ms: u64 },

    /// `base * attempt`
    Linear { base_ms: u64 },

    /// `base * 2^(attempt - 1)`, capped when `max-delay-ms` is present
    Exponential {
        base_ms: u64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_delay_ms: Option<u64>,
    },
}

impl Default for BackoffSpec {
    fn default() -> Self {
        Self::Exponential {
            base_ms: 1000,
            max_delay_ms: Some(30000),
        }
    }
}

impl BackoffSpec {
    /// Instantiate the strategy
    pub fn build(self) -> Arc<dyn BackoffStrategy> {
        match self {
            BackoffSpec::Constant { delay_ms } => {
                Arc::new(ConstantBackoff::new(Duration::from_millis(delay_ms)))
            }
            BackoffSpec::Linear { base_ms } => {
                Arc::new(LinearBackoff::new(Duration::from_millis(base_ms)))
            }
            BackoffSpec::Exponential {
                base_ms,
                max_delay_ms,
            } => {
                let backoff = ExponentialBackoff::new(Duration::from_millis(base_ms));
                match max_delay_ms {
                    Some(max) => Arc::new(backoff.with_max_delay(Duration::from_millis(max))),
                    None => Arc::new(backoff),
                }
            }
        }
    }
}
