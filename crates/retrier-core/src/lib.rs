//! # retrier-core
//!
//! Core library for retrier providing:
//! - Backoff strategies (constant, linear, exponential with ceiling)
//! - A synchronous retry execution engine with pluggable classifiers
//! - Retry observation and `tracing`-based logging
//! - Retry policy files (YAML) with environment overrides

pub mod backoff;
pub mod config;
pub mod error;
pub mod retry;
pub mod types;

pub use backoff::{BackoffStrategy, ConstantBackoff, ExponentialBackoff, LinearBackoff};
pub use config::PolicyLoader;
pub use error::{Error, Result};
pub use retry::{Retry, RetryConfig, RetryOptions};
