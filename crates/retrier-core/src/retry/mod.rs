//! Retry execution engine
//!
//! This module provides a synchronous retry engine driven by a pluggable
//! [`BackoffStrategy`](crate::backoff::BackoffStrategy).
//!
//! # Features
//!
//! - Two entry points: engine default config and per-call override config
//! - Partial options merged with defaults at construction
//! - Caller-supplied classifiers via the `RetryPredicate` trait
//! - Observable failures via the `RetryObserver` trait, with a built-in
//!   `TracingObserver` for logging
//! - Injectable `Sleeper` so the backoff schedule can be asserted in tests
//!
//! # Example
//!
//! ```rust
//! use retrier_core::retry::{Retry, MessagePredicate, TracingObserver};
//!
//! let retry = Retry::default().with_observer(TracingObserver::new("load"));
//!
//! let result = retry.execute(
//!     || std::fs::read_to_string("Cargo.toml"),
//!     MessagePredicate::network_errors(),
//! );
//! ```

mod config;
mod engine;
mod observer;
mod predicate;
mod sleeper;

pub use config::{RetryConfig, RetryOptions, DEFAULT_LOG_THRESHOLD, DEFAULT_MAX_ATTEMPTS};
pub use engine::Retry;
pub use observer::{NoOpObserver, RecordingObserver, RetryEvent, RetryObserver, TracingObserver};
pub use predicate::{
    retry_if, AlwaysRetry, ClosurePredicate, MessagePredicate, NeverRetry, RetryPredicate,
};
pub use sleeper::{RecordingSleeper, Sleeper, ThreadSleeper};
