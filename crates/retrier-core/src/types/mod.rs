//! Type definitions for retry policy files

mod retry_policy;

pub use retry_policy::{BackoffSpec, RetryPoliciesConfig, RetryPolicy};
