//! Retry configuration
//!
//! [`RetryOptions`] is what callers hand to [`Retry::new`](super::Retry::new):
//! any field may be left unset and is filled from the defaults.
//! [`RetryConfig`] is the resolved form the attempt loop runs against.

use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::backoff::{BackoffStrategy, ExponentialBackoff};

/// Attempts used when none are configured
pub const DEFAULT_MAX_ATTEMPTS: NonZeroU32 = match NonZeroU32::new(3) {
    Some(n) => n,
    None => unreachable!(),
};

/// Log threshold used by [`RetryConfig::default`]: every failing attempt logs
pub const DEFAULT_LOG_THRESHOLD: u32 = 0;

/// Partially specified retry settings
///
/// Unset fields (`max_attempts == 0`, `backoff == None`) are replaced with
/// defaults when resolved. `log_threshold` is always taken as given.
#[derive(Clone, Default)]
pub struct RetryOptions {
    /// Total attempts including the first, `0` for the default
    pub max_attempts: u32,
    /// Backoff strategy, `None` for the default exponential backoff
    pub backoff: Option<Arc<dyn BackoffStrategy>>,
    /// Failing attempts numbered at or above this value are logged
    pub log_threshold: u32,
}

impl RetryOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn backoff(mut self, backoff: impl BackoffStrategy + 'static) -> Self {
        self.backoff = Some(Arc::new(backoff));
        self
    }

    pub fn shared_backoff(mut self, backoff: Arc<dyn BackoffStrategy>) -> Self {
        self.backoff = Some(backoff);
        self
    }

    pub fn log_threshold(mut self, log_threshold: u32) -> Self {
        self.log_threshold = log_threshold;
        self
    }
}

impl fmt::Debug for RetryOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryOptions")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff.as_ref().map(|b| b.to_string()))
            .field("log_threshold", &self.log_threshold)
            .finish()
    }
}

/// Fully resolved retry settings
///
/// Immutable once built. Cloning shares the backoff strategy.
#[derive(Clone)]
pub struct RetryConfig {
    max_attempts: NonZeroU32,
    backoff: Arc<dyn BackoffStrategy>,
    log_threshold: u32,
}

impl RetryConfig {
    /// Create a config from explicit values
    ///
    /// Zero attempts cannot be expressed here; use [`RetryConfig::from_options`]
    /// to resolve raw numbers with defaulting.
    pub fn new(
        max_attempts: NonZeroU32,
        backoff: impl BackoffStrategy + 'static,
        log_threshold: u32,
    ) -> Self {
        Self::with_shared_backoff(max_attempts, Arc::new(backoff), log_threshold)
    }

    /// Create a config around a backoff strategy that is already shared
    pub fn with_shared_backoff(
        max_attempts: NonZeroU32,
        backoff: Arc<dyn BackoffStrategy>,
        log_threshold: u32,
    ) -> Self {
        Self {
            max_attempts,
            backoff,
            log_threshold,
        }
    }

    /// Resolve partial options, substituting defaults for unset fields
    pub fn from_options(options: RetryOptions) -> Self {
        let max_attempts = NonZeroU32::new(options.max_attempts).unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let backoff = options
            .backoff
            .unwrap_or_else(|| Arc::new(ExponentialBackoff::default()));

        Self {
            max_attempts,
            backoff,
            log_threshold: options.log_threshold,
        }
    }

    pub fn max_attempts(&self) -> NonZeroU32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> &Arc<dyn BackoffStrategy> {
        &self.backoff
    }

    pub fn log_threshold(&self) -> u32 {
        self.log_threshold
    }
}

impl Default for RetryConfig {
    /// 3 attempts, default exponential backoff, log every failing attempt
    fn default() -> Self {
        Self::with_shared_backoff(
            DEFAULT_MAX_ATTEMPTS,
            Arc::new(ExponentialBackoff::default()),
            DEFAULT_LOG_THRESHOLD,
        )
    }
}

impl From<RetryOptions> for RetryConfig {
    fn from(options: RetryOptions) -> Self {
        Self::from_options(options)
    }
}

impl fmt::Debug for RetryConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryConfig")
            .field("max_attempts", &self.max_attempts)
            .field("backoff", &self.backoff.to_string())
            .field("log_threshold", &self.log_threshold)
            .finish()
    }
}
