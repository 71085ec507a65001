//! Retry execution engine
//!
//! [`Retry`] runs a fallible operation until it succeeds, fails with an error
//! the classifier rejects, or runs out of attempts.

use std::fmt::{self, Display};
use std::sync::Arc;

use super::config::{RetryConfig, RetryOptions};
use super::observer::{NoOpObserver, RetryObserver};
use super::predicate::RetryPredicate;
use super::sleeper::{Sleeper, ThreadSleeper};

/// A reusable retry engine
///
/// The engine holds a default [`RetryConfig`] plus the observer and sleeper
/// used by every call. It is never mutated after construction; concurrent
/// calls on one engine share nothing but read-only state.
///
/// # Example
///
/// ```rust
/// use retrier_core::backoff::LinearBackoff;
/// use retrier_core::retry::{retry_if, Retry, RetryOptions};
/// use std::time::Duration;
///
/// let retry = Retry::new(
///     RetryOptions::new()
///         .max_attempts(5)
///         .backoff(LinearBackoff::new(Duration::from_millis(1))),
/// );
///
/// let mut calls = 0;
/// let result: Result<u32, String> = retry.execute(
///     || {
///         calls += 1;
///         if calls < 3 { Err("busy".to_string()) } else { Ok(calls) }
///     },
///     retry_if(|err: &String| err == "busy"),
/// );
///
/// assert_eq!(result, Ok(3));
/// ```
pub struct Retry<O = NoOpObserver> {
    config: RetryConfig,
    observer: O,
    sleeper: Arc<dyn Sleeper>,
}

impl Retry<NoOpObserver> {
    /// Create an engine from partially specified options
    ///
    /// Default values are used for any field not explicitly set:
    ///
    /// - `max_attempts`: 3 when `0`
    /// - `backoff`: [`ExponentialBackoff::default`](crate::backoff::ExponentialBackoff) when `None`
    /// - `log_threshold`: always taken as given
    pub fn new(options: RetryOptions) -> Self {
        Self::from_config(RetryConfig::from_options(options))
    }

    /// Create an engine around an already resolved config
    pub fn from_config(config: RetryConfig) -> Self {
        Self {
            config,
            observer: NoOpObserver,
            sleeper: Arc::new(ThreadSleeper),
        }
    }
}

impl Default for Retry<NoOpObserver> {
    /// 3 attempts, default exponential backoff, every failing attempt logged
    fn default() -> Self {
        Self::from_config(RetryConfig::default())
    }
}

impl<O> Retry<O> {
    /// Replace the observer that receives failure events
    pub fn with_observer<O2>(self, observer: O2) -> Retry<O2> {
        Retry {
            config: self.config,
            observer,
            sleeper: self.sleeper,
        }
    }

    /// Replace the sleeper used between attempts
    pub fn with_sleeper(self, sleeper: impl Sleeper + 'static) -> Self {
        self.with_shared_sleeper(Arc::new(sleeper))
    }

    pub fn with_shared_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// The engine's default configuration
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }
}

impl<O: RetryObserver> Retry<O> {
    /// Run `op` under the engine's default configuration
    ///
    /// Returns the first success, the first error `classifier` rejects, or
    /// the error from the final attempt once all attempts have failed.
    pub fn execute<T, E, F, P>(&self, op: F, classifier: P) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        P: RetryPredicate<E>,
        E: Display,
    {
        self.run(&self.config, op, classifier)
    }

    /// Run `op` under a caller-supplied configuration
    ///
    /// `config` is used exactly as given and is not merged with the engine's
    /// default. The engine's observer and sleeper still apply.
    pub fn execute_with_config<T, E, F, P>(
        &self,
        op: F,
        classifier: P,
        config: &RetryConfig,
    ) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        P: RetryPredicate<E>,
        E: Display,
    {
        self.run(config, op, classifier)
    }

    fn run<T, E, F, P>(&self, config: &RetryConfig, mut op: F, classifier: P) -> Result<T, E>
    where
        F: FnMut() -> Result<T, E>,
        P: RetryPredicate<E>,
        E: Display,
    {
        let max_attempts = config.max_attempts().get();
        let mut attempt = 1u32;

        loop {
            let err = match op() {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !classifier.should_retry(&err) {
                return Err(err);
            }

            if attempt >= config.log_threshold() {
                self.observer.on_attempt_failed(attempt, &err);
            }

            if attempt >= max_attempts {
                self.observer.on_exhausted(max_attempts, &err);
                return Err(err);
            }

            self.sleeper.sleep(config.backoff().compute_delay(attempt));
            attempt += 1;
        }
    }
}

impl<O: fmt::Debug> fmt::Debug for Retry<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Retry")
            .field("config", &self.config)
            .field("observer", &self.observer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backoff::ConstantBackoff;
    use crate::retry::observer::RecordingObserver;
    use crate::retry::predicate::{AlwaysRetry, NeverRetry};
    use crate::retry::sleeper::RecordingSleeper;
    use std::io;
    use std::num::NonZeroU32;
    use std::time::Duration;

    fn quick_retry(max_attempts: u32) -> (Retry<Arc<RecordingObserver>>, Arc<RecordingSleeper>) {
        let observer = Arc::new(RecordingObserver::new());
        let sleeper = Arc::new(RecordingSleeper::new());
        let retry = Retry::new(
            RetryOptions::new()
                .max_attempts(max_attempts)
                .backoff(ConstantBackoff::new(Duration::from_millis(10))),
        )
        .with_observer(observer.clone())
        .with_shared_sleeper(sleeper.clone());
        (retry, sleeper)
    }

    #[test]
    fn test_immediate_success() {
        let (retry, sleeper) = quick_retry(3);
        let mut calls = 0;

        let result: Result<&str, io::Error> = retry.execute(
            || {
                calls += 1;
                Ok("success")
            },
            AlwaysRetry,
        );

        assert_eq!(result.unwrap(), "success");
        assert_eq!(calls, 1);
        assert!(sleeper.delays().is_empty());
        assert!(retry.observer().is_empty());
    }

    #[test]
    fn test_non_retryable_error_returns_immediately() {
        let (retry, sleeper) = quick_retry(5);
        let mut calls = 0;

        let result: Result<(), io::Error> = retry.execute(
            || {
                calls += 1;
                Err(io::Error::new(io::ErrorKind::NotFound, "not found"))
            },
            NeverRetry,
        );

        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::NotFound);
        assert_eq!(calls, 1);
        assert!(sleeper.delays().is_empty());
        assert!(retry.observer().is_empty());
    }

    #[test]
    fn test_exhaustion_returns_last_error() {
        let (retry, sleeper) = quick_retry(3);
        let mut calls = 0;

        let result: Result<(), String> = retry.execute(
            || {
                calls += 1;
                Err(format!("failure #{}", calls))
            },
            AlwaysRetry,
        );

        assert_eq!(result.unwrap_err(), "failure #3");
        assert_eq!(calls, 3);
        assert_eq!(sleeper.delays().len(), 2);
        assert_eq!(retry.observer().warned_attempts(), vec![1, 2, 3]);
        assert_eq!(retry.observer().exhaustions(), 1);
    }

    #[test]
    fn test_single_attempt_never_sleeps() {
        let (retry, sleeper) = quick_retry(1);

        let result: Result<(), &str> = retry.execute(|| Err("down"), AlwaysRetry);

        assert_eq!(result, Err("down"));
        assert!(sleeper.delays().is_empty());
        assert_eq!(retry.observer().exhaustions(), 1);
    }

    #[test]
    fn test_override_config_is_not_merged() {
        let (retry, sleeper) = quick_retry(10);
        let override_config = RetryConfig::new(
            NonZeroU32::new(2).unwrap(),
            ConstantBackoff::new(Duration::from_millis(99)),
            5,
        );
        let mut calls = 0;

        let result: Result<(), &str> = retry.execute_with_config(
            || {
                calls += 1;
                Err("down")
            },
            AlwaysRetry,
            &override_config,
        );

        assert_eq!(result, Err("down"));
        assert_eq!(calls, 2);
        assert_eq!(sleeper.delays(), vec![Duration::from_millis(99)]);
        // threshold 5 is never reached with two attempts
        assert!(retry.observer().warned_attempts().is_empty());
        assert_eq!(retry.observer().exhaustions(), 1);
        // the engine default is untouched
        assert_eq!(retry.config().max_attempts().get(), 10);
    }

    #[test]
    fn test_default_engine() {
        let retry = Retry::default();
        assert_eq!(retry.config().max_attempts().get(), 3);
        assert_eq!(retry.config().log_threshold(), 0);
        assert_eq!(
            retry.config().backoff().to_string(),
            "exponential(1s, max 30s)"
        );
    }
}
