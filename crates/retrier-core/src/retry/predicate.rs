//! Retry classifiers
//!
//! A classifier decides whether a failure is transient (try again) or
//! terminal (give up immediately).

use std::fmt::Display;
use std::sync::Arc;

/// A predicate that determines whether an error should be retried
///
/// # Example
///
/// ```rust
/// use retrier_core::retry::RetryPredicate;
/// use std::io::{Error, ErrorKind};
///
/// struct IoRetryPredicate;
///
/// impl RetryPredicate<Error> for IoRetryPredicate {
///     fn should_retry(&self, error: &Error) -> bool {
///         !matches!(
///             error.kind(),
///             ErrorKind::NotFound | ErrorKind::PermissionDenied | ErrorKind::InvalidInput
///         )
///     }
/// }
/// ```
pub trait RetryPredicate<E: ?Sized>: Send + Sync {
    /// Determine whether the given error should be retried
    fn should_retry(&self, error: &E) -> bool;
}

/// Every error is retryable
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysRetry;

impl<E: ?Sized> RetryPredicate<E> for AlwaysRetry {
    fn should_retry(&self, _error: &E) -> bool {
        true
    }
}

/// No error is retryable
#[derive(Debug, Clone, Copy, Default)]
pub struct NeverRetry;

impl<E: ?Sized> RetryPredicate<E> for NeverRetry {
    fn should_retry(&self, _error: &E) -> bool {
        false
    }
}

/// A predicate backed by a closure
#[derive(Debug, Clone, Copy)]
pub struct ClosurePredicate<F> {
    predicate: F,
}

impl<F> ClosurePredicate<F> {
    pub fn new(predicate: F) -> Self {
        Self { predicate }
    }
}

impl<E: ?Sized, F> RetryPredicate<E> for ClosurePredicate<F>
where
    F: Fn(&E) -> bool + Send + Sync,
{
    fn should_retry(&self, error: &E) -> bool {
        (self.predicate)(error)
    }
}

/// Shorthand for [`ClosurePredicate::new`]
///
/// ```rust
/// use retrier_core::retry::{retry_if, RetryPredicate};
///
/// let transient = retry_if(|err: &String| err.starts_with("503"));
/// assert!(transient.should_retry(&"503 unavailable".to_string()));
/// ```
pub fn retry_if<E: ?Sized, F>(predicate: F) -> ClosurePredicate<F>
where
    F: Fn(&E) -> bool + Send + Sync,
{
    ClosurePredicate::new(predicate)
}

/// Retries errors whose message contains one of the given patterns
///
/// Matching is case-insensitive.
#[derive(Debug, Clone)]
pub struct MessagePredicate {
    retryable_patterns: Vec<String>,
}

impl MessagePredicate {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            retryable_patterns: patterns
                .into_iter()
                .map(|p| p.into().to_lowercase())
                .collect(),
        }
    }

    /// Common transient network failure messages
    pub fn network_errors() -> Self {
        Self::new([
            "timeout",
            "timed out",
            "connection reset",
            "connection refused",
            "network unreachable",
            "temporary failure",
        ])
    }

    pub fn patterns(&self) -> &[String] {
        &self.retryable_patterns
    }
}

impl<E: Display + ?Sized> RetryPredicate<E> for MessagePredicate {
    fn should_retry(&self, error: &E) -> bool {
        let message = error.to_string().to_lowercase();
        self.retryable_patterns
            .iter()
            .any(|pattern| message.contains(pattern.as_str()))
    }
}

impl<E: ?Sized, P: RetryPredicate<E> + ?Sized> RetryPredicate<E> for &P {
    fn should_retry(&self, error: &E) -> bool {
        (**self).should_retry(error)
    }
}

impl<E: ?Sized, P: RetryPredicate<E> + ?Sized> RetryPredicate<E> for Arc<P> {
    fn should_retry(&self, error: &E) -> bool {
        (**self).should_retry(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_always_and_never() {
        let error = io::Error::new(io::ErrorKind::NotFound, "not found");

        assert!(AlwaysRetry.should_retry(&error));
        assert!(!NeverRetry.should_retry(&error));
    }

    #[test]
    fn test_closure_predicate() {
        let predicate = retry_if(|err: &io::Error| {
            matches!(
                err.kind(),
                io::ErrorKind::TimedOut | io::ErrorKind::Interrupted
            )
        });

        let timeout_err = io::Error::new(io::ErrorKind::TimedOut, "timeout");
        let not_found_err = io::Error::new(io::ErrorKind::NotFound, "not found");

        assert!(predicate.should_retry(&timeout_err));
        assert!(!predicate.should_retry(&not_found_err));
    }

    #[test]
    fn test_message_predicate_is_case_insensitive() {
        let predicate = MessagePredicate::new(["Connection Reset"]);

        assert!(predicate.should_retry("CONNECTION RESET by peer"));
        assert!(!predicate.should_retry("permission denied"));
        assert_eq!(predicate.patterns(), ["connection reset".to_string()]);
    }

    #[test]
    fn test_message_predicate_network_errors() {
        let predicate = MessagePredicate::network_errors();

        let timeout_err = io::Error::new(io::ErrorKind::TimedOut, "connection timed out");
        let not_found_err = io::Error::new(io::ErrorKind::NotFound, "file not found");

        assert!(predicate.should_retry(&timeout_err));
        assert!(!predicate.should_retry(&not_found_err));
    }

    #[test]
    fn test_shared_predicate() {
        let predicate: Arc<dyn RetryPredicate<str>> = Arc::new(MessagePredicate::new(["busy"]));
        assert!(predicate.should_retry("server busy"));
    }
}
