//! Retry observation and logging
//!
//! The engine reports failures through a [`RetryObserver`] injected at
//! construction rather than a process-wide logger. [`TracingObserver`] logs
//! through the `tracing` crate; [`NoOpObserver`] is the default.

use std::fmt::Display;
use std::sync::Mutex;

/// Observer for retry failure events
///
/// Observers are purely observational: nothing they do changes what the
/// engine returns.
///
/// # Example
///
/// ```rust
/// use retrier_core::retry::RetryObserver;
/// use std::fmt::Display;
///
/// struct StderrObserver;
///
/// impl RetryObserver for StderrObserver {
///     fn on_attempt_failed(&self, attempt: u32, error: &dyn Display) {
///         eprintln!("attempt {} failed: {}", attempt, error);
///     }
///
///     fn on_exhausted(&self, attempts: u32, error: &dyn Display) {
///         eprintln!("gave up after {} attempts: {}", attempts, error);
///     }
/// }
/// ```
pub trait RetryObserver: Send + Sync {
    /// Called when a retryable failure is at or above the log threshold
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt number that failed (1-indexed)
    /// * `error` - The error from that attempt
    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display);

    /// Called once when every attempt failed with a retryable error
    ///
    /// # Arguments
    ///
    /// * `attempts` - Total number of attempts made
    /// * `error` - The error from the final attempt
    fn on_exhausted(&self, attempts: u32, error: &dyn Display);
}

/// An observer that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl RetryObserver for NoOpObserver {
    fn on_attempt_failed(&self, _attempt: u32, _error: &dyn Display) {}

    fn on_exhausted(&self, _attempts: u32, _error: &dyn Display) {}
}

/// An observer that logs retry events using the `tracing` crate
///
/// # Log Levels
///
/// - `on_attempt_failed`: WARN
/// - `on_exhausted`: ERROR
///
/// # Example
///
/// ```rust
/// use retrier_core::retry::{Retry, TracingObserver};
///
/// let retry = Retry::default().with_observer(TracingObserver::new("fetch-index"));
/// ```
#[derive(Debug, Clone)]
pub struct TracingObserver {
    /// Name of the operation being retried (for log context)
    operation: String,
}

impl TracingObserver {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }
}

impl Default for TracingObserver {
    fn default() -> Self {
        Self::new("retry")
    }
}

impl RetryObserver for TracingObserver {
    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display) {
        tracing::warn!(
            operation = %self.operation,
            attempt = attempt,
            error = %error,
            "retry attempt failed"
        );
    }

    fn on_exhausted(&self, attempts: u32, error: &dyn Display) {
        tracing::error!(
            operation = %self.operation,
            attempts = attempts,
            error = %error,
            "all retry attempts failed"
        );
    }
}

/// An event captured by [`RecordingObserver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryEvent {
    /// A warning-level attempt failure
    AttemptFailed { attempt: u32, error: String },
    /// The terminal error-level record
    Exhausted { attempts: u32, error: String },
}

/// An observer that keeps every event in memory
///
/// Useful for tests and for callers that want to report retry history
/// themselves.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<RetryEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events so far, oldest first
    pub fn events(&self) -> Vec<RetryEvent> {
        self.lock().clone()
    }

    /// Attempt numbers that produced a warning
    pub fn warned_attempts(&self) -> Vec<u32> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                RetryEvent::AttemptFailed { attempt, .. } => Some(*attempt),
                RetryEvent::Exhausted { .. } => None,
            })
            .collect()
    }

    pub fn exhaustions(&self) -> usize {
        self.lock()
            .iter()
            .filter(|event| matches!(event, RetryEvent::Exhausted { .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<RetryEvent>> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RetryObserver for RecordingObserver {
    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display) {
        self.lock().push(RetryEvent::AttemptFailed {
            attempt,
            error: error.to_string(),
        });
    }

    fn on_exhausted(&self, attempts: u32, error: &dyn Display) {
        self.lock().push(RetryEvent::Exhausted {
            attempts,
            error: error.to_string(),
        });
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for std::sync::Arc<T> {
    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display) {
        (**self).on_attempt_failed(attempt, error)
    }

    fn on_exhausted(&self, attempts: u32, error: &dyn Display) {
        (**self).on_exhausted(attempts, error)
    }
}

impl<T: RetryObserver + ?Sized> RetryObserver for Box<T> {
    fn on_attempt_failed(&self, attempt: u32, error: &dyn Display) {
        (**self).on_attempt_failed(attempt, error)
    }

    fn on_exhausted(&self, attempts: u32, error: &dyn Display) {
        (**self).on_exhausted(attempts, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Arc;

    #[test]
    fn test_noop_observer() {
        let observer = NoOpObserver;
        let error = io::Error::other("test");

        observer.on_attempt_failed(1, &error);
        observer.on_exhausted(3, &error);
    }

    #[test]
    fn test_recording_observer() {
        let observer = RecordingObserver::new();
        let error = io::Error::other("boom");

        observer.on_attempt_failed(1, &error);
        observer.on_attempt_failed(2, &error);
        observer.on_exhausted(2, &error);

        assert_eq!(observer.warned_attempts(), vec![1, 2]);
        assert_eq!(observer.exhaustions(), 1);
        assert_eq!(
            observer.events().last(),
            Some(&RetryEvent::Exhausted {
                attempts: 2,
                error: "boom".to_string()
            })
        );
    }

    #[test]
    fn test_tracing_observer_creation() {
        let observer = TracingObserver::new("download");
        assert_eq!(observer.operation(), "download");
        assert_eq!(TracingObserver::default().operation(), "retry");
    }

    #[test]
    fn test_arc_observer() {
        let observer = Arc::new(RecordingObserver::new());
        let shared: Arc<dyn RetryObserver> = observer.clone();

        shared.on_attempt_failed(4, &"late failure");

        assert_eq!(observer.warned_attempts(), vec![4]);
    }
}
