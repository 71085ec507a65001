//! Backoff strategies
//!
//! A backoff strategy maps the number of the attempt that just failed to the
//! time to wait before the next one. Strategies hold no mutable state, so a
//! single instance can be shared by any number of concurrent retry calls.

use std::fmt;
use std::time::Duration;

/// Default base unit for every stock strategy
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Default ceiling for [`ExponentialBackoff`]
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(30);

/// Computes the delay before the next attempt
///
/// `attempt` is the 1-based number of the attempt that just failed. The retry
/// engine never passes `0`; the stock strategies treat `0` like `1`.
///
/// Implementations must be pure: the same attempt always yields the same
/// delay for a given instance.
///
/// # Example
///
/// ```rust
/// use retrier_core::backoff::{BackoffStrategy, LinearBackoff};
/// use std::time::Duration;
///
/// let backoff = LinearBackoff::new(Duration::from_millis(100));
/// assert_eq!(backoff.compute_delay(3), Duration::from_millis(300));
/// ```
pub trait BackoffStrategy: fmt::Debug + fmt::Display + Send + Sync {
    /// Delay to wait after `attempt` failed
    fn compute_delay(&self, attempt: u32) -> Duration;
}

/// Waits the same duration after every attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantBackoff {
    delay: Duration,
}

impl ConstantBackoff {
    /// Create a constant backoff with the given delay
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

impl Default for ConstantBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY)
    }
}

impl BackoffStrategy for ConstantBackoff {
    fn compute_delay(&self, _attempt: u32) -> Duration {
        self.delay
    }
}

impl fmt::Display for ConstantBackoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "constant({:?})", self.delay)
    }
}

/// Waits `base * attempt`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinearBackoff {
    base: Duration,
}

impl LinearBackoff {
    /// Create a linear backoff growing by `base` per attempt
    pub fn new(base: Duration) -> Self {
        Self { base }
    }

    pub fn base(&self) -> Duration {
        self.base
    }
}

impl Default for LinearBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY)
    }
}

impl BackoffStrategy for LinearBackoff {
    fn compute_delay(&self, attempt: u32) -> Duration {
        self.base.saturating_mul(attempt.max(1))
    }
}

impl fmt::Display for LinearBackoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "linear({:?})", self.base)
    }
}

/// Waits `base * 2^(attempt - 1)`, optionally capped at `max_delay`
///
/// The delay is computed exactly in nanoseconds and only clamps to
/// [`Duration::MAX`] once it no longer fits, so the sequence of delays never
/// decreases even for very large attempt numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExponentialBackoff {
    base: Duration,
    max_delay: Option<Duration>,
}

impl ExponentialBackoff {
    /// Create an uncapped exponential backoff
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            max_delay: None,
        }
    }

    /// Cap every computed delay at `max_delay`
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = Some(max_delay);
        self
    }

    /// Remove the ceiling
    pub fn uncapped(mut self) -> Self {
        self.max_delay = None;
        self
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }
}

impl Default for ExponentialBackoff {
    /// 1 second base, 30 second ceiling
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY).with_max_delay(DEFAULT_MAX_DELAY)
    }
}

impl BackoffStrategy for ExponentialBackoff {
    fn compute_delay(&self, attempt: u32) -> Duration {
        let delay = if self.base.is_zero() {
            Duration::ZERO
        } else {
            let exponent = attempt.saturating_sub(1);
            1u128
                .checked_shl(exponent)
                .and_then(|factor| self.base.as_nanos().checked_mul(factor))
                .map_or(Duration::MAX, duration_from_nanos)
        };

        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }
}

fn duration_from_nanos(nanos: u128) -> Duration {
    const NANOS_PER_SEC: u128 = 1_000_000_000;

    match u64::try_from(nanos / NANOS_PER_SEC) {
        Ok(secs) => Duration::new(secs, (nanos % NANOS_PER_SEC) as u32),
        Err(_) => Duration::MAX,
    }
}

impl fmt::Display for ExponentialBackoff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_delay {
            Some(cap) => write!(f, "exponential({:?}, max {:?})", self.base, cap),
            None => write!(f, "exponential({:?})", self.base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_ignores_attempt() {
        let backoff = ConstantBackoff::new(Duration::from_millis(250));

        for attempt in 1..=10 {
            assert_eq!(backoff.compute_delay(attempt), Duration::from_millis(250));
        }
    }

    #[test]
    fn test_linear_is_arithmetic() {
        let backoff = LinearBackoff::new(Duration::from_millis(100));

        for attempt in 1..=20 {
            let delta = backoff.compute_delay(attempt + 1) - backoff.compute_delay(attempt);
            assert_eq!(delta, Duration::from_millis(100));
        }
        assert_eq!(backoff.compute_delay(1), Duration::from_millis(100));
    }

    #[test]
    fn test_exponential_doubles() {
        let backoff = ExponentialBackoff::new(Duration::from_millis(100));

        assert_eq!(backoff.compute_delay(1), Duration::from_millis(100)); // 100 * 2^0
        assert_eq!(backoff.compute_delay(2), Duration::from_millis(200)); // 100 * 2^1
        assert_eq!(backoff.compute_delay(3), Duration::from_millis(400)); // 100 * 2^2
        assert_eq!(backoff.compute_delay(4), Duration::from_millis(800)); // 100 * 2^3
    }

    #[test]
    fn test_exponential_cap() {
        let backoff =
            ExponentialBackoff::new(Duration::from_secs(1)).with_max_delay(Duration::from_secs(5));

        assert_eq!(backoff.compute_delay(3), Duration::from_secs(4));
        assert_eq!(backoff.compute_delay(4), Duration::from_secs(5));
        assert_eq!(backoff.compute_delay(30), Duration::from_secs(5));
    }

    #[test]
    fn test_exponential_is_monotonic_without_cap() {
        let backoff = ExponentialBackoff::new(Duration::from_millis(1));

        let mut previous = Duration::ZERO;
        for attempt in (1..=200).chain([u32::MAX - 1, u32::MAX]) {
            let delay = backoff.compute_delay(attempt);
            assert!(delay >= previous, "attempt {} went backwards", attempt);
            previous = delay;
        }
    }

    #[test]
    fn test_exponential_keeps_doubling_past_32_attempts() {
        let backoff = ExponentialBackoff::new(Duration::from_nanos(1));

        assert_eq!(backoff.compute_delay(33), Duration::from_nanos(1 << 32));
        assert_eq!(backoff.compute_delay(34), Duration::from_nanos(1 << 33));
        assert_eq!(backoff.compute_delay(40), Duration::from_nanos(1 << 39));
        assert_eq!(backoff.compute_delay(64), Duration::from_nanos(1 << 63));
    }

    #[test]
    fn test_exponential_clamps_to_duration_max() {
        let backoff = ExponentialBackoff::new(Duration::from_secs(1));

        assert_eq!(backoff.compute_delay(200), Duration::MAX);
        assert_eq!(backoff.compute_delay(u32::MAX), Duration::MAX);
        assert_eq!(
            backoff
                .with_max_delay(Duration::from_secs(60))
                .compute_delay(u32::MAX),
            Duration::from_secs(60)
        );
    }

    #[test]
    fn test_exponential_zero_base_stays_zero() {
        let backoff = ExponentialBackoff::new(Duration::ZERO);

        assert_eq!(backoff.compute_delay(1), Duration::ZERO);
        assert_eq!(backoff.compute_delay(u32::MAX), Duration::ZERO);
    }

    #[test]
    fn test_attempt_zero_does_not_panic() {
        assert_eq!(
            ExponentialBackoff::new(Duration::from_secs(1)).compute_delay(0),
            Duration::from_secs(1)
        );
        assert_eq!(
            LinearBackoff::new(Duration::from_secs(1)).compute_delay(0),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn test_defaults() {
        let exp = ExponentialBackoff::default();
        assert_eq!(exp.base(), DEFAULT_BASE_DELAY);
        assert_eq!(exp.max_delay(), Some(DEFAULT_MAX_DELAY));
        assert_eq!(LinearBackoff::default().base(), DEFAULT_BASE_DELAY);
        assert_eq!(ConstantBackoff::default().delay(), DEFAULT_BASE_DELAY);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            ExponentialBackoff::default().to_string(),
            "exponential(1s, max 30s)"
        );
        assert_eq!(
            LinearBackoff::new(Duration::from_millis(500)).to_string(),
            "linear(500ms)"
        );
        assert_eq!(ConstantBackoff::default().to_string(), "constant(1s)");
    }
}
