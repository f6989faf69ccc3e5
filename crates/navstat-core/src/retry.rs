//! Bounded retry policy with uniformly jittered delays.

use std::time::Duration;

use crate::config::{MAX_FETCH_ATTEMPTS, MAX_RETRY_DELAY, MIN_RETRY_DELAY};

/// Errors that can tell whether another attempt may succeed.
pub trait Retryable {
    fn retryable(&self) -> bool;
}

/// How many times a call is attempted and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    max_attempts: u32,
    min_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_FETCH_ATTEMPTS, MIN_RETRY_DELAY, MAX_RETRY_DELAY)
    }
}

impl RetryPolicy {
    /// Bounds are reordered if given backwards; zero attempts means one.
    pub fn new(max_attempts: u32, min_delay: Duration, max_delay: Duration) -> Self {
        let (min_delay, max_delay) = if min_delay <= max_delay {
            (min_delay, max_delay)
        } else {
            (max_delay, min_delay)
        };

        Self {
            max_attempts: max_attempts.max(1),
            min_delay,
            max_delay,
        }
    }

    /// Same attempt cap, no waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO, Duration::ZERO)
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub const fn delay_bounds(&self) -> (Duration, Duration) {
        (self.min_delay, self.max_delay)
    }

    /// Random delay drawn uniformly from `[min_delay, max_delay]`.
    pub fn delay(&self) -> Duration {
        let spread = self.max_delay - self.min_delay;
        if spread.is_zero() {
            return self.min_delay;
        }
        self.min_delay + spread.mul_f64(fastrand::f64())
    }

    /// Whether a failure on the 1-based `attempt` earns another try.
    pub fn should_retry<E: Retryable>(&self, attempt: u32, error: &E) -> bool {
        error.retryable() && attempt < self.max_attempts
    }
}
