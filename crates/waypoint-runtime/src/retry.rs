//! Retry policies with deterministic backoff.
//!
//! [`RetryPolicy`] describes how often, and how far apart, a failed attempt
//! is repeated. The tour's target locator uses an explicit offset schedule
//! (`[100, 300, 600, 1000, 2000]` ms after step activation), but the fixed,
//! exponential and linear strategies are available for hosts that tune it.
//!
//! # Determinism
//!
//! Backoff delays use fixed formulas (no jitter/randomness) so that tests
//! driving a virtual clock can reproduce exact timing sequences.
//!
//! # Example
//!
//! ```
//! use waypoint_runtime::retry::RetryPolicy;
//! use web_time::Duration;
//!
//! let policy = RetryPolicy::schedule([100, 300, 600]);
//!
//! assert_eq!(policy.max_retries, 3);
//! assert_eq!(policy.delay(0), Duration::from_millis(100));
//! assert_eq!(policy.delay(1), Duration::from_millis(200));
//! assert_eq!(policy.offset(2), Duration::from_millis(600));
//! ```

#![forbid(unsafe_code)]

use web_time::Duration;

/// Backoff strategy for retry delays.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum BackoffStrategy {
    /// Fixed delay between retries.
    Fixed {
        /// Delay in milliseconds.
        delay_ms: u64,
    },
    /// Exponential backoff: `base_ms * 2^attempt`, capped at `max_ms`.
    Exponential {
        /// Base delay in milliseconds.
        base_ms: u64,
        /// Maximum delay cap in milliseconds.
        max_ms: u64,
    },
    /// Linear backoff: `base_ms * (attempt + 1)`, capped at `max_ms`.
    Linear {
        /// Base delay in milliseconds.
        base_ms: u64,
        /// Maximum delay cap in milliseconds.
        max_ms: u64,
    },
    /// Explicit retry instants, in milliseconds after the first attempt.
    ///
    /// Offsets are expected to be non-decreasing; a decreasing entry yields a
    /// zero delay rather than going back in time.
    Schedule {
        /// Offsets from the first attempt, one per retry.
        offsets_ms: Vec<u64>,
    },
}

/// A retry policy with configurable attempts and backoff.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryPolicy {
    /// Maximum number of retry attempts (0 = no retries, just the initial attempt).
    pub max_retries: u32,
    /// Backoff strategy between retries.
    pub backoff: BackoffStrategy,
}

impl RetryPolicy {
    /// Create a new retry policy.
    pub fn new(max_retries: u32, backoff: BackoffStrategy) -> Self {
        Self {
            max_retries,
            backoff,
        }
    }

    /// One retry per offset, each measured from the first attempt.
    pub fn schedule(offsets_ms: impl IntoIterator<Item = u64>) -> Self {
        let offsets_ms: Vec<u64> = offsets_ms.into_iter().collect();
        Self {
            max_retries: u32::try_from(offsets_ms.len()).unwrap_or(u32::MAX),
            backoff: BackoffStrategy::Schedule { offsets_ms },
        }
    }

    /// No retries — execute once.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            backoff: BackoffStrategy::Fixed { delay_ms: 0 },
        }
    }

    /// Compute the delay before the given retry (0-indexed), measured from
    /// the previous attempt.
    pub fn delay(&self, attempt: u32) -> Duration {
        match &self.backoff {
            BackoffStrategy::Fixed { delay_ms } => Duration::from_millis(*delay_ms),
            BackoffStrategy::Exponential { base_ms, max_ms } => {
                let multiplier = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
                let delay = base_ms.saturating_mul(multiplier);
                Duration::from_millis(delay.min(*max_ms))
            }
            BackoffStrategy::Linear { base_ms, max_ms } => {
                let delay = base_ms.saturating_mul(u64::from(attempt) + 1);
                Duration::from_millis(delay.min(*max_ms))
            }
            BackoffStrategy::Schedule { offsets_ms } => {
                let idx = attempt as usize;
                let Some(&at) = offsets_ms.get(idx).or(offsets_ms.last()) else {
                    return Duration::ZERO;
                };
                let prev = match idx {
                    0 => 0,
                    _ if idx >= offsets_ms.len() => at,
                    _ => offsets_ms[idx - 1],
                };
                Duration::from_millis(at.saturating_sub(prev))
            }
        }
    }

    /// Time from the first attempt until the given retry (0-indexed) fires.
    pub fn offset(&self, attempt: u32) -> Duration {
        match &self.backoff {
            BackoffStrategy::Schedule { offsets_ms } => offsets_ms
                .get(attempt as usize)
                .or(offsets_ms.last())
                .map_or(Duration::ZERO, |ms| Duration::from_millis(*ms)),
            _ => (0..=attempt).fold(Duration::ZERO, |acc, i| acc.saturating_add(self.delay(i))),
        }
    }

    /// Total maximum delay across all retries (for timeout budgeting).
    pub fn total_max_delay(&self) -> Duration {
        match self.max_retries {
            0 => Duration::ZERO,
            n => self.offset(n - 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_backoff_constant_delay() {
        let policy = RetryPolicy::new(3, BackoffStrategy::Fixed { delay_ms: 100 });
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(1), Duration::from_millis(100));
        assert_eq!(policy.delay(2), Duration::from_millis(100));
    }

    #[test]
    fn exponential_backoff_caps_at_max() {
        let policy = RetryPolicy::new(
            5,
            BackoffStrategy::Exponential {
                base_ms: 1000,
                max_ms: 3000,
            },
        );
        assert_eq!(policy.delay(0), Duration::from_millis(1000));
        assert_eq!(policy.delay(1), Duration::from_millis(2000));
        assert_eq!(policy.delay(2), Duration::from_millis(3000)); // capped
        assert_eq!(policy.delay(3), Duration::from_millis(3000)); // capped
    }

    #[test]
    fn linear_backoff_increments() {
        let policy = RetryPolicy::new(
            4,
            BackoffStrategy::Linear {
                base_ms: 100,
                max_ms: 500,
            },
        );
        assert_eq!(policy.delay(0), Duration::from_millis(100));
        assert_eq!(policy.delay(3), Duration::from_millis(400));
        assert_eq!(policy.delay(4), Duration::from_millis(500)); // capped
    }

    #[test]
    fn schedule_delays_are_gaps_between_offsets() {
        let policy = RetryPolicy::schedule([100, 300, 600, 1000, 2000]);
        assert_eq!(policy.max_retries, 5);
        let gaps: Vec<u128> = (0..5).map(|i| policy.delay(i).as_millis()).collect();
        assert_eq!(gaps, vec![100, 200, 300, 400, 1000]);
    }

    #[test]
    fn schedule_offsets_are_absolute() {
        let policy = RetryPolicy::schedule([100, 300, 600, 1000, 2000]);
        assert_eq!(policy.offset(0), Duration::from_millis(100));
        assert_eq!(policy.offset(3), Duration::from_millis(1000));
        assert_eq!(policy.total_max_delay(), Duration::from_millis(2000));
    }

    #[test]
    fn schedule_beyond_end_does_not_panic() {
        let policy = RetryPolicy::schedule([100, 300]);
        assert_eq!(policy.delay(7), Duration::ZERO);
        assert_eq!(policy.offset(7), Duration::from_millis(300));
    }

    #[test]
    fn schedule_decreasing_offset_yields_zero_gap() {
        let policy = RetryPolicy::schedule([500, 200]);
        assert_eq!(policy.delay(1), Duration::ZERO);
    }

    #[test]
    fn empty_schedule_behaves_like_no_retry() {
        let policy = RetryPolicy::schedule(Vec::<u64>::new());
        assert_eq!(policy.max_retries, 0);
        assert_eq!(policy.delay(0), Duration::ZERO);
        assert_eq!(policy.total_max_delay(), Duration::ZERO);
    }

    #[test]
    fn total_max_delay_sums_strategy_delays() {
        let policy = RetryPolicy::new(
            3,
            BackoffStrategy::Exponential {
                base_ms: 100,
                max_ms: 10000,
            },
        );
        // Delays: 100 + 200 + 400 = 700
        assert_eq!(policy.total_max_delay(), Duration::from_millis(700));
        assert_eq!(RetryPolicy::no_retry().total_max_delay(), Duration::ZERO);
    }

    #[test]
    fn exponential_backoff_overflow_saturates() {
        let policy = RetryPolicy::new(
            1,
            BackoffStrategy::Exponential {
                base_ms: u64::MAX / 2,
                max_ms: u64::MAX,
            },
        );
        // Should not panic on overflow
        let _ = policy.delay(30);
        let _ = policy.offset(30);
    }
}
