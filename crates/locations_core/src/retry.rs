use std::time::Duration;

pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

/// Bounded exponential backoff for resubmitting unprocessed batch items.
///
/// Attempt 1 is the initial submission. Retry `n` waits
/// `base_delay * 2^(n-1)` before resubmitting, so delays strictly increase
/// and the total wait is bounded by the attempt count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRetryPolicy {
    #[error("max_attempts must be at least 1")]
    ZeroAttempts,
    #[error("base_delay must be greater than zero")]
    ZeroBaseDelay,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Result<Self, InvalidRetryPolicy> {
        if max_attempts == 0 {
            return Err(InvalidRetryPolicy::ZeroAttempts);
        }
        if base_delay.is_zero() {
            return Err(InvalidRetryPolicy::ZeroBaseDelay);
        }
        Ok(Self {
            max_attempts,
            base_delay,
        })
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Delay to wait before the given retry (1-based). Saturates instead of
    /// overflowing for absurd attempt counts.
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(Duration::MAX)
    }

    /// Upper bound on time spent sleeping across all retries.
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts)
            .map(|retry| self.delay_before_retry(retry))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_attempts() {
        assert_eq!(
            RetryPolicy::new(0, Duration::from_millis(10)),
            Err(InvalidRetryPolicy::ZeroAttempts)
        );
    }

    #[test]
    fn rejects_zero_base_delay() {
        assert_eq!(
            RetryPolicy::new(5, Duration::ZERO),
            Err(InvalidRetryPolicy::ZeroBaseDelay)
        );
    }

    #[test]
    fn smallest_base_delay_still_strictly_increases() {
        let policy = RetryPolicy::new(5, Duration::from_nanos(1)).expect("valid policy");
        let delays: Vec<Duration> = (1..policy.max_attempts())
            .map(|retry| policy.delay_before_retry(retry))
            .collect();

        assert!(delays.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn delays_double_per_retry() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100)).expect("valid policy");
        let delays: Vec<Duration> = (1..policy.max_attempts())
            .map(|retry| policy.delay_before_retry(retry))
            .collect();

        assert_eq!(
            delays,
            vec![
                Duration::from_millis(100),
                Duration::from_millis(200),
                Duration::from_millis(400),
                Duration::from_millis(800),
            ]
        );
        assert!(delays.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn total_backoff_sums_every_retry_delay() {
        let policy = RetryPolicy::new(4, Duration::from_millis(50)).expect("valid policy");
        assert_eq!(policy.total_backoff(), Duration::from_millis(50 + 100 + 200));
    }

    #[test]
    fn single_attempt_never_waits() {
        let policy = RetryPolicy::new(1, Duration::from_secs(1)).expect("valid policy");
        assert_eq!(policy.total_backoff(), Duration::ZERO);
    }

    #[test]
    fn large_retry_numbers_saturate() {
        let policy = RetryPolicy::new(u32::MAX, Duration::from_secs(u64::MAX / 2))
            .expect("valid policy");
        assert_eq!(policy.delay_before_retry(40), Duration::MAX);
    }
}
