//! Worker configuration.

use std::time::Duration;

/// Retry policy for message processing.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum retry attempts (not counting the initial attempt)
    pub max_retries: u32,
    /// Base delay for exponential backoff
    pub base_delay: Duration,
    /// Cap on a single backoff delay
    pub max_delay: Duration,
    /// When disabled, each message is processed exactly once
    pub enable_backoff: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            enable_backoff: true,
        }
    }
}

impl RetryPolicy {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_retries: std::env::var("WORKER_MAX_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
            base_delay: Duration::from_secs(
                std::env::var("WORKER_BASE_DELAY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.base_delay.as_secs()),
            ),
            max_delay: Duration::from_secs(
                std::env::var("WORKER_MAX_DELAY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(defaults.max_delay.as_secs()),
            ),
            enable_backoff: std::env::var("WORKER_ENABLE_BACKOFF")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.enable_backoff),
        }
    }

    /// Backoff delay before retry attempt `n` (1-indexed):
    /// `min(2^(n-1) * base_delay, max_delay)`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_schedule() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(60),
            enable_backoff: true,
        };

        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(8));
        assert_eq!(policy.delay_for_attempt(5), Duration::from_secs(32));
        // Capped by max_delay from attempt 6 onward.
        assert_eq!(policy.delay_for_attempt(6), Duration::from_secs(60));
        assert_eq!(policy.delay_for_attempt(30), Duration::from_secs(60));
    }

    #[test]
    fn test_first_two_retries_total_six_seconds() {
        let policy = RetryPolicy::default();
        let total = policy.delay_for_attempt(1) + policy.delay_for_attempt(2);
        assert_eq!(total, Duration::from_secs(6));
    }
}
