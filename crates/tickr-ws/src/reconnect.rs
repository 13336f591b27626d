//! Reconnect backoff.
//!
//! The connection itself never reconnects. The session asks this policy how
//! long to wait before opening a replacement.

use std::time::Duration;

/// Exponential backoff with jitter.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    base_delay_ms: u64,
    max_delay_ms: u64,
    /// Maximum attempts (0 = infinite).
    max_attempts: u32,
    attempt: u32,
}

impl BackoffPolicy {
    pub fn new(base_delay_ms: u64, max_delay_ms: u64, max_attempts: u32) -> Self {
        Self {
            base_delay_ms,
            max_delay_ms,
            max_attempts,
            attempt: 0,
        }
    }

    /// Attempts made since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Forget past attempts. Called once a connection opens.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Register an attempt and return its delay, or `None` when attempts
    /// are exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.max_attempts > 0 && self.attempt >= self.max_attempts {
            return None;
        }
        self.attempt += 1;
        Some(self.delay_for(self.attempt) + Duration::from_millis(rand_jitter()))
    }

    /// Delay for an attempt, without jitter.
    ///
    /// attempt=1 -> base, attempt=2 -> 2*base, attempt=3 -> 4*base, capped
    /// at the max delay.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(10);
        let delay = self.base_delay_ms.saturating_mul(1u64 << exponent);
        Duration::from_millis(delay.min(self.max_delay_ms))
    }
}

/// Generate random jitter (0-1000ms).
fn rand_jitter() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    (nanos % 1000) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles_until_cap() {
        let policy = BackoffPolicy::new(1000, 5000, 0);
        assert_eq!(policy.delay_for(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(5000));
        assert_eq!(policy.delay_for(40), Duration::from_millis(5000));
    }

    #[test]
    fn test_next_delay_includes_bounded_jitter() {
        let mut policy = BackoffPolicy::new(100, 1000, 0);
        let delay = policy.next_delay().unwrap();
        assert!(delay >= Duration::from_millis(100));
        assert!(delay < Duration::from_millis(1100));
        assert_eq!(policy.attempt(), 1);
    }

    #[test]
    fn test_max_attempts() {
        let mut policy = BackoffPolicy::new(10, 100, 2);
        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_some());
        assert!(policy.next_delay().is_none());

        policy.reset();
        assert_eq!(policy.attempt(), 0);
        assert!(policy.next_delay().is_some());
    }

    #[test]
    fn test_unlimited_attempts() {
        let mut policy = BackoffPolicy::new(1, 1, 0);
        for _ in 0..100 {
            assert!(policy.next_delay().is_some());
        }
    }
}
