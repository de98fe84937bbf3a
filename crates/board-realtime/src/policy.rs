//! Reconnect backoff.

use std::time::Duration;

const BACKOFF_FACTOR: f64 = 1.5;

/// Bounded geometric backoff: `base * 1.5^(attempt - 1)` for attempts
/// `1..=max_attempts`, then nothing.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    attempts: u32,
    max_attempts: u32,
    base_interval: Duration,
}

impl ReconnectPolicy {
    pub fn new(max_attempts: u32, base_interval: Duration) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            base_interval,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the given 1-based attempt, rounded to the millisecond.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1) as i32;
        let millis = self.base_interval.as_millis() as f64 * BACKOFF_FACTOR.powi(exponent);
        Duration::from_millis(millis.round() as u64)
    }

    /// Consume one attempt and return its delay, or `None` once the budget
    /// is spent.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.delay_for_attempt(self.attempts))
    }

    /// Called on every successful connection.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn millis(policy: &mut ReconnectPolicy) -> Vec<u64> {
        std::iter::from_fn(|| policy.next_delay())
            .map(|delay| delay.as_millis() as u64)
            .collect()
    }

    #[test]
    fn test_default_schedule() {
        let mut policy = ReconnectPolicy::new(5, Duration::from_millis(3000));
        assert_eq!(millis(&mut policy), vec![3000, 4500, 6750, 10125, 15188]);
        assert_eq!(policy.attempts(), 5);
        assert_eq!(policy.next_delay(), None);
    }

    #[test]
    fn test_reset_restarts_schedule() {
        let mut policy = ReconnectPolicy::new(5, Duration::from_millis(3000));
        policy.next_delay();
        policy.next_delay();
        policy.reset();

        assert_eq!(policy.attempts(), 0);
        assert_eq!(policy.next_delay(), Some(Duration::from_millis(3000)));
    }

    #[test]
    fn test_zero_attempts_never_reconnects() {
        let mut policy = ReconnectPolicy::new(0, Duration::from_millis(3000));
        assert_eq!(policy.next_delay(), None);
        assert_eq!(policy.attempts(), 0);
    }
}
