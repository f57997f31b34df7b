//! Bounded, jittered exponential backoff for reconnect attempts.

use std::time::Duration;

use rand::RngExt;

use aidhub_core::config::channel::ChannelConfig;

/// Reconnect pacing: exponential growth from a base delay, capped per
/// attempt and bounded in attempt count. Never retries forever.
#[derive(Debug, Clone, Copy)]
pub struct ReconnectPolicy {
    base_delay: Duration,
    max_delay: Duration,
    max_attempts: u32,
}

impl ReconnectPolicy {
    /// Create a policy from explicit bounds.
    pub fn new(base_delay: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_delay,
            max_attempts,
        }
    }

    /// Create a policy from the channel configuration.
    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(
            Duration::from_millis(config.reconnect_base_delay_ms),
            Duration::from_millis(config.reconnect_max_delay_ms),
            config.max_reconnect_attempts,
        )
    }

    /// Attempts allowed before giving up.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before reconnect attempt `attempt` (zero-based), or `None`
    /// once the attempt budget is exhausted.
    ///
    /// The delay is jittered into the upper half of the exponential step
    /// so simultaneous reconnecting clients spread out.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let base_ms = self.base_delay.as_millis() as u64;
        let step_ms = base_ms
            .saturating_mul(1u64 << attempt.min(20))
            .min(self.max_delay.as_millis() as u64)
            .max(1);
        let jittered = rand::rng().random_range(step_ms / 2..=step_ms);
        Some(Duration::from_millis(jittered.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> ReconnectPolicy {
        ReconnectPolicy::new(Duration::from_millis(100), Duration::from_secs(5), 6)
    }

    #[test]
    fn test_exhaustion_after_max_attempts() {
        let policy = policy();
        for attempt in 0..6 {
            assert!(policy.delay_for(attempt).is_some(), "attempt {attempt}");
        }
        assert!(policy.delay_for(6).is_none());
        assert!(policy.delay_for(100).is_none());
    }

    #[test]
    fn test_delays_stay_within_bounds() {
        let policy = policy();
        for attempt in 0..6 {
            let delay = policy.delay_for(attempt).unwrap();
            assert!(delay >= Duration::from_millis(1));
            assert!(delay <= Duration::from_secs(5), "attempt {attempt}: {delay:?}");
        }
    }

    #[test]
    fn test_first_delay_is_near_the_base() {
        let policy = policy();
        let delay = policy.delay_for(0).unwrap();
        assert!(delay >= Duration::from_millis(50));
        assert!(delay <= Duration::from_millis(100));
    }

    #[test]
    fn test_large_attempt_indexes_do_not_overflow() {
        let policy = ReconnectPolicy::new(Duration::from_millis(100), Duration::from_secs(30), 64);
        let delay = policy.delay_for(63).unwrap();
        assert!(delay <= Duration::from_secs(30));
    }
}
