//! Retry policy and shared backoff state.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Exponential backoff with a bounded number of attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Requests per operation, first try included.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    /// Policy that retries up to `max_attempts` times without waiting.
    #[must_use]
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based).
    ///
    /// Doubles with every retry, capped at `max_delay`.
    #[must_use]
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 2u32.saturating_pow(retry.saturating_sub(1));
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Longest pause a single [`BackoffGate::defer`] can impose.
const MAX_PAUSE: Duration = Duration::from_secs(24 * 60 * 60);

/// Backoff deadline shared by every request of a build.
///
/// A transient failure on one branch pauses all branches, so concurrent
/// fetches do not keep hammering a rate-limited API.
#[derive(Debug, Default)]
pub struct BackoffGate {
    resume_at: Mutex<Option<Instant>>,
}

impl BackoffGate {
    /// Create an open gate.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Block the current thread until the gate is open.
    pub fn wait(&self) {
        let resume_at = *self.resume_at.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(resume_at) = resume_at {
            let now = Instant::now();
            if resume_at > now {
                std::thread::sleep(resume_at - now);
            }
        }
    }

    /// Keep the gate closed for at least `delay` from now.
    ///
    /// Never moves an existing deadline earlier. Delays longer than a day are
    /// clamped to a day.
    pub fn defer(&self, delay: Duration) {
        let until = Instant::now() + delay.min(MAX_PAUSE);
        let mut resume_at = self.resume_at.lock().unwrap_or_else(PoisonError::into_inner);
        if resume_at.is_none_or(|current| current < until) {
            *resume_at = Some(until);
        }
    }

    /// Time left until the gate opens.
    pub fn remaining(&self) -> Duration {
        self.resume_at
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|resume_at| resume_at.saturating_duration_since(Instant::now()))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles_until_cap() {
        let policy = RetryPolicy {
            max_attempts: 10,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(1000),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for(4), Duration::from_millis(800));
        assert_eq!(policy.delay_for(5), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(40), Duration::from_millis(1000));
    }

    #[test]
    fn test_immediate_policy_never_waits() {
        let policy = RetryPolicy::immediate(3);
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.delay_for(1), Duration::ZERO);
        assert_eq!(policy.delay_for(7), Duration::ZERO);
    }

    #[test]
    fn test_gate_starts_open() {
        let gate = BackoffGate::new();
        assert_eq!(gate.remaining(), Duration::ZERO);
        gate.wait();
    }

    #[test]
    fn test_gate_defer_never_shortens() {
        let gate = BackoffGate::new();
        gate.defer(Duration::from_secs(60));
        gate.defer(Duration::from_millis(1));
        assert!(gate.remaining() > Duration::from_secs(30));
    }

    #[test]
    fn test_gate_clamps_huge_delay() {
        let gate = BackoffGate::new();
        gate.defer(Duration::MAX);
        assert!(gate.remaining() <= MAX_PAUSE);
        assert!(gate.remaining() > MAX_PAUSE - Duration::from_secs(60));
    }

    #[test]
    fn test_gate_wait_sleeps_until_deadline() {
        let gate = BackoffGate::new();
        gate.defer(Duration::from_millis(20));
        let started = Instant::now();
        gate.wait();
        assert!(started.elapsed() >= Duration::from_millis(15));
        assert_eq!(gate.remaining(), Duration::ZERO);
    }
}
