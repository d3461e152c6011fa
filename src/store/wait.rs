//! Bounded polling until the store answers.

use std::thread;
use std::time::Duration;

use crate::error::{OnboardError, Result};

use super::{Health, SecretStoreClient};

/// How long to keep polling an unreachable store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of health checks.
    pub attempts: u32,
    /// Pause between checks.
    pub interval: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 30,
            interval: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A policy with a custom attempt count and interval.
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            interval,
        }
    }

    /// Total time spent waiting if every attempt fails.
    pub fn max_wait(&self) -> Duration {
        self.interval * self.attempts.saturating_sub(1)
    }
}

/// Poll `store` until its health check answers.
///
/// A sealed or uninitialized store counts as reachable. `on_attempt` is called
/// before each retry with the attempt number, for progress display.
pub fn wait_until_reachable(
    store: &dyn SecretStoreClient,
    policy: &RetryPolicy,
    mut on_attempt: impl FnMut(u32),
) -> Result<Health> {
    let mut last_error = None;

    for attempt in 1..=policy.attempts {
        match store.health() {
            Ok(health) => {
                tracing::debug!("{} reachable after {} attempt(s)", store.describe(), attempt);
                return Ok(health);
            }
            Err(e) => {
                tracing::debug!("health check {}/{} failed: {}", attempt, policy.attempts, e);
                last_error = Some(e);
            }
        }

        if attempt < policy.attempts {
            on_attempt(attempt);
            thread::sleep(policy.interval);
        }
    }

    Err(OnboardError::Connectivity {
        addr: store.describe(),
        message: format!(
            "no answer after {} attempts{}",
            policy.attempts,
            last_error
                .map(|e| format!(" (last error: {})", e))
                .unwrap_or_default()
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::cell::Cell;

    /// Store that fails a fixed number of health checks before answering.
    struct FlakyStore {
        failures_left: Cell<u32>,
        calls: Cell<u32>,
    }

    impl SecretStoreClient for FlakyStore {
        fn describe(&self) -> String {
            "flaky".to_string()
        }

        fn health(&self) -> Result<Health> {
            self.calls.set(self.calls.get() + 1);
            if self.failures_left.get() > 0 {
                self.failures_left.set(self.failures_left.get() - 1);
                return Err(OnboardError::Connectivity {
                    addr: "flaky".into(),
                    message: "refused".into(),
                });
            }
            Ok(Health::default())
        }

        fn put_secret(&self, _: &str, _: &str, _: &str) -> Result<()> {
            Ok(())
        }

        fn list_keys(&self, _: &str) -> Result<Vec<String>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn default_policy_is_30_attempts_2_seconds() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts, 30);
        assert_eq!(policy.interval, Duration::from_secs(2));
        assert_eq!(policy.max_wait(), Duration::from_secs(58));
    }

    #[test]
    fn zero_attempts_becomes_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts, 1);
    }

    #[test]
    fn returns_immediately_when_reachable() {
        let store = MemoryStore::new();
        let mut retries = 0;
        let health = wait_until_reachable(&store, &RetryPolicy::new(5, Duration::ZERO), |_| {
            retries += 1
        })
        .unwrap();
        assert!(health.is_ready());
        assert_eq!(retries, 0);
    }

    #[test]
    fn retries_until_reachable() {
        let store = FlakyStore {
            failures_left: Cell::new(2),
            calls: Cell::new(0),
        };
        let mut retries = Vec::new();

        wait_until_reachable(&store, &RetryPolicy::new(5, Duration::ZERO), |n| {
            retries.push(n)
        })
        .unwrap();

        assert_eq!(store.calls.get(), 3);
        assert_eq!(retries, vec![1, 2]);
    }

    #[test]
    fn gives_up_after_attempts() {
        let store = MemoryStore::unreachable();
        let err = wait_until_reachable(&store, &RetryPolicy::new(3, Duration::ZERO), |_| {})
            .unwrap_err();

        assert!(matches!(err, OnboardError::Connectivity { .. }));
        assert!(err.to_string().contains("3 attempts"));
    }
}
