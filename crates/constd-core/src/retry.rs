// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 The constd Authors

//! Bounded-attempt, multiplicative-delay retry primitive.
//!
//! Shared by the HTTP App Source's `start` and the Runner's static mesh peer
//! connect. Backoff is strictly wall-clock; no jitter.

use std::future::Future;
use std::time::Duration;

/// A retry policy: up to `attempts` tries, starting at `initial_delay`,
/// multiplying the delay by `factor` after each failure.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub initial_delay: Duration,
    pub factor: f64,
}

impl RetryPolicy {
    pub const fn new(attempts: u32, initial_delay: Duration, factor: f64) -> Self {
        Self { attempts, initial_delay, factor }
    }

    /// Policy used by the Supervisor's HTTP App Source: `(N=10, D=1000ms, F=1.4)`.
    pub const fn app_source() -> Self {
        Self::new(10, Duration::from_millis(1000), 1.4)
    }

    /// Policy used when connecting static mesh peers: `(N=10, D=3000ms, F=1.0)`.
    pub const fn static_peer() -> Self {
        Self::new(10, Duration::from_millis(3000), 1.0)
    }

    /// The delay that would precede attempt number `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let millis = self.initial_delay.as_millis() as f64 * self.factor.powi(attempt as i32);
        Duration::from_millis(millis.round() as u64)
    }
}

/// Runs `f` up to `policy.attempts` times, sleeping between attempts per the
/// policy's delay schedule. Returns the first success, or the last error if
/// every attempt fails.
pub async fn retry_with_backoff<F, Fut, T, E>(policy: RetryPolicy, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempt = 0;
    loop {
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                attempt += 1;
                if attempt >= policy.attempts {
                    return Err(err);
                }
                tokio::time::sleep(policy.delay_for_attempt(attempt - 1)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[test]
    fn delay_schedule_multiplies_by_factor() {
        let policy = RetryPolicy::new(10, Duration::from_millis(1000), 1.4);
        assert_eq!(policy.delay_for_attempt(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(1400));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(1960));
    }

    #[test]
    fn static_peer_delay_has_no_growth() {
        let policy = RetryPolicy::static_peer();
        assert_eq!(policy.delay_for_attempt(0), policy.delay_for_attempt(5));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_exactly_n_times_before_failing() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10), 1.0);
        let calls = AtomicU32::new(0);

        let result: Result<(), &str> = retry_with_backoff(policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err("nope") }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_early_without_exhausting_attempts() {
        let policy = RetryPolicy::new(5, Duration::from_millis(10), 1.0);
        let calls = AtomicU32::new(0);

        let result = retry_with_backoff(policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move { if n < 3 { Err("nope") } else { Ok(n) } }
        })
        .await;

        assert_eq!(result, Ok(3));
    }
}
