//! `{max_attempts, strategy, initial_delay, max_delay, jitter}` retry
//! executor. Async sleeps here are one of the crate's documented
//! suspension points; cancellation is checked before every sleep and
//! before every attempt so a signal set ahead of time costs zero attempts.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use tracing::{info, warn};

use super::errors::RetryError;

const LOG_TARGET: &str = "poker_core::resilience::retry";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackoffStrategy {
    Exponential,
    Linear,
    Fixed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub strategy: BackoffStrategy,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            strategy: BackoffStrategy::Exponential,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            jitter: false,
        }
    }
}

impl RetryPolicy {
    /// Backoff for 1-indexed attempt `n`: exponential
    /// `initial·2^(n−1)`, linear `initial·n`, fixed `initial`, capped at
    /// `max_delay`, then optionally widened by `rand·delay` jitter.
    pub fn delay_for_attempt(&self, n: u32) -> Duration {
        let base = match self.strategy {
            BackoffStrategy::Exponential => {
                let factor = 1u64.checked_shl(n.saturating_sub(1)).unwrap_or(u64::MAX);
                self.initial_delay.saturating_mul(factor as u32).min(self.max_delay)
            }
            BackoffStrategy::Linear => self.initial_delay.saturating_mul(n).min(self.max_delay),
            BackoffStrategy::Fixed => self.initial_delay,
        };
        let base = base.min(self.max_delay);
        if self.jitter {
            let extra: f64 = rand::thread_rng().gen_range(0.0..1.0);
            base.mul_f64(1.0 + extra).min(self.max_delay.mul_f64(2.0))
        } else {
            base
        }
    }
}

/// Cooperative cancellation token shared across the retry executor and any
/// in-flight collaborator call.
#[derive(Clone, Default)]
pub struct AbortSignal(Arc<AtomicBool>);

impl AbortSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Runs `op` up to `policy.max_attempts` times, sleeping the computed
/// backoff between attempts, until it succeeds, is exhausted, or `signal`
/// is set. `retryable` decides whether a given error classifies as worth
/// retrying at all; a non-retryable error returns
/// immediately on the first attempt.
pub async fn execute_with_retry<T, E, F, Fut>(
    policy: &RetryPolicy,
    signal: &AbortSignal,
    retryable: impl Fn(&E) -> bool,
    mut op: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Clone,
{
    if signal.is_aborted() {
        return Err(RetryError::OperationCancelled);
    }

    let mut attempt = 1;
    loop {
        if signal.is_aborted() {
            return Err(RetryError::OperationCancelled);
        }
        match op().await {
            Ok(value) => {
                if attempt > 1 {
                    info!(target: LOG_TARGET, attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if !retryable(&err) || attempt >= policy.max_attempts {
                    warn!(target: LOG_TARGET, attempt, "retry exhausted or error not retryable");
                    return Err(RetryError::Exhausted { attempts: attempt, last: err });
                }
                let delay = policy.delay_for_attempt(attempt);
                warn!(target: LOG_TARGET, attempt, delay_ms = delay.as_millis() as u64, "retrying after backoff");

                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    _ = wait_for_abort(signal) => {
                        return Err(RetryError::OperationCancelled);
                    }
                }
                attempt += 1;
            }
        }
    }
}

async fn wait_for_abort(signal: &AbortSignal) {
    loop {
        if signal.is_aborted() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    #[test]
    fn exponential_backoff_doubles_and_caps() {
        let policy = RetryPolicy {
            max_attempts: 6,
            strategy: BackoffStrategy::Exponential,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: false,
        };
        assert_eq!(policy.delay_for_attempt(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for_attempt(10), Duration::from_secs(30));
    }

    #[test]
    fn linear_and_fixed_strategies() {
        let linear = RetryPolicy {
            strategy: BackoffStrategy::Linear,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(100),
            ..RetryPolicy::default()
        };
        assert_eq!(linear.delay_for_attempt(3), Duration::from_secs(6));

        let fixed = RetryPolicy {
            strategy: BackoffStrategy::Fixed,
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(100),
            ..RetryPolicy::default()
        };
        assert_eq!(fixed.delay_for_attempt(1), Duration::from_secs(5));
        assert_eq!(fixed.delay_for_attempt(9), Duration::from_secs(5));
    }

    #[tokio::test]
    async fn aborted_before_scheduling_makes_zero_attempts() {
        let policy = RetryPolicy {
            max_attempts: 5,
            strategy: BackoffStrategy::Fixed,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(10),
            jitter: false,
        };
        let signal = AbortSignal::new();
        signal.abort();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result: Result<(), RetryError<String>> =
            execute_with_retry(&policy, &signal, |_| true, move || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("boom".to_string())
                }
            })
            .await;
        assert_eq!(result, Err(RetryError::OperationCancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn total_attempts_never_exceed_max_attempts() {
        let policy = RetryPolicy {
            max_attempts: 3,
            strategy: BackoffStrategy::Fixed,
            initial_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(5),
            jitter: false,
        };
        let signal = AbortSignal::new();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result: Result<(), RetryError<String>> =
            execute_with_retry(&policy, &signal, |_| true, move || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("boom".to_string())
                }
            })
            .await;
        assert!(matches!(result, Err(RetryError::Exhausted { attempts: 3, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_stops_after_first_attempt() {
        let policy = RetryPolicy::default();
        let signal = AbortSignal::new();
        let calls = Arc::new(AtomicU32::new(0));
        let calls_clone = calls.clone();
        let result: Result<(), RetryError<String>> =
            execute_with_retry(&policy, &signal, |_| false, move || {
                let calls = calls_clone.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err("validation".to_string())
                }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
