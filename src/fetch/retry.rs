//! Retry executor with per-source backoff
//!
//! Every source pipeline runs its fetch-and-extract cycle through a [`RetryPolicy`].
//! Attempts are strictly sequential. The attempt closure reports one of four outcomes:
//!
//! | Outcome     | Executor action                                   |
//! |-------------|---------------------------------------------------|
//! | `Success`   | Return the value immediately                      |
//! | `NotFound`  | Return immediately, no further attempts           |
//! | `Retryable` | Log, sleep `delay_for(attempt)`, try again        |
//! | `Terminal`  | Return `Failed` immediately                       |
//!
//! When the attempts run out, the last retryable cause is reported inside `Failed`.

use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// Message prefix used when all attempts are exhausted
pub const EXHAUSTED_MESSAGE: &str = "Failed to fetch data after multiple attempts";

/// Upper bound for exponential backoff delays
const MAX_EXPONENTIAL_DELAY: Duration = Duration::from_secs(30);

/// What one attempt produced
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptOutcome<T> {
    /// A usable record
    Success(T),

    /// The resource is confirmed absent
    NotFound,

    /// Transient failure; worth another attempt
    Retryable(String),

    /// Failure that another attempt cannot fix
    Terminal(String),
}

/// Final result of a retry run
#[derive(Debug, Clone, PartialEq)]
pub enum RetryOutcome<T> {
    Success(T),
    NotFound,
    Failed(String),
}

/// How the delay grows between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackoffStrategy {
    /// base × attempt
    #[default]
    Linear,

    /// base × 2^(attempt - 1), capped at 30s
    Exponential,

    /// base, every time
    Constant,
}

/// Bounded retry parameters for one source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub strategy: BackoffStrategy,
}

impl RetryPolicy {
    /// Creates a policy; `max_attempts` is clamped to at least one
    pub fn new(max_attempts: u32, base_delay: Duration, strategy: BackoffStrategy) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            strategy,
        }
    }

    /// Linear policy: delay = base × attempt
    pub fn linear(max_attempts: u32, base_delay: Duration) -> Self {
        Self::new(max_attempts, base_delay, BackoffStrategy::Linear)
    }

    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let attempt = attempt.max(1);
        match self.strategy {
            BackoffStrategy::Linear => self.base_delay.saturating_mul(attempt),
            BackoffStrategy::Exponential => {
                let factor = 2u32.saturating_pow(attempt - 1);
                self.base_delay
                    .saturating_mul(factor)
                    .min(MAX_EXPONENTIAL_DELAY)
            }
            BackoffStrategy::Constant => self.base_delay,
        }
    }

    /// Runs `attempt_fn` until it succeeds, reports not-found, fails terminally,
    /// or the attempts are exhausted. Sleeps with `tokio::time::sleep`.
    pub async fn run<T, F, Fut>(&self, source: &str, attempt_fn: F) -> RetryOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = AttemptOutcome<T>>,
    {
        self.run_with_sleep(source, attempt_fn, tokio::time::sleep)
            .await
    }

    /// Same as [`RetryPolicy::run`], with an injectable sleep function
    pub async fn run_with_sleep<T, F, Fut, S, SFut>(
        &self,
        source: &str,
        mut attempt_fn: F,
        mut sleep: S,
    ) -> RetryOutcome<T>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = AttemptOutcome<T>>,
        S: FnMut(Duration) -> SFut,
        SFut: Future<Output = ()>,
    {
        let mut last_cause = String::from("no attempt made");

        for attempt in 1..=self.max_attempts {
            match attempt_fn(attempt).await {
                AttemptOutcome::Success(value) => {
                    if attempt > 1 {
                        tracing::info!("[{}] Succeeded on attempt {}", source, attempt);
                    }
                    return RetryOutcome::Success(value);
                }
                AttemptOutcome::NotFound => return RetryOutcome::NotFound,
                AttemptOutcome::Terminal(cause) => {
                    tracing::warn!(
                        "[{}] Attempt {} failed terminally: {}",
                        source,
                        attempt,
                        cause
                    );
                    return RetryOutcome::Failed(cause);
                }
                AttemptOutcome::Retryable(cause) => {
                    tracing::warn!(
                        "[{}] Attempt {}/{} failed: {}",
                        source,
                        attempt,
                        self.max_attempts,
                        cause
                    );
                    last_cause = cause;

                    if attempt < self.max_attempts {
                        let delay = self.delay_for(attempt);
                        tracing::debug!("[{}] Waiting {:?} before retry", source, delay);
                        sleep(delay).await;
                    }
                }
            }
        }

        RetryOutcome::Failed(format!("{}: {}", EXHAUSTED_MESSAGE, last_cause))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Sleep stand-in that records requested delays without waiting
    fn recording_sleep(
        log: Arc<Mutex<Vec<Duration>>>,
    ) -> impl FnMut(Duration) -> std::future::Ready<()> {
        move |d| {
            log.lock().unwrap().push(d);
            std::future::ready(())
        }
    }

    #[test]
    fn test_linear_delays() {
        let policy = RetryPolicy::linear(5, Duration::from_millis(2000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(8000));
    }

    #[test]
    fn test_exponential_delays_are_capped() {
        let policy = RetryPolicy::new(10, Duration::from_secs(8), BackoffStrategy::Exponential);
        assert_eq!(policy.delay_for(1), Duration::from_secs(8));
        assert_eq!(policy.delay_for(2), Duration::from_secs(16));
        assert_eq!(policy.delay_for(3), Duration::from_secs(30));
        assert_eq!(policy.delay_for(9), Duration::from_secs(30));
    }

    #[test]
    fn test_constant_delays() {
        let policy = RetryPolicy::new(3, Duration::from_millis(250), BackoffStrategy::Constant);
        assert_eq!(policy.delay_for(1), policy.delay_for(3));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let policy = RetryPolicy::linear(0, Duration::from_millis(1));
        assert_eq!(policy.max_attempts, 1);
    }

    #[tokio::test]
    async fn test_succeeds_on_last_attempt() {
        let policy = RetryPolicy::linear(5, Duration::from_millis(100));
        let delays = Arc::new(Mutex::new(Vec::new()));
        let mut calls = 0u32;

        let outcome = policy
            .run_with_sleep(
                "Test",
                |attempt| {
                    calls += 1;
                    async move {
                        if attempt < 5 {
                            AttemptOutcome::Retryable(format!("boom {}", attempt))
                        } else {
                            AttemptOutcome::Success("record")
                        }
                    }
                },
                recording_sleep(delays.clone()),
            )
            .await;

        assert_eq!(outcome, RetryOutcome::Success("record"));
        assert_eq!(calls, 5);

        let delays = delays.lock().unwrap();
        assert_eq!(delays.len(), 4);
        assert!(delays.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_not_found_returns_immediately() {
        let policy = RetryPolicy::linear(5, Duration::from_millis(100));
        let delays = Arc::new(Mutex::new(Vec::new()));
        let mut calls = 0u32;

        let outcome: RetryOutcome<()> = policy
            .run_with_sleep(
                "Test",
                |_| {
                    calls += 1;
                    async { AttemptOutcome::NotFound }
                },
                recording_sleep(delays.clone()),
            )
            .await;

        assert_eq!(outcome, RetryOutcome::NotFound);
        assert_eq!(calls, 1);
        assert!(delays.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_always_failing_exhausts_attempts() {
        let policy = RetryPolicy::linear(5, Duration::from_millis(100));
        let delays = Arc::new(Mutex::new(Vec::new()));
        let mut calls = 0u32;

        let outcome: RetryOutcome<()> = policy
            .run_with_sleep(
                "Test",
                |_| {
                    calls += 1;
                    async { AttemptOutcome::Retryable("timeout".to_string()) }
                },
                recording_sleep(delays.clone()),
            )
            .await;

        assert_eq!(calls, 5);
        assert_eq!(delays.lock().unwrap().len(), 4);
        match outcome {
            RetryOutcome::Failed(reason) => {
                assert!(reason.starts_with(EXHAUSTED_MESSAGE));
                assert!(reason.ends_with("timeout"));
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_terminal_stops_without_backoff() {
        let policy = RetryPolicy::linear(5, Duration::from_millis(100));
        let delays = Arc::new(Mutex::new(Vec::new()));

        let outcome: RetryOutcome<()> = policy
            .run_with_sleep(
                "Test",
                |_| async { AttemptOutcome::Terminal("bad credentials".to_string()) },
                recording_sleep(delays.clone()),
            )
            .await;

        assert_eq!(outcome, RetryOutcome::Failed("bad credentials".to_string()));
        assert!(delays.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_uses_real_sleep() {
        let policy = RetryPolicy::linear(2, Duration::from_millis(1));
        let outcome = policy
            .run("Test", |attempt| async move {
                if attempt == 1 {
                    AttemptOutcome::Retryable("first".to_string())
                } else {
                    AttemptOutcome::Success(attempt)
                }
            })
            .await;
        assert_eq!(outcome, RetryOutcome::Success(2));
    }
}
