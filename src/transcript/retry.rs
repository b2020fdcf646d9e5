//! Bounded exponential backoff as an explicit state machine.
//!
//! ```text
//! Attempt(n) --ok--> Success
//! Attempt(n) --err--> Retry(delay) --sleep--> Attempt(n + 1)
//! Attempt(n) --err, budget spent--> Exhausted
//! ```
//!
//! The budget is spent when `n` reaches the attempt limit or when the total
//! elapsed time reaches the time limit. The last wait is shortened so the
//! sequence never sleeps past the time limit.

use crate::config::TranscriptSettings;
use std::fmt::Display;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Retry bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Wait after the first failure.
    pub base_delay: Duration,
    /// Growth factor between consecutive waits.
    pub factor: f64,
    /// Cap on any single wait.
    pub max_delay: Duration,
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Cap on wall-clock time across all attempts.
    pub max_elapsed: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&TranscriptSettings::default())
    }
}

impl From<&TranscriptSettings> for RetryPolicy {
    fn from(settings: &TranscriptSettings) -> Self {
        Self {
            base_delay: Duration::from_millis(settings.base_delay_ms),
            factor: 2.0,
            max_delay: Duration::from_millis(settings.max_delay_ms),
            max_attempts: settings.max_attempts.max(1),
            max_elapsed: Duration::from_secs(settings.max_elapsed_seconds),
        }
    }
}

/// What to do after a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Retry(Duration),
    Exhausted,
}

impl RetryPolicy {
    /// Uncapped-by-time wait that follows failure number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(63) as i32;
        let secs = self.base_delay.as_secs_f64() * self.factor.powi(exponent);
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            self.max_delay
        } else {
            Duration::from_secs_f64(secs)
        }
    }

    /// Decide the transition after failure number `attempt`.
    pub fn after_failure(&self, attempt: u32, elapsed: Duration) -> Step {
        if attempt >= self.max_attempts {
            return Step::Exhausted;
        }

        let remaining = self.max_elapsed.saturating_sub(elapsed);
        if remaining.is_zero() {
            return Step::Exhausted;
        }

        Step::Retry(self.delay_for(attempt).min(remaining))
    }
}

/// Outcome of one attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success,
    /// Failed, another attempt follows.
    TransientFailure(String),
    /// Failed and the budget is spent.
    TerminalFailure(String),
}

/// One entry of a retry sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchAttempt {
    pub attempt_number: u32,
    pub delay_before: Duration,
    pub outcome: AttemptOutcome,
}

enum State<T, E> {
    Attempt { number: u32, delay_before: Duration },
    Success(T),
    Exhausted(E),
}

/// Run `op` under `policy`, returning the final result and every attempt made.
///
/// `op` receives the 1-based attempt number. Attempts never overlap.
pub async fn retry_with_history<T, E, F, Fut>(
    policy: &RetryPolicy,
    mut op: F,
) -> (Result<T, E>, Vec<FetchAttempt>)
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let start = Instant::now();
    let mut history = Vec::new();
    let mut state = State::Attempt {
        number: 1,
        delay_before: Duration::ZERO,
    };

    loop {
        state = match state {
            State::Attempt {
                number,
                delay_before,
            } => {
                if !delay_before.is_zero() {
                    tokio::time::sleep(delay_before).await;
                }

                match op(number).await {
                    Ok(value) => {
                        debug!(attempt = number, "attempt succeeded");
                        history.push(FetchAttempt {
                            attempt_number: number,
                            delay_before,
                            outcome: AttemptOutcome::Success,
                        });
                        State::Success(value)
                    }
                    Err(e) => match policy.after_failure(number, start.elapsed()) {
                        Step::Retry(delay) => {
                            warn!(
                                attempt = number,
                                retry_in_ms = delay.as_millis() as u64,
                                error = %e,
                                "attempt failed, backing off"
                            );
                            history.push(FetchAttempt {
                                attempt_number: number,
                                delay_before,
                                outcome: AttemptOutcome::TransientFailure(e.to_string()),
                            });
                            State::Attempt {
                                number: number + 1,
                                delay_before: delay,
                            }
                        }
                        Step::Exhausted => {
                            warn!(attempt = number, error = %e, "retry budget exhausted");
                            history.push(FetchAttempt {
                                attempt_number: number,
                                delay_before,
                                outcome: AttemptOutcome::TerminalFailure(e.to_string()),
                            });
                            State::Exhausted(e)
                        }
                    },
                }
            }
            State::Success(value) => return (Ok(value), history),
            State::Exhausted(e) => return (Err(e), history),
        };
    }
}

/// Run `op` under `policy`, discarding the attempt history.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    retry_with_history(policy, op).await.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            base_delay: Duration::from_millis(1),
            factor: 2.0,
            max_delay: Duration::from_millis(4),
            max_attempts,
            max_elapsed: Duration::from_secs(5),
        }
    }

    #[test]
    fn test_delays_grow_and_cap() {
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(100),
            factor: 2.0,
            max_delay: Duration::from_millis(500),
            max_attempts: 10,
            max_elapsed: Duration::from_secs(60),
        };

        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
        assert_eq!(policy.delay_for(4), Duration::from_millis(500));
        assert_eq!(policy.delay_for(60), Duration::from_millis(500));
    }

    #[test]
    fn test_after_failure_transitions() {
        let policy = RetryPolicy {
            base_delay: Duration::from_secs(1),
            factor: 2.0,
            max_delay: Duration::from_secs(30),
            max_attempts: 3,
            max_elapsed: Duration::from_secs(10),
        };

        assert_eq!(
            policy.after_failure(1, Duration::ZERO),
            Step::Retry(Duration::from_secs(1))
        );
        assert_eq!(policy.after_failure(3, Duration::ZERO), Step::Exhausted);
        // Last wait is clipped to the time left.
        assert_eq!(
            policy.after_failure(2, Duration::from_millis(9500)),
            Step::Retry(Duration::from_millis(500))
        );
        assert_eq!(
            policy.after_failure(1, Duration::from_secs(10)),
            Step::Exhausted
        );
    }

    #[test]
    fn test_settings_conversion() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 8);
        assert_eq!(policy.max_elapsed, Duration::from_secs(60));
        assert_eq!(policy.base_delay, Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let (result, history) = retry_with_history(&fast_policy(5), |n| async move {
            if n < 3 {
                Err(format!("flaky {n}"))
            } else {
                Ok(n * 10)
            }
        })
        .await;

        assert_eq!(result, Ok(30));
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].delay_before, Duration::ZERO);
        assert_eq!(history[1].delay_before, Duration::from_millis(1));
        assert_eq!(history[2].delay_before, Duration::from_millis(2));
        assert_eq!(
            history[0].outcome,
            AttemptOutcome::TransientFailure("flaky 1".to_string())
        );
        assert_eq!(history[2].outcome, AttemptOutcome::Success);
    }

    #[tokio::test]
    async fn test_exhaustion_surfaces_last_error() {
        let mut calls = 0;
        let (result, history) = retry_with_history(&fast_policy(4), |n| {
            calls += 1;
            async move { Err::<(), _>(format!("failure {n}")) }
        })
        .await;

        assert_eq!(result, Err("failure 4".to_string()));
        assert_eq!(calls, 4);
        assert_eq!(
            history.last().map(|a| a.outcome.clone()),
            Some(AttemptOutcome::TerminalFailure("failure 4".to_string()))
        );
    }

    #[tokio::test]
    async fn test_time_budget_stops_retries() {
        let policy = RetryPolicy {
            base_delay: Duration::from_millis(30),
            factor: 1.0,
            max_delay: Duration::from_millis(30),
            max_attempts: 1000,
            max_elapsed: Duration::from_millis(100),
        };

        let start = Instant::now();
        let result = retry(&policy, |_| async { Err::<(), _>("down") }).await;

        assert!(result.is_err());
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
