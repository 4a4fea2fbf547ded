//! Bounded retry with exponential backoff.

use std::fmt::Display;
use std::future::Future;

use backoff::backoff::Backoff;

use crate::config::RetryPolicy;

/// Final result of a retried operation and how many attempts it took.
#[derive(Debug)]
pub struct Attempted<T, E> {
    pub result: Result<T, E>,
    pub attempts: u32,
}

/// Run `op` until it succeeds or `policy.max_attempts` is used up.
///
/// Every error consumes one attempt and is followed by the next delay of the
/// policy's schedule. `op` receives the 1-based attempt number. The last
/// error is returned once the budget is exhausted.
pub async fn with_retry<T, E, F, Fut>(policy: &RetryPolicy, label: &str, mut op: F) -> Attempted<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut schedule = policy.backoff();
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => {
                return Attempted {
                    result: Ok(value),
                    attempts: attempt,
                };
            }
            Err(error) if attempt >= max_attempts => {
                return Attempted {
                    result: Err(error),
                    attempts: attempt,
                };
            }
            Err(error) => {
                let delay = schedule
                    .next_backoff()
                    .unwrap_or_else(|| policy.initial_backoff());
                tracing::warn!(
                    target: "eqfix::retry",
                    label,
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "Attempt failed, backing off"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
