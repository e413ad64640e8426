use std::time::Duration;

use tokio::time::sleep;

/// Bounded exponential backoff shared by every retrying call site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Four attempts, 400ms growing by 1.6x, capped at 1.5s.
    pub(crate) fn proof_fetch_default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(400),
            multiplier: 1.6,
            max_delay: Duration::from_millis(1500),
        }
    }

    /// Three attempts, 500ms growing by 1.5x, capped at 2s.
    pub(crate) fn proof_submit_default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            multiplier: 1.5,
            max_delay: Duration::from_millis(2000),
        }
    }
}

/// Every failure is retried until the policy runs out; errors may only
/// shorten or stretch the wait before the next attempt.
pub(crate) trait RetryableError: std::fmt::Display {
    fn backoff_hint(&self) -> Option<Duration> {
        None
    }
}

/// Delay before the attempt following `attempt` (1-based).
/// A server-provided hint replaces the computed delay but is still capped.
pub(crate) fn backoff_delay(
    policy: &RetryPolicy,
    attempt: usize,
    hint: Option<Duration>,
) -> Duration {
    if let Some(hint) = hint {
        return hint.min(policy.max_delay);
    }

    let base_ms = policy.base_delay.as_millis() as f64;
    let exponent = attempt.saturating_sub(1).min(32) as i32;
    let delay_ms = base_ms * policy.multiplier.powi(exponent);
    let max_ms = policy.max_delay.as_millis() as f64;

    Duration::from_millis(delay_ms.min(max_ms).round() as u64)
}

/// Run `operation` until it succeeds or the policy's attempts are exhausted.
/// Exhaustion returns the last error.
pub(crate) async fn execute_with_retry<T, E, F, O>(
    policy: &RetryPolicy,
    label: &str,
    mut operation: F,
) -> Result<T, E>
where
    E: RetryableError,
    F: FnMut(usize) -> O,
    O: std::future::IntoFuture<Output = Result<T, E>>,
{
    let mut attempt = 1;

    loop {
        match operation(attempt).into_future().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if attempt >= policy.max_attempts {
                    return Err(err);
                }

                let delay = backoff_delay(policy, attempt, err.backoff_hint());
                tracing::warn!(
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis(),
                    error = %err,
                    "{} failed; retrying",
                    label
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
