//! Bounded retry for provider calls.

use crate::error::LlmError;
use rootcause::Report;
use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

/// How many times to try and how long to wait between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy; zero attempts is treated as one.
    #[must_use]
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }

    /// Returns a copy with a different attempt count.
    #[must_use]
    pub fn with_attempts(self, attempts: u32) -> Self {
        Self::new(attempts, self.delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_millis(500))
    }
}

/// Accepts any successful result.
pub fn any_result<T>(_: &T) -> bool {
    true
}

/// Accepts a vector with at least one non-zero component.
pub fn non_zero_vector(vector: &Vec<f32>) -> bool {
    vector.iter().any(|x| *x != 0.0)
}

/// Runs `operation` until it yields a value satisfying `accept`.
///
/// Errors and rejected values both consume an attempt. Exhaustion is
/// reported as [`LlmError::RetriesExhausted`] carrying the last error.
///
/// # Errors
///
/// Returns an error once every attempt has failed.
pub async fn call_with_retry<T, F, Fut, C>(
    title: &str,
    policy: RetryPolicy,
    mut operation: F,
    accept: C,
) -> Result<T, Report<LlmError>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
    C: Fn(&T) -> bool,
{
    let mut last_error = None;
    for attempt in 1..=policy.attempts {
        match operation().await {
            Ok(value) if accept(&value) => return Ok(value),
            Ok(_) => {
                warn!(title, attempt, "Result rejected by condition");
                last_error = None;
            }
            Err(e) => {
                warn!(title, attempt, error = %e, "Attempt failed");
                last_error = Some(e.to_string());
            }
        }
        if attempt < policy.attempts && !policy.delay.is_zero() {
            tokio::time::sleep(policy.delay).await;
        }
    }

    error!(title, attempts = policy.attempts, "Retries exhausted");
    Err(LlmError::RetriesExhausted {
        title: title.to_string(),
        attempts: policy.attempts,
        last_error,
    }
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn unavailable() -> LlmError {
        LlmError::ProviderUnavailable {
            provider: "gigachat".to_string(),
            reason: "503".to_string(),
        }
    }

    #[tokio::test]
    async fn returns_first_success() {
        let calls = AtomicU32::new(0);
        let result = call_with_retry(
            "#test",
            RetryPolicy::new(3, Duration::ZERO),
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, LlmError>("ok".to_string())
            },
            any_result,
        )
        .await
        .expect("success");

        assert_eq!(result, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_failures() {
        let calls = AtomicU32::new(0);
        let result = call_with_retry(
            "#test",
            RetryPolicy::new(3, Duration::ZERO),
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(unavailable())
                } else {
                    Ok(7)
                }
            },
            any_result,
        )
        .await
        .expect("third attempt succeeds");

        assert_eq!(result, 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_carries_last_error() {
        let report = call_with_retry(
            "#get_response",
            RetryPolicy::new(2, Duration::ZERO),
            || async { Err::<String, _>(unavailable()) },
            any_result,
        )
        .await
        .unwrap_err();

        match report.current_context() {
            LlmError::RetriesExhausted {
                attempts,
                last_error,
                ..
            } => {
                assert_eq!(*attempts, 2);
                assert!(last_error.as_deref().is_some_and(|e| e.contains("503")));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn rejected_credentials_get_another_attempt() {
        let calls = AtomicU32::new(0);
        let result = call_with_retry(
            "#get_response",
            RetryPolicy::new(3, Duration::ZERO),
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(LlmError::RequestFailed {
                        provider: "gigachat".to_string(),
                        reason: "401 Unauthorized".to_string(),
                    })
                } else {
                    Ok("fresh token".to_string())
                }
            },
            any_result,
        )
        .await
        .expect("second attempt succeeds");

        assert_eq!(result, "fresh token");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_vectors_are_retried() {
        let calls = AtomicU32::new(0);
        let result = call_with_retry(
            "#get_embedding",
            RetryPolicy::new(3, Duration::ZERO),
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(vec![0.0, 0.0])
                } else {
                    Ok(vec![0.0, 0.5])
                }
            },
            non_zero_vector,
        )
        .await
        .expect("second attempt accepted");

        assert_eq!(result, vec![0.0, 0.5]);
    }

    #[test]
    fn zero_attempts_means_one() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts, 1);
    }
}
