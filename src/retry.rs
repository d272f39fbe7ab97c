//! Bounded retry for backing calls.
//!
//! Each attempt runs under a deadline. Timeouts and `ServiceUnavailable`
//! failures are retried with doubling, jittered delays; any other error is
//! returned immediately. When attempts run out the last failure surfaces as
//! `ServiceUnavailable`.

use crate::config::RetryConfig;
use crate::error::{SearchError, ServiceResult};

use std::future::Future;
use std::time::Duration;

pub async fn with_retry<T, F, Fut>(policy: &RetryConfig, operation: &str, mut call: F) -> ServiceResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = ServiceResult<T>>,
{
    let attempts = policy.attempts.max(1);
    let mut delay = policy.base_delay;

    for attempt in 0..attempts {
        let outcome = match tokio::time::timeout(policy.call_timeout, call()).await {
            Ok(result) => result,
            Err(_) => Err(SearchError::ServiceUnavailable(format!(
                "{} timed out after {}ms",
                operation,
                policy.call_timeout.as_millis()
            ))),
        };

        match outcome {
            Ok(value) => return Ok(value),
            Err(e) if !e.is_retryable() => return Err(e),
            Err(e) => {
                if attempt + 1 == attempts {
                    tracing::error!("{} failed after {} attempts: {}", operation, attempts, e);
                    return Err(e);
                }
                let jitter = Duration::from_millis(rand::random::<u64>() % 25);
                tracing::warn!(
                    "{} failed (attempt {}/{}): {}, retrying in {:?}",
                    operation,
                    attempt + 1,
                    attempts,
                    e,
                    delay + jitter
                );
                tokio::time::sleep(delay + jitter).await;
                delay = (delay * 2).min(policy.max_delay);
            }
        }
    }

    Err(SearchError::ServiceUnavailable(format!(
        "{}: retry attempts exhausted",
        operation
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_policy(attempts: usize) -> RetryConfig {
        RetryConfig {
            attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            call_timeout: Duration::from_millis(50),
        }
    }

    #[tokio::test]
    async fn test_succeeds_after_transient_failures() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result = with_retry(&fast_policy(3), "flaky", || {
            let counter = counter.clone();
            async move {
                if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(SearchError::ServiceUnavailable("down".to_string()))
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_configured_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: ServiceResult<()> = with_retry(&fast_policy(2), "always_down", || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(SearchError::ServiceUnavailable("down".to_string()))
            }
        })
        .await;

        assert!(matches!(result, Err(SearchError::ServiceUnavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let result: ServiceResult<()> = with_retry(&fast_policy(5), "lookup", || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(SearchError::NotFound("f1".to_string()))
            }
        })
        .await;

        assert_eq!(result, Err(SearchError::NotFound("f1".to_string())));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_hanging_call_times_out_as_unavailable() {
        let result: ServiceResult<()> = with_retry(&fast_policy(2), "hang", || async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;

        match result {
            Err(SearchError::ServiceUnavailable(msg)) => assert!(msg.contains("timed out")),
            other => panic!("expected timeout, got {:?}", other),
        }
    }
}
