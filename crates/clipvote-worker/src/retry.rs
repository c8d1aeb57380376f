//! Interruptible exponential backoff around message processing.

use std::future::Future;

use tokio::sync::watch;
use tracing::info;

use crate::config::RetryPolicy;
use crate::error::{WorkerError, WorkerResult};

/// Run an operation under the retry policy.
///
/// Permanent errors short-circuit immediately. Transient errors retry up to
/// `max_retries` times, sleeping `min(2^(n-1) * base_delay, max_delay)`
/// before attempt `n`; the sleep aborts with `Cancelled` when the shutdown
/// flag flips. With backoff disabled the operation runs exactly once.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    mut shutdown_rx: watch::Receiver<bool>,
    operation: F,
) -> WorkerResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = WorkerResult<T>>,
{
    if !policy.enable_backoff {
        return operation().await;
    }

    let mut last_err = match operation().await {
        Ok(value) => return Ok(value),
        Err(e) if e.is_permanent() => return Err(e),
        Err(e) => e,
    };

    for attempt in 1..=policy.max_retries {
        let delay = policy.delay_for_attempt(attempt);
        info!(
            "Attempt {} failed, retrying after {:?}: {}",
            attempt, delay, last_err
        );

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = shutdown_rx.changed() => {
                if *shutdown_rx.borrow() {
                    return Err(WorkerError::Cancelled);
                }
            }
        }

        match operation().await {
            Ok(value) => {
                info!("Operation succeeded on retry attempt {}", attempt);
                return Ok(value);
            }
            Err(e) if e.is_permanent() => return Err(e),
            Err(e) => last_err = e,
        }
    }

    Err(last_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(4),
            enable_backoff: true,
        }
    }

    #[tokio::test]
    async fn test_immediate_success_runs_once() {
        let (_tx, rx) = watch::channel(false);
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&fast_policy(3), rx, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, WorkerError>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_failures_then_success() {
        let (_tx, rx) = watch::channel(false);
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(&fast_policy(3), rx, || {
            let attempt = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if attempt < 2 {
                    Err(WorkerError::Storage(
                        clipvote_storage::StorageError::UploadFailed("connection reset".into()),
                    ))
                } else {
                    Ok(7)
                }
            }
        })
        .await;

        // Failed twice, succeeded on the third attempt.
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_short_circuits() {
        let (_tx, rx) = watch::channel(false);
        let calls = AtomicU32::new(0);
        let result: WorkerResult<()> = retry_with_backoff(&fast_policy(3), rx, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(WorkerError::NotFound(9)) }
        })
        .await;

        assert!(result.unwrap_err().is_permanent());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_exhausted() {
        let (_tx, rx) = watch::channel(false);
        let calls = AtomicU32::new(0);
        let result: WorkerResult<()> = retry_with_backoff(&fast_policy(3), rx, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(WorkerError::Storage(
                    clipvote_storage::StorageError::UploadFailed("still down".into()),
                ))
            }
        })
        .await;

        assert!(!result.unwrap_err().is_permanent());
        // Initial attempt plus max_retries.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_backoff_disabled_runs_once() {
        let policy = RetryPolicy {
            enable_backoff: false,
            ..fast_policy(3)
        };

        let (_tx, rx) = watch::channel(false);
        let calls = AtomicU32::new(0);
        let result: WorkerResult<()> = retry_with_backoff(&policy, rx, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(WorkerError::Storage(
                    clipvote_storage::StorageError::UploadFailed("down".into()),
                ))
            }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
