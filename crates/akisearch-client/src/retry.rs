//! Exponential-backoff retry around a single asynchronous operation.
//!
//! The policy itself holds only configuration. Attempt counter, current delay
//! and the stopwatch are local to each [`RetryPolicy::execute`] call, so one
//! policy can serve concurrent searches.
//!
//! Whether an outcome is retried is decided by a caller-supplied predicate
//! that sees the whole outcome (value or error). An error outcome the
//! predicate declines is returned unchanged.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{error, warn};

use akisearch_core::{RetryConfig, SearchError, SearchResult};

use crate::cancel::CancellationToken;

/// Cancellable wait between attempts.
#[async_trait]
pub trait Delay: Send + Sync {
    /// Wait for `duration`, failing with [`SearchError::Cancelled`] as soon as
    /// `token` is (or already was) cancelled.
    async fn wait(&self, duration: Duration, token: &CancellationToken) -> SearchResult<()>;
}

/// [`Delay`] backed by the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioDelay;

#[async_trait]
impl Delay for TokioDelay {
    async fn wait(&self, duration: Duration, token: &CancellationToken) -> SearchResult<()> {
        if token.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        tokio::select! {
            _ = token.cancelled() => Err(SearchError::Cancelled),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

/// Retry executor with a doubling delay and a bounded number of attempts.
#[derive(Clone)]
pub struct RetryPolicy {
    initial_delay: Duration,
    max_attempts: u32,
    delay: Arc<dyn Delay>,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("initial_delay", &self.initial_delay)
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}

impl RetryPolicy {
    pub fn new(config: &RetryConfig, delay: Arc<dyn Delay>) -> Self {
        Self {
            initial_delay: config.initial_backoff(),
            max_attempts: config.max_attempts.max(1),
            delay,
        }
    }

    /// Policy waiting on the tokio timer.
    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config, Arc::new(TokioDelay))
    }

    pub fn initial_delay(&self) -> Duration {
        self.initial_delay
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `operation` until `should_retry` declines its outcome.
    pub async fn execute<T, F, Fut, P>(
        &self,
        operation: F,
        should_retry: P,
        token: &CancellationToken,
    ) -> SearchResult<T>
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = SearchResult<T>>,
        P: Fn(&SearchResult<T>) -> bool,
    {
        self.execute_with_log_info(operation, should_retry, |_, _| {}, token)
            .await
    }

    /// Like [`execute`](Self::execute), letting the caller add key/value pairs
    /// to every retry log line.
    ///
    /// Fails with [`SearchError::RetryExhausted`] once `max_attempts` outcomes
    /// were all retried, and with [`SearchError::Cancelled`] when the wait
    /// between attempts is cancelled.
    pub async fn execute_with_log_info<T, F, Fut, P, L>(
        &self,
        mut operation: F,
        should_retry: P,
        append_log_info: L,
        token: &CancellationToken,
    ) -> SearchResult<T>
    where
        F: FnMut(CancellationToken) -> Fut,
        Fut: Future<Output = SearchResult<T>>,
        P: Fn(&SearchResult<T>) -> bool,
        L: Fn(&SearchResult<T>, &mut BTreeMap<String, String>),
    {
        let stopwatch = Instant::now();
        let mut attempt: u32 = 0;
        let mut delay = self.initial_delay;

        loop {
            let outcome = operation(token.clone()).await;

            if !should_retry(&outcome) {
                return outcome;
            }

            let mut info = BTreeMap::new();
            append_log_info(&outcome, &mut info);
            let failure = outcome.as_ref().err().map(ToString::to_string);
            let run_time_ms = stopwatch.elapsed().as_millis() as u64;

            warn!(
                category = "retry",
                operation_run_time_ms = run_time_ms,
                retry_delay_ms = delay.as_millis() as u64,
                attempt_number = attempt,
                error = ?failure,
                info = ?info,
                "The operation failed and will be retried"
            );

            attempt += 1;
            if attempt >= self.max_attempts {
                error!(
                    category = "retry",
                    operation_run_time_ms = run_time_ms,
                    max_attempts = self.max_attempts,
                    error = ?failure,
                    info = ?info,
                    "The operation did not succeed after the maximum number of retries ({})",
                    self.max_attempts
                );
                return Err(SearchError::RetryExhausted {
                    max_attempts: self.max_attempts,
                });
            }

            self.delay.wait(delay, token).await?;
            delay = delay.saturating_mul(2);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Records requested delays without sleeping.
    #[derive(Default)]
    struct RecordingDelay {
        waits: Mutex<Vec<Duration>>,
    }

    #[async_trait]
    impl Delay for RecordingDelay {
        async fn wait(&self, duration: Duration, token: &CancellationToken) -> SearchResult<()> {
            if token.is_cancelled() {
                return Err(SearchError::Cancelled);
            }
            self.waits.lock().push(duration);
            Ok(())
        }
    }

    fn policy(max_attempts: u32, delay: Arc<RecordingDelay>) -> RetryPolicy {
        let config = RetryConfig {
            max_attempts,
            initial_backoff_ms: 100,
        };
        RetryPolicy::new(&config, delay)
    }

    #[tokio::test]
    async fn test_success_without_retry() {
        let delay = Arc::new(RecordingDelay::default());
        let calls = AtomicU32::new(0);

        let result = policy(3, delay.clone())
            .execute(
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok::<_, SearchError>(7) }
                },
                |outcome| outcome.is_err(),
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(delay.waits.lock().is_empty());
    }

    #[tokio::test]
    async fn test_retries_unsatisfactory_results_with_doubling_delay() {
        let delay = Arc::new(RecordingDelay::default());
        let calls = AtomicU32::new(0);

        let result = policy(10, delay.clone())
            .execute(
                |_| {
                    let call = calls.fetch_add(1, Ordering::SeqCst);
                    async move { Ok::<_, SearchError>(call) }
                },
                |outcome| matches!(outcome, Ok(call) if *call < 2),
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            *delay.waits.lock(),
            vec![Duration::from_millis(100), Duration::from_millis(200)]
        );
    }

    #[tokio::test]
    async fn test_exhaustion_reports_max_attempts() {
        let delay = Arc::new(RecordingDelay::default());
        let calls = AtomicU32::new(0);

        let result: SearchResult<()> = policy(2, delay.clone())
            .execute(
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(SearchError::Transport("connection refused".to_string())) }
                },
                |_| true,
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(
            result,
            Err(SearchError::RetryExhausted { max_attempts: 2 })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(delay.waits.lock().len(), 1);
    }

    #[tokio::test]
    async fn test_declined_error_is_returned_unchanged() {
        let delay = Arc::new(RecordingDelay::default());

        let result: SearchResult<()> = policy(5, delay.clone())
            .execute(
                |_| async {
                    Err(SearchError::Status {
                        status: 404,
                        reason: "Not Found".to_string(),
                        body: String::new(),
                    })
                },
                |_| false,
                &CancellationToken::new(),
            )
            .await;

        assert!(matches!(result, Err(SearchError::Status { status: 404, .. })));
        assert!(delay.waits.lock().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_token_stops_before_exhaustion() {
        let delay = Arc::new(RecordingDelay::default());
        let token = CancellationToken::new();
        token.cancel();
        let calls = AtomicU32::new(0);

        let result: SearchResult<()> = policy(5, delay.clone())
            .execute(
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(SearchError::Transport("reset".to_string())) }
                },
                |_| true,
                &token,
            )
            .await;

        assert!(matches!(result, Err(SearchError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_log_info_hook_sees_each_retried_outcome() {
        let delay = Arc::new(RecordingDelay::default());
        let seen = Mutex::new(Vec::new());

        let _: SearchResult<()> = policy(3, delay)
            .execute_with_log_info(
                |_| async { Err(SearchError::Transport("timeout".to_string())) },
                |_| true,
                |outcome, info| {
                    info.insert("uri".to_string(), "http://a.b.com/_search".to_string());
                    seen.lock().push(outcome.is_err());
                },
                &CancellationToken::new(),
            )
            .await;

        assert_eq!(*seen.lock(), vec![true, true, true]);
    }

    #[tokio::test]
    async fn test_tokio_delay_fails_fast_when_cancelled() {
        let token = CancellationToken::new();
        token.cancel();

        let result = TokioDelay.wait(Duration::from_secs(60), &token).await;
        assert!(matches!(result, Err(SearchError::Cancelled)));
    }

    #[tokio::test]
    async fn test_tokio_delay_is_interrupted_by_cancel() {
        let token = CancellationToken::new();
        let canceller = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            canceller.cancel();
        });

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            TokioDelay.wait(Duration::from_secs(60), &token),
        )
        .await
        .unwrap();
        assert!(matches!(result, Err(SearchError::Cancelled)));
    }
}
