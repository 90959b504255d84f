//! Retry policy for single document store operations
//!
//! Transient failures (the store is reconnecting) are retried forever with a
//! fixed delay, so a stalled database blocks the writer instead of losing
//! data. Any other failure abandons the operation and yields `None`.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{debug, warn};

use crate::error::{OperationOutcome, StoreResult};

#[derive(Debug, Clone, Copy)]
pub struct RetryingExecutor {
    retry_delay: Duration,
}

impl RetryingExecutor {
    pub fn new(retry_delay: Duration) -> Self {
        Self { retry_delay }
    }

    pub fn retry_delay(&self) -> Duration {
        self.retry_delay
    }

    /// Run `attempt` until it succeeds or fails permanently
    ///
    /// `operation` describes the call (collection, query) for the logs.
    /// Returns `None` when the operation failed permanently; the caller must
    /// not assume the store was modified in that case.
    pub async fn execute<T, F, Fut>(&self, operation: &str, mut attempt: F) -> Option<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StoreResult<T>>,
    {
        let mut reconnect_started: Option<Instant> = None;

        loop {
            match OperationOutcome::from(attempt().await) {
                OperationOutcome::Success(value) => {
                    debug!(operation, "Store operation succeeded");
                    return Some(value);
                }
                OperationOutcome::Transient(error) => {
                    let started = *reconnect_started.get_or_insert_with(Instant::now);
                    warn!(
                        operation,
                        error = %error,
                        elapsed_secs = started.elapsed().as_secs(),
                        "Store is reconnecting, retrying in {}s",
                        self.retry_delay.as_secs()
                    );
                    sleep(self.retry_delay).await;
                }
                OperationOutcome::Permanent(error) => {
                    warn!(operation, error = %error, "Store operation failed, skipping it");
                    return None;
                }
            }
        }
    }
}
