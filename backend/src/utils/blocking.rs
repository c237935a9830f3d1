//! Deadline helpers for work that may block.
//!
//! Password hashing is CPU-bound and store calls wait on I/O; neither may stall
//! a request indefinitely. `with_deadline` bounds any future and
//! `spawn_with_deadline` additionally moves a synchronous job onto tokio's
//! blocking pool. Both report an elapsed deadline as `ServiceError::Timeout`.
//!
//! Dropping the returned future cancels the wait. A blocking job that already
//! started keeps running on its pool thread, but its result is discarded.

use crate::errors::{ServiceError, ServiceResult};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

pub async fn with_deadline<F, T>(operation: &'static str, limit: Duration, future: F) -> ServiceResult<T>
where
    F: Future<Output = ServiceResult<T>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => {
            warn!(operation, limit_ms = limit.as_millis() as u64, "operation exceeded its deadline");
            Err(ServiceError::timeout(operation))
        }
    }
}

/// Runs CPU-bound credential work on the blocking pool under a deadline.
pub async fn spawn_with_deadline<F, T>(operation: &'static str, limit: Duration, job: F) -> ServiceResult<T>
where
    F: FnOnce() -> ServiceResult<T> + Send + 'static,
    T: Send + 'static,
{
    with_deadline(operation, limit, async move {
        tokio::task::spawn_blocking(job).await.map_err(|e| {
            ServiceError::hashing_failure(format!("{operation} task did not complete: {e}"))
        })?
    })
    .await
}
