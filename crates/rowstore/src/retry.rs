//! Bounded retry wrapper around a row store.

use crate::error::{RowStoreError, RowStoreResult};
use crate::traits::{RowRange, RowStore};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use stockroom_core::RetryConfig;

/// Row store decorator retrying transient failures with a fixed backoff.
///
/// Reads, overwrites, deletes, and header provisioning are safe to replay:
/// reads are pure, and the index-based mutations are re-resolved by their
/// callers before every attempt sequence, so replaying the same call is
/// idempotent against the state it was issued for. Appends are the
/// exception: a transport failure leaves their outcome unknown, and without
/// an idempotency token on the backend a replay can duplicate rows, so
/// append failures pass through untouched.
pub struct RetryingStore {
    inner: Arc<dyn RowStore>,
    max_attempts: u32,
    backoff: Duration,
}

impl RetryingStore {
    /// Wrap a store with the given retry policy.
    pub fn new(inner: Arc<dyn RowStore>, config: &RetryConfig) -> Self {
        Self {
            inner,
            max_attempts: config.max_attempts.max(1),
            backoff: config.backoff(),
        }
    }

    async fn with_retries<T, F, Fut>(&self, operation: &str, mut call: F) -> RowStoreResult<T>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = RowStoreResult<T>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    tracing::warn!(
                        operation = operation,
                        attempt = attempt,
                        error = %err,
                        "transient row store failure, retrying"
                    );
                    attempt += 1;
                    tokio::time::sleep(self.backoff).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[async_trait]
impl RowStore for RetryingStore {
    async fn read_range(&self, table: &str, range: RowRange) -> RowStoreResult<Vec<Vec<String>>> {
        self.with_retries("read_range", || self.inner.read_range(table, range))
            .await
    }

    async fn append_rows(&self, table: &str, rows: Vec<Vec<String>>) -> RowStoreResult<()> {
        // Single attempt: an append whose outcome is unknown must not be
        // replayed without an idempotency token, and the backend has none.
        match self.inner.append_rows(table, rows).await {
            Err(RowStoreError::Timeout(t)) => Err(RowStoreError::AppendOutcomeUnknown(
                RowStoreError::Timeout(t).to_string(),
            )),
            other => other,
        }
    }

    async fn update_row_range(
        &self,
        table: &str,
        row_index: usize,
        rows: Vec<Vec<String>>,
    ) -> RowStoreResult<()> {
        self.with_retries("update_row_range", || {
            self.inner.update_row_range(table, row_index, rows.clone())
        })
        .await
    }

    async fn delete_row_range(
        &self,
        table: &str,
        start_index: usize,
        count: usize,
    ) -> RowStoreResult<()> {
        self.with_retries("delete_row_range", || {
            self.inner.delete_row_range(table, start_index, count)
        })
        .await
    }

    async fn ensure_header(&self, table: &str, header: &[&str]) -> RowStoreResult<()> {
        self.with_retries("ensure_header", || self.inner.ensure_header(table, header))
            .await
    }

    fn backend_name(&self) -> &'static str {
        self.inner.backend_name()
    }

    async fn health_check(&self) -> RowStoreResult<()> {
        self.inner.health_check().await
    }
}
