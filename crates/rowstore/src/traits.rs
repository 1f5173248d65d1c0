//! Row store trait definitions.

use crate::error::RowStoreResult;
use async_trait::async_trait;

/// A selection of rows within a logical table.
///
/// Data rows are addressed by 0-based index with the header row excluded.
/// An index is an ephemeral address: any insert or delete at or above it in
/// the same table invalidates it the moment another writer runs. Callers must
/// resolve the index they act on immediately before the mutating call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowRange {
    /// The header row only.
    Header,
    /// Every data row.
    All,
    /// Data rows `[start, start + count)`.
    Slice { start: usize, count: usize },
}

/// Tabular backend abstraction.
///
/// The backend offers no row identity, no field-level update, no locking, and
/// no queries; every higher-level guarantee is built on whole-range reads and
/// index-based row operations. Implementations must treat an empty range as
/// an empty result, not an error.
#[async_trait]
pub trait RowStore: Send + Sync + 'static {
    /// Read rows from a table. Missing tables and empty ranges read as empty.
    async fn read_range(&self, table: &str, range: RowRange) -> RowStoreResult<Vec<Vec<String>>>;

    /// Append rows after the last populated row.
    ///
    /// Callers provision the header first via [`ensure_header`](Self::ensure_header);
    /// appending to a missing table creates it without one.
    async fn append_rows(&self, table: &str, rows: Vec<Vec<String>>) -> RowStoreResult<()>;

    /// Overwrite whole rows starting at the given data row index.
    ///
    /// There is no partial-field update; callers supply complete rows.
    async fn update_row_range(
        &self,
        table: &str,
        row_index: usize,
        rows: Vec<Vec<String>>,
    ) -> RowStoreResult<()>;

    /// Delete `count` rows starting at `start_index`. All subsequent rows
    /// shift up by `count`.
    async fn delete_row_range(
        &self,
        table: &str,
        start_index: usize,
        count: usize,
    ) -> RowStoreResult<()>;

    /// Idempotently provision the header row.
    ///
    /// Creates the table with the header when absent; verifies the stored
    /// header otherwise and fails with `HeaderMismatch` when it differs.
    async fn ensure_header(&self, table: &str, header: &[&str]) -> RowStoreResult<()>;

    /// Get the name of this backend.
    ///
    /// Returns a static string identifier (e.g., "memory", "sheets").
    /// Used for metrics and logging.
    fn backend_name(&self) -> &'static str;

    /// Verify backend connectivity.
    ///
    /// The default implementation returns Ok(()), suitable for backends that
    /// don't require connectivity verification.
    async fn health_check(&self) -> RowStoreResult<()> {
        Ok(())
    }
}
