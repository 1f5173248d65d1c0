//! Generic keyed repository with soft-delete support.

use crate::error::{RecordError, RecordResult};
use crate::locks::TableLocks;
use crate::tables::TableRecord;
use std::marker::PhantomData;
use std::sync::Arc;
use stockroom_rowstore::{RowRange, RowStore};

/// CRUD and soft-delete/restore for a table whose key column carries record
/// identity.
///
/// Every lookup scans the full table; the backend has no query capability.
/// Mutations serialize behind the table's write lock and re-resolve the row
/// index they act on immediately before the index-based call, because an
/// index read earlier in the same operation may already be stale.
///
/// Soft delete moves a record to the paired trash table as a two-step
/// append-then-delete. The ordering means a failure between the steps leaves
/// a duplicate (key present in both tables), never a lost record; that state
/// is surfaced as [`RecordError::InconsistentState`] and detected after the
/// fact by [`reconcile`](Self::reconcile).
pub struct KeyedRepository<R: TableRecord> {
    store: Arc<dyn RowStore>,
    locks: TableLocks,
    _record: PhantomData<fn() -> R>,
}

impl<R: TableRecord> KeyedRepository<R> {
    /// Create a repository over an injected store and shared lock registry.
    pub fn new(store: Arc<dyn RowStore>, locks: TableLocks) -> Self {
        Self {
            store,
            locks,
            _record: PhantomData,
        }
    }

    /// Decode every row of a table, skipping rows that no longer parse.
    ///
    /// Hand-edited documents grow blank and malformed rows; a scan must not
    /// wedge the whole table on one of them.
    async fn load(&self, table: &str) -> RecordResult<Vec<(usize, R)>> {
        let rows = self.store.read_range(table, RowRange::All).await?;
        let mut records = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            match R::from_row(row) {
                Ok(record) => records.push((index, record)),
                Err(err) => {
                    tracing::warn!(table = %table, row = index, error = %err, "skipping undecodable row");
                }
            }
        }
        Ok(records)
    }

    /// Resolve a key to its current row index via a fresh full scan.
    async fn resolve(&self, table: &str, key: &str) -> RecordResult<Option<(usize, R)>> {
        Ok(self
            .load(table)
            .await?
            .into_iter()
            .find(|(_, record)| record.key() == key))
    }

    /// Create a record in the active table.
    ///
    /// The duplicate pre-check is best-effort: it runs under this process's
    /// table lock, but an out-of-process writer can still insert the same key
    /// between check and append.
    pub async fn create(&self, record: &R) -> RecordResult<R> {
        if record.key().trim().is_empty() {
            return Err(RecordError::Validation(
                "record key must not be empty".to_string(),
            ));
        }

        let spec = R::spec();
        let _guard = self.locks.acquire(spec.name).await;

        self.store.ensure_header(spec.name, spec.header).await?;
        if spec.unique_key && self.resolve(spec.name, record.key()).await?.is_some() {
            return Err(RecordError::DuplicateKey(record.key().to_string()));
        }

        self.store
            .append_rows(spec.name, vec![record.to_row()])
            .await?;
        tracing::debug!(table = %spec.name, key = %record.key(), "record created");
        Ok(record.clone())
    }

    /// Find a record in the active table. O(rows); absent keys are `None`.
    pub async fn find_by_key(&self, key: &str) -> RecordResult<Option<R>> {
        Ok(self
            .resolve(R::spec().name, key)
            .await?
            .map(|(_, record)| record))
    }

    /// Load every active record in storage order.
    pub async fn list(&self) -> RecordResult<Vec<R>> {
        Ok(self
            .load(R::spec().name)
            .await?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// Overwrite the record stored under `key` with `record`, in full.
    ///
    /// The backend has no partial update; any field the caller fails to
    /// carry forward is gone after this call. Use
    /// [`update_with`](Self::update_with) to merge against the stored state
    /// instead. Renaming is allowed: when `record.key()` differs from `key`
    /// the new key is checked for uniqueness first.
    pub async fn update(&self, key: &str, record: &R) -> RecordResult<R> {
        if record.key().trim().is_empty() {
            return Err(RecordError::Validation(
                "record key must not be empty".to_string(),
            ));
        }

        let spec = R::spec();
        let _guard = self.locks.acquire(spec.name).await;

        let Some((index, _)) = self.resolve(spec.name, key).await? else {
            return Err(RecordError::NotFound(key.to_string()));
        };

        if spec.unique_key
            && record.key() != key
            && self.resolve(spec.name, record.key()).await?.is_some()
        {
            return Err(RecordError::DuplicateKey(record.key().to_string()));
        }

        self.store
            .update_row_range(spec.name, index, vec![record.to_row()])
            .await?;
        tracing::debug!(table = %spec.name, key = %key, "record updated");
        Ok(record.clone())
    }

    /// Fetch-merge-write under the table lock.
    ///
    /// `merge` receives the stored record and returns the replacement; the
    /// whole sequence holds the write lock, so no other in-process writer
    /// can interleave between the read and the rewrite.
    pub async fn update_with<F>(&self, key: &str, merge: F) -> RecordResult<R>
    where
        F: FnOnce(R) -> R + Send,
    {
        let spec = R::spec();
        let _guard = self.locks.acquire(spec.name).await;

        let Some((index, current)) = self.resolve(spec.name, key).await? else {
            return Err(RecordError::NotFound(key.to_string()));
        };

        let updated = merge(current);
        if updated.key().trim().is_empty() {
            return Err(RecordError::Validation(
                "record key must not be empty".to_string(),
            ));
        }

        self.store
            .update_row_range(spec.name, index, vec![updated.to_row()])
            .await?;
        Ok(updated)
    }

    /// Move a record from the active table to its trash pair.
    ///
    /// Append-then-delete: the trash copy lands first so no failure mode
    /// loses the record. Returns the moved record.
    pub async fn soft_delete(&self, key: &str) -> RecordResult<R> {
        let spec = R::spec();
        let trash = self.trash_table()?;
        let _guard = self.locks.acquire(spec.name).await;

        let Some((_, record)) = self.resolve(spec.name, key).await? else {
            return Err(RecordError::NotFound(key.to_string()));
        };

        self.store.ensure_header(trash, spec.header).await?;
        self.store.append_rows(trash, vec![record.to_row()]).await?;

        self.delete_after_append(spec.name, key, "delete from primary")
            .await?;
        tracing::info!(table = %spec.name, key = %key, "record moved to trash");
        Ok(record)
    }

    /// Move a record from the trash table back to the active table.
    pub async fn restore(&self, key: &str) -> RecordResult<R> {
        let spec = R::spec();
        let trash = self.trash_table()?;
        let _guard = self.locks.acquire(spec.name).await;

        let Some((_, record)) = self.resolve(trash, key).await? else {
            return Err(RecordError::NotFound(key.to_string()));
        };

        self.store.ensure_header(spec.name, spec.header).await?;
        self.store
            .append_rows(spec.name, vec![record.to_row()])
            .await?;

        self.delete_after_append(trash, key, "delete from trash")
            .await?;
        tracing::info!(table = %spec.name, key = %key, "record restored from trash");
        Ok(record)
    }

    /// Permanently remove a record from the trash table. Terminal; a purged
    /// key is gone and a second purge reports `NotFound`.
    pub async fn purge(&self, key: &str) -> RecordResult<()> {
        let spec = R::spec();
        let trash = self.trash_table()?;
        let _guard = self.locks.acquire(spec.name).await;

        let Some((index, _)) = self.resolve(trash, key).await? else {
            return Err(RecordError::NotFound(key.to_string()));
        };

        self.store.delete_row_range(trash, index, 1).await?;
        tracing::info!(table = %trash, key = %key, "record purged");
        Ok(())
    }

    /// Permanently remove a record from the active table.
    ///
    /// For tables without a trash pair (campaigns); soft-deletable tables
    /// go through [`soft_delete`](Self::soft_delete) instead.
    pub async fn delete(&self, key: &str) -> RecordResult<R> {
        let spec = R::spec();
        let _guard = self.locks.acquire(spec.name).await;

        let Some((index, record)) = self.resolve(spec.name, key).await? else {
            return Err(RecordError::NotFound(key.to_string()));
        };

        self.store.delete_row_range(spec.name, index, 1).await?;
        tracing::debug!(table = %spec.name, key = %key, "record deleted");
        Ok(record)
    }

    /// Load every trashed record in storage order.
    pub async fn list_trash(&self) -> RecordResult<Vec<R>> {
        let trash = self.trash_table()?;
        Ok(self
            .load(trash)
            .await?
            .into_iter()
            .map(|(_, record)| record)
            .collect())
    }

    /// Find a record in the trash table.
    pub async fn find_in_trash(&self, key: &str) -> RecordResult<Option<R>> {
        let trash = self.trash_table()?;
        Ok(self.resolve(trash, key).await?.map(|(_, record)| record))
    }

    /// Report keys present in both the active and the trash table.
    ///
    /// A move that stopped between its append and its delete leaves such a
    /// duplicate; an operator decides the canonical copy and repairs by
    /// retrying the failed delete step.
    pub async fn reconcile(&self) -> RecordResult<Vec<String>> {
        let spec = R::spec();
        let trash = self.trash_table()?;
        let _guard = self.locks.acquire(spec.name).await;

        let active = self.load(spec.name).await?;
        let trashed = self.load(trash).await?;

        let mut duplicates = Vec::new();
        for (_, record) in &active {
            if trashed.iter().any(|(_, t)| t.key() == record.key()) {
                duplicates.push(record.key().to_string());
            }
        }
        if !duplicates.is_empty() {
            tracing::warn!(
                table = %spec.name,
                count = duplicates.len(),
                "keys present in both active and trash tables"
            );
        }
        Ok(duplicates)
    }

    fn trash_table(&self) -> RecordResult<&'static str> {
        R::spec().trash.ok_or_else(|| {
            RecordError::Internal(format!("table {} has no trash pair", R::spec().name))
        })
    }

    /// Second step of a two-step move: delete the source row.
    ///
    /// The index is re-resolved here, immediately before the delete, never
    /// reused from the read that started the operation. A row that vanished
    /// in the meantime means the goal state already holds. A delete that
    /// fails leaves the appended copy in place, which the caller must report
    /// as an inconsistency rather than retry blindly.
    async fn delete_after_append(
        &self,
        table: &str,
        key: &str,
        stage: &'static str,
    ) -> RecordResult<()> {
        let resolved = match self.resolve(table, key).await {
            Ok(resolved) => resolved,
            Err(err) => {
                tracing::error!(table = %table, key = %key, error = %err, "failed to re-resolve row after append");
                return Err(RecordError::InconsistentState {
                    key: key.to_string(),
                    stage,
                });
            }
        };

        let Some((index, _)) = resolved else {
            tracing::warn!(table = %table, key = %key, "source row already gone after append");
            return Ok(());
        };

        if let Err(err) = self.store.delete_row_range(table, index, 1).await {
            tracing::error!(table = %table, key = %key, error = %err, "failed to delete source row after append");
            return Err(RecordError::InconsistentState {
                key: key.to_string(),
                stage,
            });
        }
        Ok(())
    }
}
