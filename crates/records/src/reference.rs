//! Reference set repositories for flat lookup lists.

use crate::error::{RecordError, RecordResult};
use crate::locks::TableLocks;
use crate::models::RackEntry;
use crate::tables::{cell, TableSpec, RACKS};
use std::sync::Arc;
use stockroom_core::Warehouse;
use stockroom_rowstore::{RowRange, RowStore};

/// Single-column lookup list (brands, typologies).
///
/// Uniqueness is best-effort: the duplicate check runs under this process's
/// table lock, so two serialized `add` calls of the same value leave one
/// entry, but a concurrent out-of-process writer can still slip a duplicate
/// into the check-then-append window.
pub struct ReferenceSet {
    store: Arc<dyn RowStore>,
    locks: TableLocks,
    spec: &'static TableSpec,
}

impl ReferenceSet {
    /// Create a reference set over a single-column table spec.
    pub fn new(store: Arc<dyn RowStore>, locks: TableLocks, spec: &'static TableSpec) -> Self {
        debug_assert_eq!(spec.header.len(), 1, "reference sets are single-column");
        Self { store, locks, spec }
    }

    /// The backing table name.
    pub fn table(&self) -> &'static str {
        self.spec.name
    }

    async fn read_values(&self) -> RecordResult<Vec<(usize, String)>> {
        let rows = self.store.read_range(self.spec.name, RowRange::All).await?;
        Ok(rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let value = cell(row, 0).trim();
                if value.is_empty() {
                    None
                } else {
                    Some((index, value.to_string()))
                }
            })
            .collect())
    }

    /// List entries in insertion order as stored.
    pub async fn list(&self) -> RecordResult<Vec<String>> {
        Ok(self
            .read_values()
            .await?
            .into_iter()
            .map(|(_, value)| value)
            .collect())
    }

    /// Append a value, rejecting duplicates seen at check time.
    pub async fn add(&self, value: &str) -> RecordResult<()> {
        let value = value.trim();
        if value.is_empty() {
            return Err(RecordError::Validation(format!(
                "{} entry must not be empty",
                self.spec.name
            )));
        }

        let _guard = self.locks.acquire(self.spec.name).await;
        self.store
            .ensure_header(self.spec.name, self.spec.header)
            .await?;

        let exists = self
            .read_values()
            .await?
            .iter()
            .any(|(_, stored)| stored.eq_ignore_ascii_case(value));
        if exists {
            return Err(RecordError::DuplicateKey(value.to_string()));
        }

        self.store
            .append_rows(self.spec.name, vec![vec![value.to_string()]])
            .await?;
        tracing::debug!(table = %self.spec.name, value = %value, "reference entry added");
        Ok(())
    }

    /// Remove a value by re-resolving its row against a fresh read.
    pub async fn remove(&self, value: &str) -> RecordResult<()> {
        let value = value.trim();
        let _guard = self.locks.acquire(self.spec.name).await;

        // The index must come from this call's own read, not anything cached
        // earlier in the call chain.
        let Some((index, _)) = self
            .read_values()
            .await?
            .into_iter()
            .find(|(_, stored)| stored.eq_ignore_ascii_case(value))
        else {
            return Err(RecordError::NotFound(value.to_string()));
        };

        self.store.delete_row_range(self.spec.name, index, 1).await?;
        tracing::debug!(table = %self.spec.name, value = %value, "reference entry removed");
        Ok(())
    }
}

/// Two-column rack list; a rack id is unique per warehouse, not globally.
pub struct RackSet {
    store: Arc<dyn RowStore>,
    locks: TableLocks,
}

impl RackSet {
    pub fn new(store: Arc<dyn RowStore>, locks: TableLocks) -> Self {
        Self { store, locks }
    }

    async fn read_entries(&self) -> RecordResult<Vec<(usize, RackEntry)>> {
        let rows = self.store.read_range(RACKS.name, RowRange::All).await?;
        let mut entries = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            match RackEntry::from_row(row) {
                Ok(entry) => entries.push((index, entry)),
                Err(err) => {
                    tracing::warn!(table = %RACKS.name, row = index, error = %err, "skipping undecodable rack row");
                }
            }
        }
        Ok(entries)
    }

    /// List rack entries in insertion order.
    pub async fn list(&self) -> RecordResult<Vec<RackEntry>> {
        Ok(self
            .read_entries()
            .await?
            .into_iter()
            .map(|(_, entry)| entry)
            .collect())
    }

    /// List rack entries for one warehouse.
    pub async fn list_for_warehouse(&self, warehouse: Warehouse) -> RecordResult<Vec<RackEntry>> {
        Ok(self
            .list()
            .await?
            .into_iter()
            .filter(|entry| entry.warehouse == warehouse)
            .collect())
    }

    /// Append a rack, rejecting an id already present in the same warehouse.
    pub async fn add(&self, entry: &RackEntry) -> RecordResult<()> {
        if entry.id.trim().is_empty() {
            return Err(RecordError::Validation(
                "rack id must not be empty".to_string(),
            ));
        }

        let _guard = self.locks.acquire(RACKS.name).await;
        self.store.ensure_header(RACKS.name, RACKS.header).await?;

        let exists = self.read_entries().await?.iter().any(|(_, stored)| {
            stored.warehouse == entry.warehouse && stored.id.eq_ignore_ascii_case(&entry.id)
        });
        if exists {
            return Err(RecordError::DuplicateKey(format!(
                "{} (warehouse {})",
                entry.id, entry.warehouse
            )));
        }

        self.store
            .append_rows(RACKS.name, vec![entry.to_row()])
            .await?;
        Ok(())
    }

    /// Remove a rack from one warehouse by re-resolving its row.
    pub async fn remove(&self, id: &str, warehouse: Warehouse) -> RecordResult<()> {
        let _guard = self.locks.acquire(RACKS.name).await;

        let Some((index, _)) = self.read_entries().await?.into_iter().find(|(_, stored)| {
            stored.warehouse == warehouse && stored.id.eq_ignore_ascii_case(id)
        }) else {
            return Err(RecordError::NotFound(format!(
                "{id} (warehouse {warehouse})"
            )));
        };

        self.store.delete_row_range(RACKS.name, index, 1).await?;
        Ok(())
    }
}
