//! In-memory row store backend.

use crate::error::{RowStoreError, RowStoreResult};
use crate::traits::{RowRange, RowStore};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// One logical table held in memory.
#[derive(Clone, Debug, Default)]
struct MemTable {
    header: Option<Vec<String>>,
    rows: Vec<Vec<String>>,
}

/// In-memory row store.
///
/// Volatile and process-local; used as the substitute store in repository
/// tests and for offline operation. Mutations take a write lock per call, so
/// each individual call is atomic, matching the remote backend's behavior of
/// applying each request as a unit.
#[derive(Default)]
pub struct MemoryBackend {
    tables: RwLock<HashMap<String, MemTable>>,
}

impl MemoryBackend {
    /// Create an empty in-memory backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of data rows currently stored in a table.
    ///
    /// Test convenience; the trait deliberately has no count operation.
    pub async fn row_count(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map(|t| t.rows.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl RowStore for MemoryBackend {
    async fn read_range(&self, table: &str, range: RowRange) -> RowStoreResult<Vec<Vec<String>>> {
        let tables = self.tables.read().await;
        let Some(mem) = tables.get(table) else {
            return Ok(Vec::new());
        };

        match range {
            RowRange::Header => Ok(mem.header.clone().map(|h| vec![h]).unwrap_or_default()),
            RowRange::All => Ok(mem.rows.clone()),
            RowRange::Slice { start, count } => {
                if start >= mem.rows.len() {
                    return Ok(Vec::new());
                }
                let end = start.saturating_add(count).min(mem.rows.len());
                Ok(mem.rows[start..end].to_vec())
            }
        }
    }

    async fn append_rows(&self, table: &str, rows: Vec<Vec<String>>) -> RowStoreResult<()> {
        let mut tables = self.tables.write().await;
        let mem = tables.entry(table.to_string()).or_default();
        mem.rows.extend(rows);
        Ok(())
    }

    async fn update_row_range(
        &self,
        table: &str,
        row_index: usize,
        rows: Vec<Vec<String>>,
    ) -> RowStoreResult<()> {
        let mut tables = self.tables.write().await;
        let mem = tables.get_mut(table).ok_or_else(|| {
            RowStoreError::InvalidRange(format!("table {table} has no rows to update"))
        })?;

        let end = row_index.saturating_add(rows.len());
        if end > mem.rows.len() {
            return Err(RowStoreError::InvalidRange(format!(
                "update of rows {row_index}..{end} exceeds table {table} ({} rows)",
                mem.rows.len()
            )));
        }

        for (offset, row) in rows.into_iter().enumerate() {
            mem.rows[row_index + offset] = row;
        }
        Ok(())
    }

    async fn delete_row_range(
        &self,
        table: &str,
        start_index: usize,
        count: usize,
    ) -> RowStoreResult<()> {
        let mut tables = self.tables.write().await;
        let mem = tables.get_mut(table).ok_or_else(|| {
            RowStoreError::InvalidRange(format!("table {table} has no rows to delete"))
        })?;

        let end = start_index.saturating_add(count);
        if end > mem.rows.len() {
            return Err(RowStoreError::InvalidRange(format!(
                "delete of rows {start_index}..{end} exceeds table {table} ({} rows)",
                mem.rows.len()
            )));
        }

        // Subsequent rows shift up, same as a row deletion on the remote API.
        mem.rows.drain(start_index..end);
        Ok(())
    }

    async fn ensure_header(&self, table: &str, header: &[&str]) -> RowStoreResult<()> {
        let mut tables = self.tables.write().await;
        let mem = tables.entry(table.to_string()).or_default();

        match &mem.header {
            None => {
                mem.header = Some(header.iter().map(|c| c.to_string()).collect());
                Ok(())
            }
            Some(found) => {
                if found.iter().map(String::as_str).eq(header.iter().copied()) {
                    Ok(())
                } else {
                    Err(RowStoreError::HeaderMismatch {
                        table: table.to_string(),
                        expected: header.iter().map(|c| c.to_string()).collect(),
                        found: found.clone(),
                    })
                }
            }
        }
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
