//! Per-table write serialization.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of write locks, one per logical table.
///
/// The backing store has no locking of its own, and every mutating repository
/// operation spans several round trips (read to locate, then mutate by
/// index). Serializing writers per table keeps the index resolved inside an
/// operation valid against every other in-process writer. Reads deliberately
/// skip the lock: a stale read is acceptable, a stale write index is not.
///
/// A trash table shares its primary table's lock, so a two-step move between
/// the pair is atomic with respect to other writers of the same pair.
#[derive(Clone, Default)]
pub struct TableLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl TableLocks {
    /// Create an empty lock registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the write lock for a table, creating it on first use.
    pub async fn acquire(&self, table: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().await;
            map.entry(table.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }
}
