//! Append-only audit trail.

use crate::error::RecordResult;
use crate::models::{ActivityAction, ActivityLogEntry, ChangeSet, EntityKind};
use crate::query::{paginate, Page};
use crate::tables::{TableRecord, ACTIVITY_LOGS};
use std::sync::Arc;
use stockroom_core::Actor;
use stockroom_rowstore::RowStore;
use time::OffsetDateTime;

/// The audit trail of mutations: who changed what, and when.
///
/// Entries are only ever appended; nothing mutates or deletes them in normal
/// operation, so no table lock is needed. The read side loads the full table
/// per query and filters in memory, the accepted cost of a backend with no
/// indexing.
pub struct ActivityLog {
    store: Arc<dyn RowStore>,
}

impl ActivityLog {
    /// Create a log over an injected store.
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    /// Build an entry stamped with the current time.
    ///
    /// The id is the unix-millisecond timestamp: monotonic-ish and unique
    /// enough for display, with no identity role in the log contract.
    pub fn entry(
        action: ActivityAction,
        entity_type: EntityKind,
        entity_id: &str,
        changes: ChangeSet,
        actor: &Actor,
    ) -> ActivityLogEntry {
        let timestamp = OffsetDateTime::now_utc();
        let id = (timestamp.unix_timestamp_nanos() / 1_000_000).to_string();
        ActivityLogEntry {
            id,
            timestamp,
            action,
            entity_type,
            entity_id: entity_id.to_string(),
            changes,
            actor: actor.clone(),
        }
    }

    /// Append an entry.
    pub async fn append(&self, entry: &ActivityLogEntry) -> RecordResult<()> {
        self.store
            .ensure_header(ACTIVITY_LOGS.name, ACTIVITY_LOGS.header)
            .await?;
        self.store
            .append_rows(ACTIVITY_LOGS.name, vec![entry.to_row()])
            .await?;
        Ok(())
    }

    /// Query the full log: filter, sort descending by timestamp, paginate.
    pub async fn query(
        &self,
        filter: &LogFilter,
        page: usize,
        page_size: usize,
    ) -> RecordResult<Page<ActivityLogEntry>> {
        let rows = self
            .store
            .read_range(ACTIVITY_LOGS.name, stockroom_rowstore::RowRange::All)
            .await?;

        let mut entries = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.iter().all(|cell| cell.trim().is_empty()) {
                continue;
            }
            match ActivityLogEntry::from_row(row) {
                Ok(entry) => {
                    if filter.matches(&entry) {
                        entries.push(entry);
                    }
                }
                Err(err) => {
                    tracing::warn!(table = %ACTIVITY_LOGS.name, row = index, error = %err, "skipping undecodable log row");
                }
            }
        }

        entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(paginate(entries, page, page_size))
    }
}

/// Read-side log filter; unset fields match everything.
#[derive(Clone, Debug, Default)]
pub struct LogFilter {
    pub action: Option<ActivityAction>,
    pub entity_type: Option<EntityKind>,
    /// Case-insensitive substring over actor id, name, and email.
    pub actor: Option<String>,
    pub from: Option<OffsetDateTime>,
    pub until: Option<OffsetDateTime>,
}

impl LogFilter {
    fn matches(&self, entry: &ActivityLogEntry) -> bool {
        if let Some(action) = self.action {
            if entry.action != action {
                return false;
            }
        }
        if let Some(entity_type) = self.entity_type {
            if entry.entity_type != entity_type {
                return false;
            }
        }
        if let Some(actor) = &self.actor {
            let needle = actor.trim().to_lowercase();
            if !needle.is_empty() && !entry.actor.search_text().contains(&needle) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if entry.timestamp < from {
                return false;
            }
        }
        if let Some(until) = self.until {
            if entry.timestamp > until {
                return false;
            }
        }
        true
    }
}
