//! Keyed record repositories, reference sets, and the audit trail for
//! stockroom.
//!
//! This crate turns the row store's four primitives (range read, append,
//! whole-row overwrite, index delete) into a small transactional table
//! store:
//! - [`KeyedRepository`]: CRUD plus soft-delete/restore/purge over a
//!   primary/trash table pair
//! - [`ReferenceSet`] / [`RackSet`]: flat lookup lists with best-effort
//!   uniqueness
//! - [`ActivityLog`]: append-only audit trail with in-memory querying
//! - [`InventoryService`]: the wired operations surface for UI/API callers

pub mod activity;
pub mod error;
pub mod keyed;
pub mod locks;
pub mod models;
pub mod query;
pub mod reference;
pub mod service;
pub mod tables;

pub use activity::{ActivityLog, LogFilter};
pub use error::{RecordError, RecordResult};
pub use keyed::KeyedRepository;
pub use locks::TableLocks;
pub use models::{
    ActivityAction, ActivityLogEntry, Campaign, CampaignStatus, ChangeSet, EntityKind, Product,
    RackEntry,
};
pub use query::{paginate, Page, ProductFilter};
pub use reference::{RackSet, ReferenceSet};
pub use service::InventoryService;
pub use tables::{TableRecord, TableSpec};
