//! Core domain types and shared logic for the stockroom inventory store.
//!
//! This crate defines the vocabulary used across all other crates:
//! - Warehouse tags and their storage encoding
//! - Actor identity attached to every audited mutation
//! - Configuration types and loading

pub mod actor;
pub mod config;
pub mod error;
pub mod warehouse;

pub use actor::Actor;
pub use config::{AppConfig, BackendConfig, QueryConfig, RetryConfig};
pub use error::{Error, Result};
pub use warehouse::Warehouse;

/// Default page size for client-facing listings.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Maximum page size accepted from callers.
pub const MAX_PAGE_SIZE: usize = 100;
