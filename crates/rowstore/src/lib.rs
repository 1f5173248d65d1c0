//! Row store abstraction and backends for stockroom.
//!
//! This crate provides:
//! - The [`RowStore`] trait: range reads, appends, whole-row overwrites, and
//!   index-based deletes over a named logical table
//! - Backends: in-memory and a remote spreadsheet values API
//! - A bounded-retry decorator for transient backend failures

pub mod backends;
pub mod error;
pub mod retry;
pub mod traits;

pub use backends::{memory::MemoryBackend, sheets::SheetsBackend};
pub use error::{RowStoreError, RowStoreResult};
pub use retry::RetryingStore;
pub use traits::{RowRange, RowStore};

use std::sync::Arc;
use stockroom_core::{BackendConfig, RetryConfig};

/// Create a row store from configuration.
///
/// The returned store is wrapped with the retry policy when `retry`
/// allows more than one attempt.
pub fn from_config(
    backend: &BackendConfig,
    retry: &RetryConfig,
) -> RowStoreResult<Arc<dyn RowStore>> {
    backend.validate().map_err(RowStoreError::Config)?;

    let store: Arc<dyn RowStore> = match backend {
        BackendConfig::Memory => Arc::new(MemoryBackend::new()),
        BackendConfig::Sheets {
            base_url,
            spreadsheet_id,
            api_token,
            ..
        } => Arc::new(SheetsBackend::new(
            base_url,
            spreadsheet_id,
            api_token.clone(),
            backend.request_timeout(),
        )?),
    };

    if retry.max_attempts > 1 {
        Ok(Arc::new(RetryingStore::new(store, retry)))
    } else {
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_config_memory_ok() {
        let store = from_config(&BackendConfig::Memory, &RetryConfig::default()).unwrap();
        store.append_rows("T", vec![vec!["a".to_string()]]).await.unwrap();
        assert_eq!(store.read_range("T", RowRange::All).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn from_config_sheets_ok() {
        let backend = BackendConfig::Sheets {
            base_url: "https://sheets.example.com".to_string(),
            spreadsheet_id: "doc".to_string(),
            api_token: Some("token".to_string()),
            request_timeout_secs: 5,
        };
        let store = from_config(&backend, &RetryConfig::default()).unwrap();
        assert_eq!(store.backend_name(), "sheets");
    }

    #[test]
    fn from_config_rejects_empty_spreadsheet_id() {
        let backend = BackendConfig::Sheets {
            base_url: "https://sheets.example.com".to_string(),
            spreadsheet_id: String::new(),
            api_token: None,
            request_timeout_secs: 5,
        };
        match from_config(&backend, &RetryConfig::default()) {
            Ok(_) => panic!("expected error"),
            Err(RowStoreError::Config(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
        }
    }
}
