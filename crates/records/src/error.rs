//! Record store error types.

use stockroom_rowstore::RowStoreError;
use thiserror::Error;

/// Record store operation errors.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("row store error: {0}")]
    Store(#[from] RowStoreError),

    /// A two-step move (append to the target table, delete from the source)
    /// completed its append but failed its delete, leaving the key present in
    /// both tables. Not rolled back automatically; `stage` names the step to
    /// retry or reconcile.
    #[error("record {key} left in both tables after failed {stage}")]
    InconsistentState { key: String, stage: &'static str },

    #[error("internal error: {0}")]
    Internal(String),
}

impl RecordError {
    /// Whether the caller may retry the whole operation unchanged.
    ///
    /// Inconsistent-state failures must not be retried blindly; the first
    /// step already happened.
    pub fn is_retryable(&self) -> bool {
        match self {
            RecordError::Store(err) => err.is_transient(),
            _ => false,
        }
    }
}

/// Result type for record store operations.
pub type RecordResult<T> = std::result::Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_transient_store_errors_are_retryable() {
        assert!(RecordError::Store(RowStoreError::Backend("reset".to_string())).is_retryable());
        assert!(!RecordError::NotFound("SKU-1".to_string()).is_retryable());
        assert!(!RecordError::InconsistentState {
            key: "SKU-1".to_string(),
            stage: "delete from primary",
        }
        .is_retryable());
    }
}
