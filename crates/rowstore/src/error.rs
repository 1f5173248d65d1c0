//! Row store error types.

use thiserror::Error;

/// Row store operation errors.
#[derive(Debug, Error)]
pub enum RowStoreError {
    #[error("backend unavailable: {0}")]
    Backend(String),

    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("append outcome unknown: {0}")]
    AppendOutcomeUnknown(String),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("header mismatch for table {table}: expected {expected:?}, found {found:?}")]
    HeaderMismatch {
        table: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl RowStoreError {
    /// Whether a retry of the same call could plausibly succeed.
    ///
    /// Covers transport failures, timeouts, rate limiting, and server-side
    /// errors. Client errors (4xx other than 429) and local errors are not
    /// transient.
    pub fn is_transient(&self) -> bool {
        match self {
            RowStoreError::Backend(_) | RowStoreError::Timeout(_) => true,
            RowStoreError::Status { status, .. } => *status == 429 || (500..=599).contains(status),
            _ => false,
        }
    }
}

/// Result type for row store operations.
pub type RowStoreResult<T> = std::result::Result<T, RowStoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(RowStoreError::Backend("connection reset".to_string()).is_transient());
        assert!(RowStoreError::Timeout(std::time::Duration::from_secs(30)).is_transient());
        assert!(RowStoreError::Status {
            status: 429,
            message: "rate limited".to_string()
        }
        .is_transient());
        assert!(RowStoreError::Status {
            status: 503,
            message: "unavailable".to_string()
        }
        .is_transient());
        assert!(!RowStoreError::Status {
            status: 403,
            message: "forbidden".to_string()
        }
        .is_transient());
        assert!(!RowStoreError::InvalidRange("out of bounds".to_string()).is_transient());
    }
}
