//! Error types for time-series storage access

use thiserror::Error;

/// Errors raised by a [`TimeSeriesStorage`](crate::TimeSeriesStorage) implementation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The store could not be reached (connection refused, reset, timeout)
    #[error("Network error: {0}")]
    Network(String),

    /// The store answered with a non-success HTTP status
    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// The store answered but the payload could not be decoded
    #[error("Parse error: {0}")]
    Parse(String),

    /// The store rejected the query itself
    #[error("Query error: {0}")]
    Query(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StorageError {
    pub fn network(msg: impl Into<String>) -> Self {
        StorageError::Network(msg.into())
    }

    pub fn api(status: u16, message: impl Into<String>) -> Self {
        StorageError::Api {
            status,
            message: message.into(),
        }
    }

    pub fn parse(msg: impl Into<String>) -> Self {
        StorageError::Parse(msg.into())
    }

    pub fn query(msg: impl Into<String>) -> Self {
        StorageError::Query(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        StorageError::Internal(msg.into())
    }

    /// Whether the failure is a temporary unreachability of the store.
    ///
    /// Only these errors are eligible for retry; everything else points at
    /// malformed data or a programming error and must surface immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            StorageError::Network(_) => true,
            // 5xx: store restarting or overloaded
            StorageError::Api { status, .. } => *status >= 500,
            StorageError::Parse(_) | StorageError::Query(_) | StorageError::Internal(_) => false,
        }
    }
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(StorageError::network("connection refused").is_transient());
        assert!(StorageError::api(503, "service unavailable").is_transient());
        assert!(StorageError::api(500, "boom").is_transient());

        assert!(!StorageError::api(400, "bad request").is_transient());
        assert!(!StorageError::api(404, "database not found").is_transient());
        assert!(!StorageError::parse("unexpected column").is_transient());
        assert!(!StorageError::query("error parsing query").is_transient());
        assert!(!StorageError::internal("bug").is_transient());
    }

    #[test]
    fn test_display() {
        let err = StorageError::api(502, "bad gateway");
        assert_eq!(err.to_string(), "API error (status 502): bad gateway");
    }
}
