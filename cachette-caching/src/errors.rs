//! Cache error types

use thiserror::Error;

/// Result type for cache operations
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Cache-related errors
///
/// A miss is never an error: `fetch` returns `Ok(None)` and the drivers that
/// tolerate deleting an absent key return `Ok(())`.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The backend was not compiled in or cannot be used on this host
    #[error("{backend} cache backend is not available: {reason}")]
    BackendUnavailable {
        backend: &'static str,
        reason: String,
    },

    /// `add` found a live entry for the key
    #[error("Cache entry already exists for {key}")]
    EntryExists { key: String },

    /// Add or set failed in the substrate
    #[error("Unable to store cache entry for {key}: {message}")]
    StoreFailure { key: String, message: String },

    /// Fetch or existence check failed in the substrate
    #[error("Unable to fetch cache entry for {key}: {message}")]
    FetchFailure { key: String, message: String },

    /// Delete failed in the substrate
    #[error("Unable to remove cache entry for {key}: {message}")]
    DeleteFailure { key: String, message: String },

    /// Flush failed in the substrate
    #[error("Unable to flush the cache: {message}")]
    FlushFailure { message: String },

    /// The selected backend structurally cannot perform the operation
    #[error("Unsupported cache operation: {0}")]
    UnsupportedOperation(String),
}

/// Error kind, for callers that branch on the class of failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    BackendUnavailable,
    EntryExists,
    StoreFailure,
    FetchFailure,
    DeleteFailure,
    FlushFailure,
    UnsupportedOperation,
}

impl CacheError {
    /// The kind of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            CacheError::BackendUnavailable { .. } => ErrorKind::BackendUnavailable,
            CacheError::EntryExists { .. } => ErrorKind::EntryExists,
            CacheError::StoreFailure { .. } => ErrorKind::StoreFailure,
            CacheError::FetchFailure { .. } => ErrorKind::FetchFailure,
            CacheError::DeleteFailure { .. } => ErrorKind::DeleteFailure,
            CacheError::FlushFailure { .. } => ErrorKind::FlushFailure,
            CacheError::UnsupportedOperation(_) => ErrorKind::UnsupportedOperation,
        }
    }

    pub fn unavailable(backend: &'static str, reason: impl Into<String>) -> Self {
        CacheError::BackendUnavailable {
            backend,
            reason: reason.into(),
        }
    }

    pub fn exists(key: &str) -> Self {
        CacheError::EntryExists {
            key: key.to_string(),
        }
    }

    pub fn store(key: &str, message: impl ToString) -> Self {
        CacheError::StoreFailure {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub fn fetch(key: &str, message: impl ToString) -> Self {
        CacheError::FetchFailure {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub fn delete(key: &str, message: impl ToString) -> Self {
        CacheError::DeleteFailure {
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub fn flush(message: impl ToString) -> Self {
        CacheError::FlushFailure {
            message: message.to_string(),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        CacheError::UnsupportedOperation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_and_message() {
        let err = CacheError::store("user:1", "connection reset");
        assert_eq!(err.kind(), ErrorKind::StoreFailure);
        assert_eq!(
            err.to_string(),
            "Unable to store cache entry for user:1: connection reset"
        );

        let err = CacheError::unavailable("document", "compiled without the `document` feature");
        assert_eq!(err.kind(), ErrorKind::BackendUnavailable);
        assert!(err.to_string().starts_with("document cache backend is not available"));

        assert_eq!(CacheError::exists("k").kind(), ErrorKind::EntryExists);
        assert_eq!(CacheError::unsupported("nope").kind(), ErrorKind::UnsupportedOperation);
    }
}
