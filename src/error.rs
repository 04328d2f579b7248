//! Error types for storage providers and the persistence store
//!
//! None of these are fatal: callers log them and carry on with
//! in-memory state.

use thiserror::Error;

/// Failure reported by a [`StorageProvider`](crate::platform::storage::StorageProvider)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// No durable storage in this execution context (no window, storage disabled)
    #[error("durable storage is unavailable")]
    Unavailable,
    /// The backend rejected a write or delete (quota exceeded, policy)
    #[error("storage write failed: {0}")]
    Write(String),
}

/// Failure reported by [`PersistenceStore`](crate::persistence::PersistenceStore)
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("durable storage is unavailable")]
    Unavailable,
    #[error("failed to write saved worksheet: {0}")]
    Write(String),
    #[error("failed to serialize worksheet: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Unavailable => StoreError::Unavailable,
            StorageError::Write(msg) => StoreError::Write(msg),
        }
    }
}

/// Rejected field update on the worksheet
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("unknown field `{0}`")]
    UnknownField(String),
    #[error("field `{0}` does not hold a score")]
    NotScore(&'static str),
    #[error("score {value} for `{field}` is outside 0..=10")]
    ScoreOutOfRange { field: &'static str, value: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_maps_to_store_error() {
        assert!(matches!(
            StoreError::from(StorageError::Unavailable),
            StoreError::Unavailable
        ));
        match StoreError::from(StorageError::Write("QuotaExceededError".into())) {
            StoreError::Write(msg) => assert_eq!(msg, "QuotaExceededError"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_messages() {
        let err = FieldError::ScoreOutOfRange {
            field: "step1Intensity",
            value: 11,
        };
        assert_eq!(
            err.to_string(),
            "score 11 for `step1Intensity` is outside 0..=10"
        );
    }
}
