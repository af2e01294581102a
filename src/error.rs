use thiserror::Error;

use crate::services::StorageError;

/// Errors surfaced by the matching core
#[derive(Debug, Error)]
pub enum MatchError {
    /// The referenced user or scholarship does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The persistence layer failed; the request is abandoned, not retried
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] StorageError),

    /// A scholarship lacks a usable precomputed embedding
    #[error("Invalid embedding for scholarship '{scholarship}': {reason}")]
    InvalidEmbeddingState { scholarship: String, reason: String },
}

impl From<StorageError> for MatchError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => MatchError::NotFound(what),
            other => MatchError::StorageUnavailable(other),
        }
    }
}
