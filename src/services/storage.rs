use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    FeedbackId, NewFeedback, NewScholarship, ProfileUpdate, Scholarship, ScholarshipId, UserId,
    UserProfile,
};

/// Errors that can occur when talking to the persistence layer
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Persistence operations the matching service depends on
///
/// Every call is request-scoped: implementations acquire whatever connection
/// they need for the duration of the call and release it before returning.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Load a student profile; `StorageError::NotFound` if absent
    async fn get_user(&self, id: UserId) -> Result<UserProfile, StorageError>;

    /// Load the whole catalog in insertion order
    async fn list_scholarships(&self) -> Result<Vec<Scholarship>, StorageError>;

    /// Replace the academic fields of a profile; `NotFound` if the user is absent
    async fn update_user(&self, id: UserId, update: &ProfileUpdate) -> Result<(), StorageError>;

    /// Record feedback; `NotFound` if the user or scholarship is absent
    async fn insert_feedback(&self, feedback: &NewFeedback) -> Result<FeedbackId, StorageError>;

    /// Add a catalog entry whose embedding has already been computed
    async fn insert_scholarship(&self, scholarship: &NewScholarship) -> Result<ScholarshipId, StorageError>;

    /// Insert all records in one unit, but only into an empty catalog
    ///
    /// Returns the number inserted; 0 when the catalog already had rows.
    async fn seed_scholarships(&self, records: &[NewScholarship]) -> Result<usize, StorageError>;

    async fn count_scholarships(&self) -> Result<i64, StorageError>;

    async fn health_check(&self) -> Result<bool, StorageError>;
}
