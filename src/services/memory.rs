use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::models::{
    FeedbackId, FeedbackRating, NewFeedback, NewScholarship, ProfileUpdate, Scholarship,
    ScholarshipId, UserId, UserProfile,
};
use crate::services::storage::{Storage, StorageError};

/// Feedback row kept by [`InMemoryStore`]
#[derive(Debug, Clone, PartialEq)]
pub struct StoredFeedback {
    pub id: FeedbackId,
    pub user_id: UserId,
    pub scholarship_id: ScholarshipId,
    pub rating: FeedbackRating,
}

#[derive(Default)]
struct Tables {
    users: Vec<UserProfile>,
    scholarships: Vec<Scholarship>,
    feedback: Vec<StoredFeedback>,
}

impl Tables {
    fn next_scholarship_id(&self) -> ScholarshipId {
        self.scholarships.iter().map(|s| s.id).max().unwrap_or(0) + 1
    }

    fn push_scholarship(&mut self, scholarship: &NewScholarship) -> ScholarshipId {
        let id = self.next_scholarship_id();
        self.scholarships.push(Scholarship {
            id,
            name: scholarship.name.clone(),
            description: scholarship.description.clone(),
            amount: scholarship.amount,
            deadline: scholarship.deadline,
            country: scholarship.country.clone(),
            min_gpa: scholarship.min_gpa,
            education_level: scholarship.education_level,
            field_of_study: scholarship.field_of_study.clone(),
            financial_criteria: scholarship.financial_criteria,
            apply_url: scholarship.apply_url.clone(),
            embedding: Some(scholarship.embedding.clone()),
            embedding_model: Some(scholarship.embedding_model.clone()),
            created_at: Some(Utc::now()),
        });
        id
    }
}

/// Process-local store, used for tests and for running without PostgreSQL
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a user as the authentication layer would at registration
    ///
    /// The id on the given profile is ignored; the assigned id is returned.
    pub async fn add_user(&self, mut user: UserProfile) -> UserId {
        let mut tables = self.tables.write().await;
        let id = tables.users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        user.id = id;
        if user.created_at.is_none() {
            user.created_at = Some(Utc::now());
        }
        tables.users.push(user);
        id
    }

    /// Add a catalog row as-is, bypassing embedding checks
    pub async fn add_scholarship(&self, mut scholarship: Scholarship) -> ScholarshipId {
        let mut tables = self.tables.write().await;
        let id = tables.next_scholarship_id();
        scholarship.id = id;
        tables.scholarships.push(scholarship);
        id
    }

    pub async fn feedback(&self) -> Vec<StoredFeedback> {
        self.tables.read().await.feedback.clone()
    }
}

#[async_trait]
impl Storage for InMemoryStore {
    async fn get_user(&self, id: UserId) -> Result<UserProfile, StorageError> {
        self.tables
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("user {}", id)))
    }

    async fn list_scholarships(&self) -> Result<Vec<Scholarship>, StorageError> {
        Ok(self.tables.read().await.scholarships.clone())
    }

    async fn update_user(&self, id: UserId, update: &ProfileUpdate) -> Result<(), StorageError> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| StorageError::NotFound(format!("user {}", id)))?;

        user.age = update.age;
        user.country = Some(update.country.clone());
        user.education_level = Some(update.education_level);
        // NUMERIC(3, 2) keeps two decimals
        user.gpa = Some((update.gpa * 100.0).round() / 100.0);
        user.field_of_study = Some(update.field_of_study.clone());
        user.financial_need = Some(update.financial_need);

        Ok(())
    }

    async fn insert_feedback(&self, feedback: &NewFeedback) -> Result<FeedbackId, StorageError> {
        let mut tables = self.tables.write().await;

        let user_exists = tables.users.iter().any(|u| u.id == feedback.user_id);
        let scholarship_exists = tables
            .scholarships
            .iter()
            .any(|s| s.id == feedback.scholarship_id);
        if !user_exists || !scholarship_exists {
            return Err(StorageError::NotFound(format!(
                "user {} or scholarship {}",
                feedback.user_id, feedback.scholarship_id
            )));
        }

        let id = tables.feedback.len() as FeedbackId + 1;
        tables.feedback.push(StoredFeedback {
            id,
            user_id: feedback.user_id,
            scholarship_id: feedback.scholarship_id,
            rating: feedback.rating,
        });

        Ok(id)
    }

    async fn insert_scholarship(&self, scholarship: &NewScholarship) -> Result<ScholarshipId, StorageError> {
        let mut tables = self.tables.write().await;
        Ok(tables.push_scholarship(scholarship))
    }

    async fn seed_scholarships(&self, records: &[NewScholarship]) -> Result<usize, StorageError> {
        let mut tables = self.tables.write().await;
        if !tables.scholarships.is_empty() {
            return Ok(0);
        }

        for record in records {
            tables.push_scholarship(record);
        }

        Ok(records.len())
    }

    async fn count_scholarships(&self) -> Result<i64, StorageError> {
        Ok(self.tables.read().await.scholarships.len() as i64)
    }

    async fn health_check(&self) -> Result<bool, StorageError> {
        Ok(true)
    }
}
