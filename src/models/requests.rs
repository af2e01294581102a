use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{EducationLevel, FinancialNeed, ProfileUpdate, ScholarshipId, UserId};

/// Request to update a student's profile
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(range(min = 0, max = 150))]
    #[serde(default)]
    pub age: Option<i32>,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    pub education_level: EducationLevel,
    #[validate(range(min = 0.0, max = 4.0))]
    pub gpa: f64,
    #[validate(length(min = 1, max = 255))]
    pub field_of_study: String,
    pub financial_need: FinancialNeed,
}

impl From<UpdateProfileRequest> for ProfileUpdate {
    fn from(req: UpdateProfileRequest) -> Self {
        Self {
            age: req.age,
            country: req.country,
            education_level: req.education_level,
            gpa: req.gpa,
            field_of_study: req.field_of_study,
            financial_need: req.financial_need,
        }
    }
}

/// Request to record feedback on a suggested scholarship
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FeedbackRequest {
    #[serde(alias = "user_id", rename = "userId")]
    pub user_id: UserId,
    #[serde(alias = "scholarship_id", rename = "scholarshipId")]
    pub scholarship_id: ScholarshipId,
    /// 0 = not relevant, 1 = relevant
    #[validate(range(min = 0, max = 1))]
    pub rating: i16,
}

/// Request to add a scholarship to the catalog
///
/// The embedding is never supplied by the caller; it is computed from the
/// description and field text at insertion time.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateScholarshipRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[validate(range(min = 0))]
    #[serde(default)]
    pub amount: Option<i32>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    #[validate(length(min = 1, max = 100))]
    pub country: String,
    #[validate(range(min = 0.0, max = 4.0))]
    #[serde(default)]
    pub min_gpa: Option<f64>,
    pub education_level: EducationLevel,
    #[serde(default)]
    pub field_of_study: Option<String>,
    #[serde(default)]
    pub financial_criteria: Option<FinancialNeed>,
    #[validate(url)]
    #[serde(default)]
    pub apply_url: Option<String>,
}
