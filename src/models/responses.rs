use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub embedding_model: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Generic success acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Feedback recorded
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackResponse {
    pub success: bool,
    #[serde(rename = "feedbackId")]
    pub feedback_id: i64,
}

/// Scholarship added to the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScholarshipResponse {
    pub success: bool,
    #[serde(rename = "scholarshipId")]
    pub scholarship_id: i64,
}
