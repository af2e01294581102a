// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BonusWeights, EducationLevel, FeedbackId, FeedbackRating, FinancialNeed, MatchResult,
    NewFeedback, NewScholarship, ParseEnumError, ProfileUpdate, Scholarship, ScholarshipId,
    UserId, UserProfile, GLOBAL_COUNTRY,
};
pub use requests::{CreateScholarshipRequest, FeedbackRequest, UpdateProfileRequest};
pub use responses::{
    CreateScholarshipResponse, ErrorResponse, FeedbackResponse, HealthResponse, SuccessResponse,
};
