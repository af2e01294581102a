use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::MatchPipeline;
use crate::error::MatchError;
use crate::models::{
    CreateScholarshipRequest, CreateScholarshipResponse, ErrorResponse, FeedbackRating,
    FeedbackRequest, FeedbackResponse, HealthResponse, NewFeedback, ProfileUpdate,
    SuccessResponse, UpdateProfileRequest, UserId,
};
use crate::routes::auth::Caller;
use crate::services::catalog;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub pipeline: MatchPipeline,
}

/// Configure all matching-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/{user_id}", web::get().to(get_matches))
        .route("/profile/{user_id}", web::put().to(update_profile))
        .route("/feedback", web::post().to(submit_feedback))
        .route("/scholarships", web::post().to(create_scholarship));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let storage_healthy = state.pipeline.storage().health_check().await.unwrap_or(false);

    let status = if storage_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        embedding_model: state.pipeline.embedder().model_name().to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Top scholarship matches for a user
///
/// GET /api/v1/matches/{user_id}
///
/// Responds with at most three scholarships, best first, each carrying an
/// integer `confidence` between 30 and 100.
async fn get_matches(
    state: web::Data<AppState>,
    path: web::Path<UserId>,
    caller: Caller,
) -> HttpResponse {
    let user_id = path.into_inner();
    if let Err(e) = caller.authorize(user_id) {
        return actix_web::ResponseError::error_response(&e);
    }

    tracing::info!("Finding matches for user: {}", user_id);

    match state.pipeline.compute_matches(user_id).await {
        Ok(matches) => HttpResponse::Ok().json(matches),
        Err(e) => match_error_response("Matching failed", e),
    }
}

/// Update profile endpoint
///
/// PUT /api/v1/profile/{user_id}
///
/// Request body:
/// ```json
/// {
///   "age": 20,
///   "country": "USA",
///   "education_level": "Undergraduate",
///   "gpa": 3.6,
///   "field_of_study": "Computer Science",
///   "financial_need": "High"
/// }
/// ```
async fn update_profile(
    state: web::Data<AppState>,
    path: web::Path<UserId>,
    caller: Caller,
    req: web::Json<UpdateProfileRequest>,
) -> HttpResponse {
    let user_id = path.into_inner();
    if let Err(e) = caller.authorize(user_id) {
        return actix_web::ResponseError::error_response(&e);
    }

    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for profile update of {}: {:?}", user_id, errors);
        return validation_error(errors);
    }

    let update = ProfileUpdate::from(req.into_inner());

    match state.pipeline.storage().update_user(user_id, &update).await {
        Ok(()) => HttpResponse::Ok().json(SuccessResponse { success: true }),
        Err(e) => match_error_response("Profile update failed", e.into()),
    }
}

/// Record feedback endpoint
///
/// POST /api/v1/feedback
///
/// Request body:
/// ```json
/// {
///   "userId": 1,
///   "scholarshipId": 3,
///   "rating": 1
/// }
/// ```
async fn submit_feedback(
    state: web::Data<AppState>,
    caller: Caller,
    req: web::Json<FeedbackRequest>,
) -> HttpResponse {
    if let Err(e) = caller.authorize(req.user_id) {
        return actix_web::ResponseError::error_response(&e);
    }

    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let Some(rating) = FeedbackRating::from_score(req.rating) else {
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Invalid rating".to_string(),
            message: "Rating must be 0 or 1".to_string(),
            status_code: 400,
        });
    };

    let feedback = NewFeedback {
        user_id: req.user_id,
        scholarship_id: req.scholarship_id,
        rating,
    };

    match state.pipeline.storage().insert_feedback(&feedback).await {
        Ok(feedback_id) => {
            tracing::debug!(
                "Recorded feedback {} -> {} ({:?})",
                feedback.user_id,
                feedback.scholarship_id,
                feedback.rating
            );
            HttpResponse::Ok().json(FeedbackResponse {
                success: true,
                feedback_id,
            })
        }
        Err(e) => match_error_response("Feedback submission failed", e.into()),
    }
}

/// Add a scholarship to the catalog
///
/// POST /api/v1/scholarships
///
/// Restricted to administrator tokens. The embedding is computed here, once,
/// from the description and field text.
async fn create_scholarship(
    state: web::Data<AppState>,
    caller: Caller,
    req: web::Json<CreateScholarshipRequest>,
) -> HttpResponse {
    if let Err(e) = caller.authorize_admin() {
        tracing::info!("Refused catalog write from {:?}", caller.subject());
        return actix_web::ResponseError::error_response(&e);
    }

    if let Err(errors) = req.validate() {
        return validation_error(errors);
    }

    let result = catalog::add_scholarship(
        state.pipeline.storage().as_ref(),
        state.pipeline.embedder().as_ref(),
        req.into_inner(),
    )
    .await;

    match result {
        Ok(scholarship_id) => HttpResponse::Created().json(CreateScholarshipResponse {
            success: true,
            scholarship_id,
        }),
        Err(e) => match_error_response("Scholarship creation failed", e),
    }
}

fn validation_error(errors: validator::ValidationErrors) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "Validation failed".to_string(),
        message: errors.to_string(),
        status_code: 400,
    })
}

/// Map a core error onto an HTTP response
fn match_error_response(context: &str, err: MatchError) -> HttpResponse {
    match err {
        MatchError::NotFound(what) => HttpResponse::NotFound().json(ErrorResponse {
            error: "Not found".to_string(),
            message: format!("{} not found", what),
            status_code: 404,
        }),
        MatchError::StorageUnavailable(e) => {
            tracing::error!("{}: {}", context, e);
            HttpResponse::ServiceUnavailable().json(ErrorResponse {
                error: context.to_string(),
                message: "Storage unavailable".to_string(),
                status_code: 503,
            })
        }
        e @ MatchError::InvalidEmbeddingState { .. } => {
            tracing::warn!("{}: {}", context, e);
            HttpResponse::UnprocessableEntity().json(ErrorResponse {
                error: context.to_string(),
                message: e.to_string(),
                status_code: 422,
            })
        }
    }
}
