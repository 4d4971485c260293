//! Feedback API
//!
//! User submission, the public published list, and admin publishing.

use axum::{
    extract::{Path, State},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::feedback::entity::{rating_in_range, Feedback, MAX_RATING, MIN_RATING};
use crate::feedback::repository::FeedbackRepository;
use crate::audit::AuditService;
use crate::shared::api_common::SuccessResponse;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// Feedback submission request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    /// Star rating, 1 to 5
    pub rating: i32,
    pub message: String,
}

/// Feedback response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub id: String,
    pub user_name: String,
    pub rating: i32,
    pub message: String,
    pub published: bool,
    pub created_at: String,
}

impl From<Feedback> for FeedbackResponse {
    fn from(f: Feedback) -> Self {
        Self {
            id: f.id,
            user_name: f.user_name,
            rating: f.rating,
            message: f.message,
            published: f.published,
            created_at: f.created_at.to_rfc3339(),
        }
    }
}

/// Feedback service state
#[derive(Clone)]
pub struct FeedbackState {
    pub feedback_repo: Arc<FeedbackRepository>,
    pub audit_service: Arc<AuditService>,
}

/// Submit feedback
#[utoipa::path(
    post,
    path = "",
    tag = "feedback",
    operation_id = "postApiFeedback",
    request_body = SubmitFeedbackRequest,
    responses(
        (status = 200, description = "Feedback submitted", body = FeedbackResponse),
        (status = 400, description = "Rating out of range or empty message")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_feedback(
    State(state): State<FeedbackState>,
    auth: Authenticated,
    Json(request): Json<SubmitFeedbackRequest>,
) -> Result<Json<FeedbackResponse>, PlatformError> {
    if !rating_in_range(request.rating) {
        return Err(PlatformError::validation(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }
    let message = request.message.trim();
    if message.is_empty() {
        return Err(PlatformError::validation("Feedback message is required"));
    }

    let feedback = Feedback::new(&auth.principal_id, &auth.name, request.rating, message);
    state.feedback_repo.insert(&feedback).await?;
    state.audit_service.log_create(&auth.0, "Feedback", &feedback.id, "SubmitFeedback").await?;

    Ok(Json(feedback.into()))
}

/// Published feedback for the landing page (public)
#[utoipa::path(
    get,
    path = "",
    tag = "feedback",
    operation_id = "getApiFeedback",
    responses(
        (status = 200, description = "Published feedback", body = Vec<FeedbackResponse>)
    )
)]
pub async fn list_published_feedback(
    State(state): State<FeedbackState>,
) -> Result<Json<Vec<FeedbackResponse>>, PlatformError> {
    let entries = state.feedback_repo.find_published().await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// List all feedback (admin)
#[utoipa::path(
    get,
    path = "",
    tag = "admin-feedback",
    operation_id = "getApiAdminFeedback",
    responses(
        (status = 200, description = "All feedback", body = Vec<FeedbackResponse>),
        (status = 403, description = "Missing permission")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_all_feedback(
    State(state): State<FeedbackState>,
    auth: Authenticated,
) -> Result<Json<Vec<FeedbackResponse>>, PlatformError> {
    crate::checks::can_view_feedback(&auth.0)?;

    let entries = state.feedback_repo.find_all().await?;
    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Publish a feedback entry (admin)
#[utoipa::path(
    post,
    path = "/{id}/publish",
    tag = "admin-feedback",
    operation_id = "postApiAdminFeedbackByIdPublish",
    params(
        ("id" = String, Path, description = "Feedback ID")
    ),
    responses(
        (status = 200, description = "Feedback published", body = SuccessResponse),
        (status = 404, description = "Feedback not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn publish_feedback(
    State(state): State<FeedbackState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::checks::can_view_feedback(&auth.0)?;

    let mut feedback = state.feedback_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::not_found("Feedback", &id))?;

    feedback.publish();
    state.feedback_repo.update(&feedback).await?;
    state.audit_service.log_update(&auth.0, "Feedback", &id, "PublishFeedback").await?;

    info!(feedback_id = %id, admin = %auth.principal_id, "Feedback published");

    Ok(Json(SuccessResponse::with_message("Feedback published")))
}

/// Unpublish a feedback entry (admin)
#[utoipa::path(
    post,
    path = "/{id}/unpublish",
    tag = "admin-feedback",
    operation_id = "postApiAdminFeedbackByIdUnpublish",
    params(
        ("id" = String, Path, description = "Feedback ID")
    ),
    responses(
        (status = 200, description = "Feedback unpublished", body = SuccessResponse),
        (status = 404, description = "Feedback not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn unpublish_feedback(
    State(state): State<FeedbackState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::checks::can_view_feedback(&auth.0)?;

    let mut feedback = state.feedback_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::not_found("Feedback", &id))?;

    feedback.unpublish();
    state.feedback_repo.update(&feedback).await?;
    state.audit_service.log_update(&auth.0, "Feedback", &id, "UnpublishFeedback").await?;

    Ok(Json(SuccessResponse::with_message("Feedback unpublished")))
}

/// Create the public/user feedback router (mounted under /api/feedback)
pub fn feedback_router(state: FeedbackState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(submit_feedback))
        .routes(routes!(list_published_feedback))
        .with_state(state)
}

/// Create the admin feedback router (mounted under /api/admin/feedback)
pub fn admin_feedback_router(state: FeedbackState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_all_feedback))
        .routes(routes!(publish_feedback))
        .routes(routes!(unpublish_feedback))
        .with_state(state)
}
