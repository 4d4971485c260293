//! KYC API
//!
//! User submission endpoints and the admin review endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

use crate::kyc::entity::{DocumentType, KycRecord, KycStatus};
use crate::kyc::repository::KycRepository;
use crate::kyc::operations::{
    AdminEditKycCommand, AdminEditKycUseCase,
    KycDecision,
    ReviewKycCommand, ReviewKycUseCase,
    SubmitKycCommand, SubmitKycUseCase,
};
use crate::notification::NotificationEmitter;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseResult};
use crate::checks;

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// KYC submission request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitKycRequest {
    pub full_name: String,
    pub date_of_birth: String,
    pub address: String,
    /// One of AADHAAR, PAN, PASSPORT, DRIVING_LICENSE, VOTER_ID
    pub document_type: String,
    pub document_number: String,
    pub document_url: String,
}

/// Admin review request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewKycRequest {
    /// "APPROVE" or "REJECT"
    pub decision: String,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

/// KYC record response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KycResponse {
    pub user_id: String,
    pub status: String,
    pub full_name: String,
    pub date_of_birth: String,
    pub address: String,
    pub document_type: String,
    pub document_number: String,
    pub document_url: String,
    pub submitted_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<KycRecord> for KycResponse {
    fn from(record: KycRecord) -> Self {
        Self {
            user_id: record.user_id,
            status: record.status.as_str().to_string(),
            full_name: record.full_name,
            date_of_birth: record.date_of_birth,
            address: record.address,
            document_type: record.document_type.as_str().to_string(),
            document_number: record.document_number,
            document_url: record.document_url,
            submitted_at: record.submitted_at.to_rfc3339(),
            reviewed_at: record.reviewed_at.map(|t| t.to_rfc3339()),
            rejection_reason: record.rejection_reason,
            created_at: record.created_at.to_rfc3339(),
            updated_at: record.updated_at.to_rfc3339(),
        }
    }
}

/// Admin listing filter
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycListParams {
    pub status: Option<KycStatus>,
}

fn parse_document_type(raw: &str) -> Result<DocumentType, PlatformError> {
    DocumentType::parse(raw).ok_or_else(|| {
        PlatformError::validation(format!(
            "Unknown document type '{}', expected AADHAAR, PAN, PASSPORT, DRIVING_LICENSE or VOTER_ID",
            raw
        ))
    })
}

fn parse_decision(raw: &str) -> Result<KycDecision, PlatformError> {
    match raw {
        "APPROVE" => Ok(KycDecision::Approve),
        "REJECT" => Ok(KycDecision::Reject),
        other => Err(PlatformError::validation(format!(
            "Unknown decision '{}', expected APPROVE or REJECT",
            other
        ))),
    }
}

// ============================================================================
// State
// ============================================================================

/// KYC API state with use cases
#[derive(Clone)]
pub struct KycState<U: UnitOfWork + 'static> {
    pub kyc_repo: Arc<KycRepository>,
    pub submit_use_case: Arc<SubmitKycUseCase<U>>,
    pub review_use_case: Arc<ReviewKycUseCase<U>>,
    pub admin_edit_use_case: Arc<AdminEditKycUseCase<U>>,
    pub notification_emitter: Arc<NotificationEmitter>,
}

async fn fetch_record<U: UnitOfWork>(
    state: &KycState<U>,
    user_id: &str,
) -> Result<KycRecord, PlatformError> {
    state.kyc_repo.find_by_user(user_id).await?
        .ok_or_else(|| PlatformError::not_found("KycRecord", user_id))
}

// ============================================================================
// User endpoints
// ============================================================================

/// Submit or resubmit KYC documents
#[utoipa::path(
    post,
    path = "",
    tag = "kyc",
    operation_id = "postApiKyc",
    request_body = SubmitKycRequest,
    responses(
        (status = 200, description = "KYC submitted", body = KycResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 409, description = "Record already approved")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_kyc<U: UnitOfWork>(
    State(state): State<KycState<U>>,
    auth: Authenticated,
    Json(request): Json<SubmitKycRequest>,
) -> Result<Json<KycResponse>, PlatformError> {
    let document_type = parse_document_type(&request.document_type)?;
    let command = SubmitKycCommand {
        full_name: request.full_name,
        date_of_birth: request.date_of_birth,
        address: request.address,
        document_type,
        document_number: request.document_number,
        document_url: request.document_url,
    };
    let ctx = ExecutionContext::create(auth.principal_id.clone());

    match state.submit_use_case.execute(command, ctx).await {
        UseCaseResult::Success(event) => {
            let record = fetch_record(&state, &event.user_id).await?;
            Ok(Json(KycResponse::from(record)))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Get the caller's KYC record
#[utoipa::path(
    get,
    path = "",
    tag = "kyc",
    operation_id = "getApiKyc",
    responses(
        (status = 200, description = "KYC record", body = KycResponse),
        (status = 404, description = "No record submitted yet")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_my_kyc<U: UnitOfWork>(
    State(state): State<KycState<U>>,
    auth: Authenticated,
) -> Result<Json<KycResponse>, PlatformError> {
    let record = fetch_record(&state, &auth.principal_id).await?;
    Ok(Json(KycResponse::from(record)))
}

// ============================================================================
// Admin endpoints
// ============================================================================

/// List KYC records, optionally filtered by status
#[utoipa::path(
    get,
    path = "",
    tag = "admin-kyc",
    operation_id = "getApiAdminKyc",
    params(
        ("status" = Option<String>, Query, description = "Filter by KYC status")
    ),
    responses(
        (status = 200, description = "KYC records", body = Vec<KycResponse>),
        (status = 403, description = "Missing permission")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_kyc<U: UnitOfWork>(
    State(state): State<KycState<U>>,
    auth: Authenticated,
    Query(params): Query<KycListParams>,
) -> Result<Json<Vec<KycResponse>>, PlatformError> {
    checks::can_view_kyc(&auth.0)?;

    let records = state.kyc_repo.find_by_status(params.status).await?;
    Ok(Json(records.into_iter().map(Into::into).collect()))
}

/// Approve or reject a submitted KYC record
#[utoipa::path(
    post,
    path = "/{userId}/review",
    tag = "admin-kyc",
    operation_id = "postApiAdminKycByUserIdReview",
    params(
        ("userId" = String, Path, description = "User ID")
    ),
    request_body = ReviewKycRequest,
    responses(
        (status = 200, description = "Review recorded", body = KycResponse),
        (status = 400, description = "Missing rejection reason"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "No KYC record for this user"),
        (status = 409, description = "Record is not awaiting review")
    ),
    security(("bearer_auth" = []))
)]
pub async fn review_kyc<U: UnitOfWork>(
    State(state): State<KycState<U>>,
    auth: Authenticated,
    Path(user_id): Path<String>,
    Json(request): Json<ReviewKycRequest>,
) -> Result<Json<KycResponse>, PlatformError> {
    checks::can_review_kyc(&auth.0)?;

    let decision = parse_decision(&request.decision)?;
    let command = ReviewKycCommand {
        user_id,
        decision,
        rejection_reason: request.rejection_reason,
    };
    let ctx = ExecutionContext::create(auth.principal_id.clone());

    match state.review_use_case.execute(command, ctx).await {
        UseCaseResult::Success(event) => {
            // Notify the user. The review already committed, so a
            // notification failure only degrades UX.
            let approved = event.decision == KycDecision::Approve;
            if let Err(e) = state.notification_emitter
                .kyc_status_changed(&event.user_id, approved, event.rejection_reason.as_deref())
                .await
            {
                warn!(user_id = %event.user_id, error = %e, "Failed to emit KYC notification");
            }

            let record = fetch_record(&state, &event.user_id).await?;
            Ok(Json(KycResponse::from(record)))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Edit KYC fields, forcing the record back to review
#[utoipa::path(
    put,
    path = "/{userId}",
    tag = "admin-kyc",
    operation_id = "putApiAdminKycByUserId",
    params(
        ("userId" = String, Path, description = "User ID")
    ),
    request_body = SubmitKycRequest,
    responses(
        (status = 200, description = "Record updated and reset to Submitted", body = KycResponse),
        (status = 400, description = "Missing or invalid field"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "No KYC record for this user")
    ),
    security(("bearer_auth" = []))
)]
pub async fn admin_edit_kyc<U: UnitOfWork>(
    State(state): State<KycState<U>>,
    auth: Authenticated,
    Path(user_id): Path<String>,
    Json(request): Json<SubmitKycRequest>,
) -> Result<Json<KycResponse>, PlatformError> {
    checks::can_edit_kyc(&auth.0)?;

    let document_type = parse_document_type(&request.document_type)?;
    let command = AdminEditKycCommand {
        user_id,
        full_name: request.full_name,
        date_of_birth: request.date_of_birth,
        address: request.address,
        document_type,
        document_number: request.document_number,
        document_url: request.document_url,
    };
    let ctx = ExecutionContext::create(auth.principal_id.clone());

    match state.admin_edit_use_case.execute(command, ctx).await {
        UseCaseResult::Success(event) => {
            let record = fetch_record(&state, &event.user_id).await?;
            Ok(Json(KycResponse::from(record)))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

// ============================================================================
// Routers
// ============================================================================

/// Create the user KYC router (mounted under /api/kyc)
pub fn kyc_router<U: UnitOfWork + Clone>(state: KycState<U>) -> Router {
    Router::new()
        .route("/", post(submit_kyc::<U>).get(get_my_kyc::<U>))
        .with_state(state)
}

/// Create the admin KYC router (mounted under /api/admin/kyc)
pub fn admin_kyc_router<U: UnitOfWork + Clone>(state: KycState<U>) -> Router {
    Router::new()
        .route("/", get(list_kyc::<U>))
        .route("/:user_id/review", post(review_kyc::<U>))
        .route("/:user_id", put(admin_edit_kyc::<U>))
        .with_state(state)
}
