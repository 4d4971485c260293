//! Bank Detail API
//!
//! User-facing default account lookup for checkout plus admin CRUD.

use axum::{
    extract::{State, Path},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

use crate::bank_detail::entity::BankDetail;
use crate::bank_detail::repository::BankDetailRepository;
use crate::audit::AuditService;
use crate::shared::api_common::{CreatedResponse, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// Bank detail response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankDetailResponse {
    pub id: String,
    pub account_name: String,
    pub account_number: String,
    pub ifsc: String,
    pub bank_name: String,
    pub upi_id: Option<String>,
    pub is_default: bool,
}

impl From<BankDetail> for BankDetailResponse {
    fn from(detail: BankDetail) -> Self {
        Self {
            id: detail.id,
            account_name: detail.account_name,
            account_number: detail.account_number,
            ifsc: detail.ifsc,
            bank_name: detail.bank_name,
            upi_id: detail.upi_id,
            is_default: detail.is_default,
        }
    }
}

/// Create bank detail request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBankDetailRequest {
    pub account_name: String,
    pub account_number: String,
    pub ifsc: String,
    pub bank_name: String,
    pub upi_id: Option<String>,
}

/// Update bank detail request (partial)
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBankDetailRequest {
    pub account_name: Option<String>,
    pub account_number: Option<String>,
    pub ifsc: Option<String>,
    pub bank_name: Option<String>,
    pub upi_id: Option<String>,
}

/// Bank details service state
#[derive(Clone)]
pub struct BankDetailsState {
    pub bank_detail_repo: Arc<BankDetailRepository>,
    pub audit_service: Arc<AuditService>,
}

/// Get the default receiving account for checkout
#[utoipa::path(
    get,
    path = "/default",
    tag = "bank-details",
    operation_id = "getApiBankDetailsDefault",
    responses(
        (status = 200, description = "Default bank detail", body = BankDetailResponse),
        (status = 404, description = "No default bank detail configured")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_default_bank_detail(
    State(state): State<BankDetailsState>,
    _auth: Authenticated,
) -> Result<Json<BankDetailResponse>, PlatformError> {
    let detail = state.bank_detail_repo.find_default().await?
        .ok_or_else(|| PlatformError::not_found("BankDetail", "default"))?;

    Ok(Json(detail.into()))
}

/// List all bank details (admin)
#[utoipa::path(
    get,
    path = "",
    tag = "bank-details",
    operation_id = "getApiAdminBankDetails",
    responses(
        (status = 200, description = "All bank details", body = Vec<BankDetailResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_bank_details(
    State(state): State<BankDetailsState>,
    auth: Authenticated,
) -> Result<Json<Vec<BankDetailResponse>>, PlatformError> {
    crate::checks::can_manage_bank_details(&auth.0)?;

    let details = state.bank_detail_repo.find_all().await?;
    let response: Vec<BankDetailResponse> = details.into_iter().map(|d| d.into()).collect();
    Ok(Json(response))
}

/// Create a bank detail (admin)
#[utoipa::path(
    post,
    path = "",
    tag = "bank-details",
    operation_id = "postApiAdminBankDetails",
    request_body = CreateBankDetailRequest,
    responses(
        (status = 200, description = "Bank detail created", body = CreatedResponse),
        (status = 400, description = "Validation failed")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_bank_detail(
    State(state): State<BankDetailsState>,
    auth: Authenticated,
    Json(request): Json<CreateBankDetailRequest>,
) -> Result<Json<CreatedResponse>, PlatformError> {
    crate::checks::can_manage_bank_details(&auth.0)?;

    for (field, value) in [
        ("accountName", &request.account_name),
        ("accountNumber", &request.account_number),
        ("ifsc", &request.ifsc),
        ("bankName", &request.bank_name),
    ] {
        if value.trim().is_empty() {
            return Err(PlatformError::validation(format!("{} is required", field)));
        }
    }

    let detail = BankDetail::new(
        request.account_name.trim(),
        request.account_number.trim(),
        request.ifsc.trim().to_uppercase(),
        request.bank_name.trim(),
        request.upi_id.map(|u| u.trim().to_string()).filter(|u| !u.is_empty()),
    );

    state.bank_detail_repo.insert(&detail).await?;
    state.audit_service.log_create(&auth.0, "BankDetail", &detail.id, "CreateBankDetail").await?;

    info!(bank_detail_id = %detail.id, "Bank detail created");

    Ok(Json(CreatedResponse::new(detail.id)))
}

/// Update a bank detail (admin)
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "bank-details",
    operation_id = "putApiAdminBankDetailsById",
    params(
        ("id" = String, Path, description = "Bank detail ID")
    ),
    request_body = UpdateBankDetailRequest,
    responses(
        (status = 200, description = "Bank detail updated", body = BankDetailResponse),
        (status = 404, description = "Bank detail not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_bank_detail(
    State(state): State<BankDetailsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(request): Json<UpdateBankDetailRequest>,
) -> Result<Json<BankDetailResponse>, PlatformError> {
    crate::checks::can_manage_bank_details(&auth.0)?;

    let mut detail = state.bank_detail_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::not_found("BankDetail", &id))?;

    if let Some(account_name) = request.account_name {
        detail.account_name = account_name.trim().to_string();
    }
    if let Some(account_number) = request.account_number {
        detail.account_number = account_number.trim().to_string();
    }
    if let Some(ifsc) = request.ifsc {
        detail.ifsc = ifsc.trim().to_uppercase();
    }
    if let Some(bank_name) = request.bank_name {
        detail.bank_name = bank_name.trim().to_string();
    }
    if let Some(upi_id) = request.upi_id {
        let upi_id = upi_id.trim().to_string();
        detail.upi_id = if upi_id.is_empty() { None } else { Some(upi_id) };
    }

    detail.updated_at = Utc::now();
    state.bank_detail_repo.update(&detail).await?;
    state.audit_service.log_update(&auth.0, "BankDetail", &id, "UpdateBankDetail").await?;

    Ok(Json(detail.into()))
}

/// Make a bank detail the default (admin)
///
/// Clears any previous default and sets the new one in a single transaction.
#[utoipa::path(
    post,
    path = "/{id}/default",
    tag = "bank-details",
    operation_id = "postApiAdminBankDetailsByIdDefault",
    params(
        ("id" = String, Path, description = "Bank detail ID")
    ),
    responses(
        (status = 200, description = "Default switched", body = SuccessResponse),
        (status = 404, description = "Bank detail not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn set_default_bank_detail(
    State(state): State<BankDetailsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::checks::can_manage_bank_details(&auth.0)?;

    state.bank_detail_repo.set_default(&id).await?;
    state.audit_service.log_update(&auth.0, "BankDetail", &id, "SetDefaultBankDetail").await?;

    info!(bank_detail_id = %id, "Default bank detail switched");

    Ok(Json(SuccessResponse::ok()))
}

/// Delete a bank detail (admin)
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "bank-details",
    operation_id = "deleteApiAdminBankDetailsById",
    params(
        ("id" = String, Path, description = "Bank detail ID")
    ),
    responses(
        (status = 200, description = "Bank detail deleted", body = SuccessResponse),
        (status = 404, description = "Bank detail not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_bank_detail(
    State(state): State<BankDetailsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::checks::can_manage_bank_details(&auth.0)?;

    let deleted = state.bank_detail_repo.delete(&id).await?;
    if !deleted {
        return Err(PlatformError::not_found("BankDetail", &id));
    }
    state.audit_service.log_delete(&auth.0, "BankDetail", &id, "DeleteBankDetail").await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Create the user bank details router (mounted under /api/bank-details)
pub fn bank_details_router(state: BankDetailsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_default_bank_detail))
        .with_state(state)
}

/// Create the admin bank details router (mounted under /api/admin/bank-details)
pub fn admin_bank_details_router(state: BankDetailsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_bank_details, create_bank_detail))
        .routes(routes!(update_bank_detail, delete_bank_detail))
        .routes(routes!(set_default_bank_detail))
        .with_state(state)
}
