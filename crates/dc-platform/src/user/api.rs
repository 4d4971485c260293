//! User API
//!
//! User-facing status endpoint plus admin user management.

use axum::{
    extract::{State, Path, Query},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::user::entity::User;
use crate::user::repository::UserRepository;
use crate::audit::AuditService;
use crate::shared::api_common::{PaginationParams, PaginatedResponse, SuccessResponse};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;

/// User response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
    pub status: String,
    pub kyc_status: String,
    pub roles: Vec<String>,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            phone: user.phone,
            status: user.status.as_str().to_string(),
            kyc_status: user.kyc_status.as_str().to_string(),
            roles: user.roles,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Account status response for ban detection
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusResponse {
    pub status: String,
    pub kyc_status: String,
}

/// Users service state
#[derive(Clone)]
pub struct UsersState {
    pub user_repo: Arc<UserRepository>,
    pub audit_service: Arc<AuditService>,
}

/// Get own account status
///
/// Clients poll this to detect a ban and sign the user out.
/// Provisions the user document on first authenticated call.
#[utoipa::path(
    get,
    path = "/status",
    tag = "users",
    operation_id = "getApiUserStatus",
    responses(
        (status = 200, description = "Account status", body = UserStatusResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user_status(
    State(state): State<UsersState>,
    auth: Authenticated,
) -> Result<Json<UserStatusResponse>, PlatformError> {
    let user = match state.user_repo.find_by_id(&auth.principal_id).await? {
        Some(user) => user,
        None => {
            // First authenticated request for this identity, provision the document
            let email = auth.email.clone().unwrap_or_default();
            let user = User::with_id(&auth.principal_id, email, &auth.name);
            state.user_repo.upsert(&user).await?;
            info!(user_id = %user.id, "Provisioned user from identity provider");
            user
        }
    };

    Ok(Json(UserStatusResponse {
        status: user.status.as_str().to_string(),
        kyc_status: user.kyc_status.as_str().to_string(),
    }))
}

/// List users (admin)
#[utoipa::path(
    get,
    path = "",
    tag = "users",
    operation_id = "getApiAdminUsers",
    params(PaginationParams),
    responses(
        (status = 200, description = "Paginated list of users", body = PaginatedResponse<UserResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<UsersState>,
    auth: Authenticated,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedResponse<UserResponse>>, PlatformError> {
    crate::checks::can_view_users(&auth.0)?;

    let users = state.user_repo.find_page(pagination.offset(), pagination.limit()).await?;
    let total = state.user_repo.count().await?;

    let data: Vec<UserResponse> = users.into_iter().map(|u| u.into()).collect();

    Ok(Json(PaginatedResponse::new(
        data,
        pagination.page(),
        pagination.size(),
        total,
    )))
}

/// Get a user by ID (admin)
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "users",
    operation_id = "getApiAdminUsersById",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, PlatformError> {
    crate::checks::can_view_users(&auth.0)?;

    let user = state.user_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::not_found("User", &id))?;

    Ok(Json(user.into()))
}

/// Ban a user (admin)
#[utoipa::path(
    post,
    path = "/{id}/ban",
    tag = "users",
    operation_id = "postApiAdminUsersByIdBan",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User banned", body = SuccessResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn ban_user(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::checks::can_manage_users(&auth.0)?;

    let mut user = state.user_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::not_found("User", &id))?;

    user.ban();
    state.user_repo.update(&user).await?;
    state.audit_service.log_update(&auth.0, "User", &id, "BanUser").await?;

    info!(user_id = %id, admin = %auth.principal_id, "User banned");

    Ok(Json(SuccessResponse::with_message("User banned")))
}

/// Reactivate a banned user (admin)
#[utoipa::path(
    post,
    path = "/{id}/reactivate",
    tag = "users",
    operation_id = "postApiAdminUsersByIdReactivate",
    params(
        ("id" = String, Path, description = "User ID")
    ),
    responses(
        (status = 200, description = "User reactivated", body = SuccessResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reactivate_user(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, PlatformError> {
    crate::checks::can_manage_users(&auth.0)?;

    let mut user = state.user_repo.find_by_id(&id).await?
        .ok_or_else(|| PlatformError::not_found("User", &id))?;

    user.reactivate();
    state.user_repo.update(&user).await?;
    state.audit_service.log_update(&auth.0, "User", &id, "ReactivateUser").await?;

    info!(user_id = %id, admin = %auth.principal_id, "User reactivated");

    Ok(Json(SuccessResponse::with_message("User reactivated")))
}

/// Create the user status router (mounted under /api/user)
pub fn user_status_router(state: UsersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_user_status))
        .with_state(state)
}

/// Create the admin users router (mounted under /api/admin/users)
pub fn admin_users_router(state: UsersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_users))
        .routes(routes!(get_user))
        .routes(routes!(ban_user))
        .routes(routes!(reactivate_user))
        .with_state(state)
}
