//! Support Query API
//!
//! Guest-friendly submission endpoint, the user's own query list, and
//! the admin reply/resolve endpoints.

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use utoipa::ToSchema;

use crate::query::entity::{QueryStatus, QueryType, SupportQuery};
use crate::query::repository::QueryRepository;
use crate::query::operations::{
    ReplyQueryCommand, ReplyQueryUseCase,
    ResolveQueryCommand, ResolveQueryUseCase,
    SubmitQueryCommand, SubmitQueryUseCase,
};
use crate::notification::NotificationEmitter;
use crate::shared::error::PlatformError;
use crate::shared::middleware::{Authenticated, OptionalAuth};
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseResult};
use crate::checks;

/// Principal recorded for guest submissions
const GUEST_PRINCIPAL: &str = "anonymous";

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Query submission request. Email and name are taken from the token
/// for signed-in users; guests must supply them here.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQueryRequest {
    pub subject: String,
    /// "GENERAL" or "PRIORITY"
    pub query_type: String,
    pub message: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Admin reply request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplyQueryRequest {
    pub message: String,
}

/// Single conversation message
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryMessageResponse {
    pub sender: String,
    pub message: String,
    pub timestamp: String,
}

/// Support query response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub user_email: String,
    pub user_name: String,
    pub subject: String,
    pub query_type: String,
    pub status: String,
    pub messages: Vec<QueryMessageResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<SupportQuery> for QueryResponse {
    fn from(query: SupportQuery) -> Self {
        Self {
            id: query.id,
            user_id: query.user_id,
            user_email: query.user_email,
            user_name: query.user_name,
            subject: query.subject,
            query_type: query.query_type.as_str().to_string(),
            status: query.status.as_str().to_string(),
            messages: query.messages.into_iter().map(|m| QueryMessageResponse {
                sender: format!("{:?}", m.sender).to_uppercase(),
                message: m.message,
                timestamp: m.timestamp.to_rfc3339(),
            }).collect(),
            created_at: query.created_at.to_rfc3339(),
            updated_at: query.updated_at.to_rfc3339(),
        }
    }
}

/// Admin listing filter
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryListParams {
    pub status: Option<QueryStatus>,
}

fn parse_query_type(raw: &str) -> Result<QueryType, PlatformError> {
    QueryType::parse(raw).ok_or_else(|| {
        PlatformError::validation(format!(
            "Unknown query type '{}', expected GENERAL or PRIORITY",
            raw
        ))
    })
}

// ============================================================================
// State
// ============================================================================

/// Support query API state with use cases
#[derive(Clone)]
pub struct QueriesState<U: UnitOfWork + 'static> {
    pub query_repo: Arc<QueryRepository>,
    pub submit_use_case: Arc<SubmitQueryUseCase<U>>,
    pub reply_use_case: Arc<ReplyQueryUseCase<U>>,
    pub resolve_use_case: Arc<ResolveQueryUseCase<U>>,
    pub notification_emitter: Arc<NotificationEmitter>,
}

async fn fetch_query<U: UnitOfWork>(
    state: &QueriesState<U>,
    id: &str,
) -> Result<SupportQuery, PlatformError> {
    state.query_repo.find_by_id(id).await?
        .ok_or_else(|| PlatformError::not_found("Query", id))
}

// ============================================================================
// Endpoints
// ============================================================================

/// Submit a support query. Guests are allowed for General queries.
#[utoipa::path(
    post,
    path = "",
    tag = "queries",
    operation_id = "postApiQueries",
    request_body = SubmitQueryRequest,
    responses(
        (status = 200, description = "Query submitted", body = QueryResponse),
        (status = 400, description = "Missing field or Priority without an account")
    )
)]
pub async fn submit_query<U: UnitOfWork>(
    State(state): State<QueriesState<U>>,
    OptionalAuth(auth): OptionalAuth,
    Json(request): Json<SubmitQueryRequest>,
) -> Result<Json<QueryResponse>, PlatformError> {
    let query_type = parse_query_type(&request.query_type)?;

    let (user_id, user_email, user_name, principal) = match &auth {
        Some(ctx) => (
            Some(ctx.principal_id.clone()),
            ctx.email.clone().unwrap_or_else(|| request.email.clone().unwrap_or_default()),
            ctx.name.clone(),
            ctx.principal_id.clone(),
        ),
        None => (
            None,
            request.email.clone().unwrap_or_default(),
            request.name.clone().unwrap_or_default(),
            GUEST_PRINCIPAL.to_string(),
        ),
    };

    let command = SubmitQueryCommand {
        user_id,
        user_email,
        user_name,
        subject: request.subject,
        query_type,
        message: request.message,
    };
    let ctx = ExecutionContext::create(principal);

    match state.submit_use_case.execute(command, ctx).await {
        UseCaseResult::Success(event) => {
            let query = fetch_query(&state, &event.query_id).await?;
            Ok(Json(QueryResponse::from(query)))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// List the caller's queries, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "queries",
    operation_id = "getApiQueries",
    responses(
        (status = 200, description = "Caller's queries", body = Vec<QueryResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_queries<U: UnitOfWork>(
    State(state): State<QueriesState<U>>,
    auth: Authenticated,
) -> Result<Json<Vec<QueryResponse>>, PlatformError> {
    let queries = state.query_repo.find_by_user(&auth.principal_id).await?;
    Ok(Json(queries.into_iter().map(Into::into).collect()))
}

/// List queries, optionally filtered by status (admin)
#[utoipa::path(
    get,
    path = "",
    tag = "admin-queries",
    operation_id = "getApiAdminQueries",
    params(
        ("status" = Option<String>, Query, description = "Filter by query status")
    ),
    responses(
        (status = 200, description = "Queries", body = Vec<QueryResponse>),
        (status = 403, description = "Missing permission")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_queries<U: UnitOfWork>(
    State(state): State<QueriesState<U>>,
    auth: Authenticated,
    Query(params): Query<QueryListParams>,
) -> Result<Json<Vec<QueryResponse>>, PlatformError> {
    checks::can_view_queries(&auth.0)?;

    let queries = state.query_repo.find_by_status(params.status).await?;
    Ok(Json(queries.into_iter().map(Into::into).collect()))
}

/// Reply to a query (admin)
#[utoipa::path(
    post,
    path = "/{id}/reply",
    tag = "admin-queries",
    operation_id = "postApiAdminQueriesByIdReply",
    params(
        ("id" = String, Path, description = "Query ID")
    ),
    request_body = ReplyQueryRequest,
    responses(
        (status = 200, description = "Reply recorded", body = QueryResponse),
        (status = 400, description = "Missing message"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Query not found"),
        (status = 409, description = "Query already resolved")
    ),
    security(("bearer_auth" = []))
)]
pub async fn reply_query<U: UnitOfWork>(
    State(state): State<QueriesState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(request): Json<ReplyQueryRequest>,
) -> Result<Json<QueryResponse>, PlatformError> {
    checks::can_reply_queries(&auth.0)?;

    let command = ReplyQueryCommand {
        query_id: id,
        message: request.message,
    };
    let ctx = ExecutionContext::create(auth.principal_id.clone());

    match state.reply_use_case.execute(command, ctx).await {
        UseCaseResult::Success(event) => {
            // Guests have no account to notify
            if let Some(user_id) = &event.user_id {
                if let Err(e) = state.notification_emitter
                    .query_replied(user_id, &event.subject_line)
                    .await
                {
                    warn!(query_id = %event.query_id, error = %e, "Failed to emit reply notification");
                }
            }

            let query = fetch_query(&state, &event.query_id).await?;
            Ok(Json(QueryResponse::from(query)))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Resolve a query (admin)
#[utoipa::path(
    post,
    path = "/{id}/resolve",
    tag = "admin-queries",
    operation_id = "postApiAdminQueriesByIdResolve",
    params(
        ("id" = String, Path, description = "Query ID")
    ),
    responses(
        (status = 200, description = "Query resolved", body = QueryResponse),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Query not found"),
        (status = 409, description = "Query already resolved")
    ),
    security(("bearer_auth" = []))
)]
pub async fn resolve_query<U: UnitOfWork>(
    State(state): State<QueriesState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<QueryResponse>, PlatformError> {
    checks::can_reply_queries(&auth.0)?;

    let command = ResolveQueryCommand { query_id: id };
    let ctx = ExecutionContext::create(auth.principal_id.clone());

    match state.resolve_use_case.execute(command, ctx).await {
        UseCaseResult::Success(event) => {
            let query = fetch_query(&state, &event.query_id).await?;
            Ok(Json(QueryResponse::from(query)))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

// ============================================================================
// Routers
// ============================================================================

/// Create the user queries router (mounted under /api/queries)
pub fn queries_router<U: UnitOfWork + Clone>(state: QueriesState<U>) -> Router {
    Router::new()
        .route("/", post(submit_query::<U>).get(list_my_queries::<U>))
        .with_state(state)
}

/// Create the admin queries router (mounted under /api/admin/queries)
pub fn admin_queries_router<U: UnitOfWork + Clone>(state: QueriesState<U>) -> Router {
    Router::new()
        .route("/", get(list_queries::<U>))
        .route("/:id/reply", post(reply_query::<U>))
        .route("/:id/resolve", post(resolve_query::<U>))
        .with_state(state)
}
