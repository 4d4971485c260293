//! Order API
//!
//! User-facing checkout and order tracking endpoints, plus the admin
//! review endpoints and the admin SSE live feed.

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use futures::{Stream, StreamExt};
use tracing::warn;
use utoipa::ToSchema;

use crate::order::entity::{BankSnapshot, Certificate, Order, OrderStatus};
use crate::order::repository::OrderRepository;
use crate::order::operations::{
    AttachCertificateCommand, AttachCertificateUseCase,
    CreateOrderCommand, CreateOrderUseCase,
    DecideOrderCommand, DecideOrderUseCase,
    MarkProcessingCommand, MarkProcessingUseCase,
    OrderDecision,
    SubmitPaymentCommand, SubmitPaymentUseCase,
};
use crate::notification::NotificationEmitter;
use crate::stream::CollectionWatcher;
use crate::shared::api_common::{PaginatedResponse, PaginationParams};
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseResult};
use crate::checks;

// ============================================================================
// Request/Response DTOs
// ============================================================================

/// Checkout request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderRequest {
    pub plan_id: String,
    pub amount: f64,
}

/// Payment submission request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPaymentRequest {
    pub transaction_id: String,
    #[serde(default)]
    pub payment_proof: Option<String>,
    #[serde(default)]
    pub payment_note: Option<String>,
}

/// Admin payment decision request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DecideOrderRequest {
    /// "APPROVE" or "REJECT"
    pub decision: String,
    #[serde(default)]
    pub admin_note: Option<String>,
}

fn parse_decision(raw: &str) -> Result<OrderDecision, PlatformError> {
    match raw {
        "APPROVE" => Ok(OrderDecision::Approve),
        "REJECT" => Ok(OrderDecision::Reject),
        other => Err(PlatformError::validation(format!(
            "Unknown decision '{}', expected APPROVE or REJECT",
            other
        ))),
    }
}

/// Certificate attachment request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttachCertificateRequest {
    pub certificate_url: String,
}

/// Admin order listing filter
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListParams {
    pub status: Option<OrderStatus>,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

/// Receiving account snapshot in responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BankSnapshotResponse {
    pub account_name: String,
    pub account_number: String,
    pub ifsc: String,
    pub bank_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
}

impl From<BankSnapshot> for BankSnapshotResponse {
    fn from(s: BankSnapshot) -> Self {
        Self {
            account_name: s.account_name,
            account_number: s.account_number,
            ifsc: s.ifsc,
            bank_name: s.bank_name,
            upi_id: s.upi_id,
        }
    }
}

/// Certificate in responses
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateResponse {
    pub url: String,
    pub uploaded_at: String,
    pub uploaded_by: String,
}

impl From<Certificate> for CertificateResponse {
    fn from(c: Certificate) -> Self {
        Self {
            url: c.url,
            uploaded_at: c.uploaded_at.to_rfc3339(),
            uploaded_by: c.uploaded_by,
        }
    }
}

/// Order response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub plan_id: String,
    pub plan_name: String,
    pub amount: f64,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfillment_stage: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_proof: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankSnapshotResponse>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<CertificateResponse>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            user_id: order.user_id,
            user_name: order.user_name,
            user_email: order.user_email,
            plan_id: order.plan_id,
            plan_name: order.plan_name,
            amount: order.amount,
            status: order.status.as_str().to_string(),
            fulfillment_stage: order.fulfillment_stage.map(|s| s.as_str().to_string()),
            payment_proof: order.payment_proof,
            payment_note: order.payment_note,
            transaction_id: order.transaction_id,
            bank_details: order.bank_details.map(Into::into),
            admin_note: order.admin_note,
            certificate: order.certificate.map(Into::into),
            created_at: order.created_at.to_rfc3339(),
            updated_at: order.updated_at.to_rfc3339(),
        }
    }
}

// ============================================================================
// State
// ============================================================================

/// Orders API state with use cases
#[derive(Clone)]
pub struct OrdersState<U: UnitOfWork + 'static> {
    pub order_repo: Arc<OrderRepository>,
    pub create_use_case: Arc<CreateOrderUseCase<U>>,
    pub submit_payment_use_case: Arc<SubmitPaymentUseCase<U>>,
    pub decide_use_case: Arc<DecideOrderUseCase<U>>,
    pub mark_processing_use_case: Arc<MarkProcessingUseCase<U>>,
    pub attach_certificate_use_case: Arc<AttachCertificateUseCase<U>>,
    pub notification_emitter: Arc<NotificationEmitter>,
    pub watcher: Arc<CollectionWatcher<Order>>,
}

async fn fetch_order<U: UnitOfWork>(
    state: &OrdersState<U>,
    id: &str,
) -> Result<Order, PlatformError> {
    state.order_repo.find_by_id(id).await?
        .ok_or_else(|| PlatformError::not_found("Order", id))
}

// ============================================================================
// User endpoints
// ============================================================================

/// Create an order (checkout)
#[utoipa::path(
    post,
    path = "",
    tag = "orders",
    operation_id = "postApiOrders",
    request_body = CreateOrderRequest,
    responses(
        (status = 200, description = "Order created", body = OrderResponse),
        (status = 400, description = "Invalid amount"),
        (status = 404, description = "Plan not found"),
        (status = 409, description = "Plan inactive or account banned")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_order<U: UnitOfWork>(
    State(state): State<OrdersState<U>>,
    auth: Authenticated,
    Json(request): Json<CreateOrderRequest>,
) -> Result<Json<OrderResponse>, PlatformError> {
    let command = CreateOrderCommand {
        plan_id: request.plan_id,
        amount: request.amount,
    };
    let ctx = ExecutionContext::create(auth.principal_id.clone());

    match state.create_use_case.execute(command, ctx).await {
        UseCaseResult::Success(event) => {
            let order = fetch_order(&state, &event.order_id).await?;
            Ok(Json(OrderResponse::from(order)))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// List the caller's orders, newest first
#[utoipa::path(
    get,
    path = "",
    tag = "orders",
    operation_id = "getApiOrders",
    responses(
        (status = 200, description = "Caller's orders", body = Vec<OrderResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_orders<U: UnitOfWork>(
    State(state): State<OrdersState<U>>,
    auth: Authenticated,
) -> Result<Json<Vec<OrderResponse>>, PlatformError> {
    let orders = state.order_repo.find_by_user(&auth.principal_id).await?;
    Ok(Json(orders.into_iter().map(Into::into).collect()))
}

/// Get one of the caller's orders
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "orders",
    operation_id = "getApiOrdersById",
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_my_order<U: UnitOfWork>(
    State(state): State<OrdersState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, PlatformError> {
    let order = fetch_order(&state, &id).await?;

    // A foreign order reads the same as a missing one
    if order.user_id != auth.principal_id {
        return Err(PlatformError::not_found("Order", &id));
    }

    Ok(Json(OrderResponse::from(order)))
}

/// Submit payment proof for a pending order
#[utoipa::path(
    post,
    path = "/{id}/payment",
    tag = "orders",
    operation_id = "postApiOrdersByIdPayment",
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    request_body = SubmitPaymentRequest,
    responses(
        (status = 200, description = "Payment submitted", body = OrderResponse),
        (status = 400, description = "Missing transaction reference"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not pending")
    ),
    security(("bearer_auth" = []))
)]
pub async fn submit_payment<U: UnitOfWork>(
    State(state): State<OrdersState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(request): Json<SubmitPaymentRequest>,
) -> Result<Json<OrderResponse>, PlatformError> {
    let command = SubmitPaymentCommand {
        order_id: id,
        transaction_id: request.transaction_id,
        payment_proof: request.payment_proof,
        payment_note: request.payment_note,
    };
    let ctx = ExecutionContext::create(auth.principal_id.clone());

    match state.submit_payment_use_case.execute(command, ctx).await {
        UseCaseResult::Success(event) => {
            let order = fetch_order(&state, &event.order_id).await?;
            Ok(Json(OrderResponse::from(order)))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

// ============================================================================
// Admin endpoints
// ============================================================================

/// List orders, optionally filtered by status
#[utoipa::path(
    get,
    path = "",
    tag = "admin-orders",
    operation_id = "getApiAdminOrders",
    params(
        ("status" = Option<String>, Query, description = "Filter by order status"),
        ("page" = Option<u32>, Query, description = "Page number (0-based)"),
        ("size" = Option<u32>, Query, description = "Page size")
    ),
    responses(
        (status = 200, description = "Page of orders", body = PaginatedResponse<OrderResponse>),
        (status = 403, description = "Missing permission")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_orders<U: UnitOfWork>(
    State(state): State<OrdersState<U>>,
    auth: Authenticated,
    Query(params): Query<OrderListParams>,
) -> Result<Json<PaginatedResponse<OrderResponse>>, PlatformError> {
    checks::can_view_orders(&auth.0)?;

    let orders = state.order_repo
        .find_page(params.status, params.pagination.offset(), params.pagination.limit())
        .await?;
    let total = state.order_repo.count(params.status).await?;

    let data: Vec<OrderResponse> = orders.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        params.pagination.page(),
        params.pagination.size(),
        total,
    )))
}

/// Get any order
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "admin-orders",
    operation_id = "getApiAdminOrdersById",
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Order not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_order<U: UnitOfWork>(
    State(state): State<OrdersState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, PlatformError> {
    checks::can_view_orders(&auth.0)?;

    let order = fetch_order(&state, &id).await?;
    Ok(Json(OrderResponse::from(order)))
}

/// Approve or reject an uploaded payment
#[utoipa::path(
    post,
    path = "/{id}/decision",
    tag = "admin-orders",
    operation_id = "postApiAdminOrdersByIdDecision",
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    request_body = DecideOrderRequest,
    responses(
        (status = 200, description = "Decision recorded", body = OrderResponse),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not awaiting review")
    ),
    security(("bearer_auth" = []))
)]
pub async fn decide_order<U: UnitOfWork>(
    State(state): State<OrdersState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(request): Json<DecideOrderRequest>,
) -> Result<Json<OrderResponse>, PlatformError> {
    checks::can_review_orders(&auth.0)?;

    let decision = parse_decision(&request.decision)?;
    let command = DecideOrderCommand {
        order_id: id,
        decision,
        admin_note: request.admin_note,
    };
    let ctx = ExecutionContext::create(auth.principal_id.clone());

    match state.decide_use_case.execute(command, ctx).await {
        UseCaseResult::Success(event) => {
            // Notify the investor. The decision already committed, so a
            // notification failure only degrades UX.
            let emitted = match event.decision {
                OrderDecision::Approve => {
                    state.notification_emitter
                        .payment_received(&event.user_id, &event.plan_name, event.amount)
                        .await
                }
                OrderDecision::Reject => {
                    state.notification_emitter
                        .payment_rejected(&event.user_id, &event.plan_name, event.admin_note.as_deref())
                        .await
                }
            };
            if let Err(e) = emitted {
                warn!(order_id = %event.order_id, error = %e, "Failed to emit decision notification");
            }

            let order = fetch_order(&state, &event.order_id).await?;
            Ok(Json(OrderResponse::from(order)))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Advance an active order to the processing stage
#[utoipa::path(
    post,
    path = "/{id}/processing",
    tag = "admin-orders",
    operation_id = "postApiAdminOrdersByIdProcessing",
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    responses(
        (status = 200, description = "Order marked processing", body = OrderResponse),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not in the confirmed stage")
    ),
    security(("bearer_auth" = []))
)]
pub async fn mark_order_processing<U: UnitOfWork>(
    State(state): State<OrdersState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, PlatformError> {
    checks::can_process_orders(&auth.0)?;

    let command = MarkProcessingCommand { order_id: id };
    let ctx = ExecutionContext::create(auth.principal_id.clone());

    match state.mark_processing_use_case.execute(command, ctx).await {
        UseCaseResult::Success(event) => {
            let order = fetch_order(&state, &event.order_id).await?;
            Ok(Json(OrderResponse::from(order)))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// Attach or replace the investment certificate on an active order
#[utoipa::path(
    post,
    path = "/{id}/certificate",
    tag = "admin-orders",
    operation_id = "postApiAdminOrdersByIdCertificate",
    params(
        ("id" = String, Path, description = "Order ID")
    ),
    request_body = AttachCertificateRequest,
    responses(
        (status = 200, description = "Certificate attached", body = OrderResponse),
        (status = 400, description = "Missing certificate URL"),
        (status = 403, description = "Missing permission"),
        (status = 404, description = "Order not found"),
        (status = 409, description = "Order is not active")
    ),
    security(("bearer_auth" = []))
)]
pub async fn attach_certificate<U: UnitOfWork>(
    State(state): State<OrdersState<U>>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(request): Json<AttachCertificateRequest>,
) -> Result<Json<OrderResponse>, PlatformError> {
    checks::can_process_orders(&auth.0)?;

    let command = AttachCertificateCommand {
        order_id: id,
        certificate_url: request.certificate_url,
    };
    let ctx = ExecutionContext::create(auth.principal_id.clone());

    match state.attach_certificate_use_case.execute(command, ctx).await {
        UseCaseResult::Success(event) => {
            if let Err(e) = state.notification_emitter
                .certificate_issued(&event.user_id, &event.plan_name)
                .await
            {
                warn!(order_id = %event.order_id, error = %e, "Failed to emit certificate notification");
            }

            let order = fetch_order(&state, &event.order_id).await?;
            Ok(Json(OrderResponse::from(order)))
        }
        UseCaseResult::Failure(err) => Err(err.into()),
    }
}

/// SSE live feed of order changes for the admin dashboard
pub async fn watch_orders<U: UnitOfWork>(
    State(state): State<OrdersState<U>>,
    auth: Authenticated,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, PlatformError> {
    checks::can_view_orders(&auth.0)?;

    let receiver = state.watcher.subscribe();
    let stream = crate::stream::into_stream(receiver)
        .map(|order: Order| {
            let event = Event::default()
                .event("order")
                .json_data(OrderResponse::from(order))
                .unwrap_or_else(|_| Event::default().event("order"));
            Ok(event)
        });

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

// ============================================================================
// Routers
// ============================================================================

/// Create the user orders router (mounted under /api/orders)
pub fn orders_router<U: UnitOfWork + Clone>(state: OrdersState<U>) -> Router {
    Router::new()
        .route("/", post(create_order::<U>).get(list_my_orders::<U>))
        .route("/:id", get(get_my_order::<U>))
        .route("/:id/payment", post(submit_payment::<U>))
        .with_state(state)
}

/// Create the admin orders router (mounted under /api/admin/orders)
pub fn admin_orders_router<U: UnitOfWork + Clone>(state: OrdersState<U>) -> Router {
    Router::new()
        .route("/", get(list_orders::<U>))
        .route("/watch", get(watch_orders::<U>))
        .route("/:id", get(get_order::<U>))
        .route("/:id/decision", post(decide_order::<U>))
        .route("/:id/processing", post(mark_order_processing::<U>))
        .route("/:id/certificate", post(attach_certificate::<U>))
        .with_state(state)
}
