//! Analytics API
//!
//! Admin dashboard aggregates, recomputed from full snapshots on every call.

use axum::extract::{Query, State};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::analytics::folds::{
    kyc_status_counts, monthly_revenue_series, order_status_counts, registration_series,
    KycStatusCounts, OrderStatusCounts, RevenuePoint, SeriesPoint, SeriesWindow,
};
use crate::kyc::repository::KycRepository;
use crate::order::repository::OrderRepository;
use crate::shared::error::PlatformError;
use crate::shared::middleware::Authenticated;
use crate::user::repository::UserRepository;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsParams {
    /// Registration series window, defaults to MONTHS_12
    pub window: Option<SeriesWindow>,
}

/// Dashboard aggregates
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsResponse {
    pub orders: OrderStatusCounts,
    pub monthly_revenue: Vec<RevenuePoint>,
    pub registrations: Vec<SeriesPoint>,
    pub kyc: KycStatusCounts,
}

/// Analytics service state
#[derive(Clone)]
pub struct AnalyticsState {
    pub order_repo: Arc<OrderRepository>,
    pub user_repo: Arc<UserRepository>,
    pub kyc_repo: Arc<KycRepository>,
}

/// Dashboard aggregates (admin)
#[utoipa::path(
    get,
    path = "",
    tag = "admin-analytics",
    operation_id = "getApiAdminAnalytics",
    params(AnalyticsParams),
    responses(
        (status = 200, description = "Dashboard aggregates", body = AnalyticsResponse),
        (status = 403, description = "Missing permission")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_analytics(
    State(state): State<AnalyticsState>,
    auth: Authenticated,
    Query(params): Query<AnalyticsParams>,
) -> Result<Json<AnalyticsResponse>, PlatformError> {
    crate::checks::can_view_analytics(&auth.0)?;

    let orders = state.order_repo.find_all().await?;
    let users = state.user_repo.find_all().await?;
    let kyc_records = state.kyc_repo.find_all().await?;

    let now = Utc::now();
    let window = params.window.unwrap_or_default();

    Ok(Json(AnalyticsResponse {
        orders: order_status_counts(&orders),
        monthly_revenue: monthly_revenue_series(&orders, now),
        registrations: registration_series(&users, now, window),
        kyc: kyc_status_counts(&kyc_records),
    }))
}

/// Create the admin analytics router (mounted under /api/admin/analytics)
pub fn admin_analytics_router(state: AnalyticsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(get_analytics))
        .with_state(state)
}
