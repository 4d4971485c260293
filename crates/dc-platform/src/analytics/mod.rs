//! Analytics Module
//!
//! Pure folds over collection snapshots plus the admin dashboard endpoint.

pub mod folds;
pub mod api;

pub use folds::{
    kyc_status_counts, monthly_revenue_series, order_status_counts, registration_series,
    KycStatusCounts, OrderStatusCounts, RevenuePoint, SeriesPoint, SeriesWindow,
};
pub use api::{admin_analytics_router, AnalyticsState};
