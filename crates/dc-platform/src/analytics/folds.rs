//! Analytics folds
//!
//! Pure aggregations over full collection snapshots. Nothing here is cached;
//! the dashboard endpoint recomputes on every call, so the same snapshot
//! always yields the same output.

use chrono::{DateTime, Datelike, Days, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::kyc::entity::{KycRecord, KycStatus};
use crate::order::entity::{Order, OrderStatus};
use crate::user::entity::User;

/// Bucketing window for the registration series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeriesWindow {
    Days30,
    #[default]
    Months12,
    Years5,
}

/// Order counts per status plus total invested capital
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusCounts {
    pub pending: u64,
    pub payment_uploaded: u64,
    pub active: u64,
    pub cancelled: u64,
    pub total: u64,
    /// Sum of amounts over active orders
    pub total_invested: f64,
}

/// Revenue for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevenuePoint {
    /// Month label, `YYYY-MM`
    pub month: String,
    pub revenue: f64,
}

/// Count for one bucket of the registration series
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub label: String,
    pub count: u64,
}

/// KYC record counts per status
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KycStatusCounts {
    pub pending: u64,
    pub submitted: u64,
    pub approved: u64,
    pub rejected: u64,
    pub total: u64,
}

/// Count orders per status and sum the invested amount of active orders
pub fn order_status_counts(orders: &[Order]) -> OrderStatusCounts {
    let mut counts = OrderStatusCounts {
        pending: 0,
        payment_uploaded: 0,
        active: 0,
        cancelled: 0,
        total: orders.len() as u64,
        total_invested: 0.0,
    };

    for order in orders {
        match order.status {
            OrderStatus::Pending => counts.pending += 1,
            OrderStatus::PaymentUploaded => counts.payment_uploaded += 1,
            OrderStatus::Active => {
                counts.active += 1;
                counts.total_invested += order.amount;
            }
            OrderStatus::Cancelled => counts.cancelled += 1,
        }
    }

    counts
}

/// Revenue per calendar month over the last 12 months (UTC), oldest first.
/// Revenue counts active orders by their creation month.
pub fn monthly_revenue_series(orders: &[Order], now: DateTime<Utc>) -> Vec<RevenuePoint> {
    (0..12)
        .rev()
        .map(|back| {
            let (year, month) = months_back(now.year(), now.month(), back);
            let revenue = orders
                .iter()
                .filter(|o| o.status == OrderStatus::Active)
                .filter(|o| o.created_at.year() == year && o.created_at.month() == month)
                .map(|o| o.amount)
                .sum();
            RevenuePoint {
                month: format!("{year:04}-{month:02}"),
                revenue,
            }
        })
        .collect()
}

/// User registrations bucketed by the requested window (UTC), oldest first
pub fn registration_series(
    users: &[User],
    now: DateTime<Utc>,
    window: SeriesWindow,
) -> Vec<SeriesPoint> {
    match window {
        SeriesWindow::Days30 => {
            let today = now.date_naive();
            (0..30)
                .rev()
                .filter_map(|back| today.checked_sub_days(Days::new(back)))
                .map(|day| {
                    let count = users
                        .iter()
                        .filter(|u| u.created_at.date_naive() == day)
                        .count() as u64;
                    SeriesPoint {
                        label: day.format("%Y-%m-%d").to_string(),
                        count,
                    }
                })
                .collect()
        }
        SeriesWindow::Months12 => (0..12)
            .rev()
            .map(|back| {
                let (year, month) = months_back(now.year(), now.month(), back);
                let count = users
                    .iter()
                    .filter(|u| u.created_at.year() == year && u.created_at.month() == month)
                    .count() as u64;
                SeriesPoint {
                    label: format!("{year:04}-{month:02}"),
                    count,
                }
            })
            .collect(),
        SeriesWindow::Years5 => (0..5)
            .rev()
            .map(|back| {
                let year = now.year() - back;
                let count = users
                    .iter()
                    .filter(|u| u.created_at.year() == year)
                    .count() as u64;
                SeriesPoint {
                    label: year.to_string(),
                    count,
                }
            })
            .collect(),
    }
}

/// Count KYC records per status
pub fn kyc_status_counts(records: &[KycRecord]) -> KycStatusCounts {
    let mut counts = KycStatusCounts {
        pending: 0,
        submitted: 0,
        approved: 0,
        rejected: 0,
        total: records.len() as u64,
    };

    for record in records {
        match record.status {
            KycStatus::Pending => counts.pending += 1,
            KycStatus::Submitted => counts.submitted += 1,
            KycStatus::Approved => counts.approved += 1,
            KycStatus::Rejected => counts.rejected += 1,
        }
    }

    counts
}

/// Calendar month `back` months before `(year, month)`
fn months_back(year: i32, month: u32, back: i32) -> (i32, u32) {
    let total = year * 12 + month as i32 - 1 - back;
    (total.div_euclid(12), (total.rem_euclid(12) + 1) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use crate::kyc::entity::{DocumentType, KycDetails};

    fn order_with(status: OrderStatus, amount: f64, created_at: DateTime<Utc>) -> Order {
        let mut order = Order::new(
            "user-1",
            "Alice",
            "alice@example.com",
            "plan-1",
            "Gold Saver",
            amount,
            None,
        );
        order.status = status;
        order.created_at = created_at;
        order
    }

    fn user_registered_at(created_at: DateTime<Utc>) -> User {
        let mut user = User::new("alice@example.com", "Alice");
        user.created_at = created_at;
        user
    }

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).single().unwrap()
    }

    #[test]
    fn test_order_status_counts_and_revenue() {
        let orders = vec![
            order_with(OrderStatus::Pending, 1000.0, at(2026, 1, 5)),
            order_with(OrderStatus::Active, 50000.0, at(2026, 2, 1)),
            order_with(OrderStatus::Active, 25000.0, at(2026, 2, 20)),
            order_with(OrderStatus::Cancelled, 9000.0, at(2026, 3, 1)),
        ];

        let counts = order_status_counts(&orders);
        assert_eq!(counts.pending, 1);
        assert_eq!(counts.active, 2);
        assert_eq!(counts.cancelled, 1);
        assert_eq!(counts.payment_uploaded, 0);
        assert_eq!(counts.total, 4);
        assert_eq!(counts.total_invested, 75000.0);
    }

    #[test]
    fn test_monthly_revenue_buckets_by_creation_month() {
        let now = at(2026, 3, 15);
        let orders = vec![
            order_with(OrderStatus::Active, 10000.0, at(2026, 3, 1)),
            order_with(OrderStatus::Active, 5000.0, at(2026, 2, 28)),
            // Cancelled orders never count as revenue
            order_with(OrderStatus::Cancelled, 7000.0, at(2026, 3, 2)),
            // Outside the 12-month window
            order_with(OrderStatus::Active, 99999.0, at(2024, 1, 1)),
        ];

        let series = monthly_revenue_series(&orders, now);
        assert_eq!(series.len(), 12);
        assert_eq!(series[0].month, "2025-04");
        assert_eq!(series[11].month, "2026-03");
        assert_eq!(series[11].revenue, 10000.0);
        assert_eq!(series[10].revenue, 5000.0);
        assert_eq!(series[0].revenue, 0.0);
    }

    #[test]
    fn test_revenue_series_crosses_year_boundary() {
        let series = monthly_revenue_series(&[], at(2026, 1, 10));
        assert_eq!(series[0].month, "2025-02");
        assert_eq!(series[11].month, "2026-01");
    }

    #[test]
    fn test_registration_series_windows() {
        let now = at(2026, 3, 15);
        let users = vec![
            user_registered_at(at(2026, 3, 15)),
            user_registered_at(at(2026, 3, 14)),
            user_registered_at(at(2026, 2, 1)),
            user_registered_at(at(2022, 6, 1)),
        ];

        let daily = registration_series(&users, now, SeriesWindow::Days30);
        assert_eq!(daily.len(), 30);
        assert_eq!(daily[29].label, "2026-03-15");
        assert_eq!(daily[29].count, 1);
        assert_eq!(daily[28].count, 1);

        let monthly = registration_series(&users, now, SeriesWindow::Months12);
        assert_eq!(monthly.len(), 12);
        assert_eq!(monthly[11].count, 2);
        assert_eq!(monthly[10].count, 1);

        let yearly = registration_series(&users, now, SeriesWindow::Years5);
        assert_eq!(yearly.len(), 5);
        assert_eq!(yearly[0].label, "2022");
        assert_eq!(yearly[0].count, 1);
        assert_eq!(yearly[4].count, 3);
    }

    #[test]
    fn test_kyc_status_counts() {
        let details = KycDetails {
            full_name: "Alice".to_string(),
            date_of_birth: "1990-01-01".to_string(),
            address: "1 Main St".to_string(),
            document_type: DocumentType::Pan,
            document_number: "ABCDE1234F".to_string(),
            document_url: "https://blob/doc.pdf".to_string(),
        };
        let mut approved = KycRecord::new("user-1", details.clone());
        approved.approve("admin-1").unwrap();
        let submitted = KycRecord::new("user-2", details);

        let counts = kyc_status_counts(&[approved, submitted]);
        assert_eq!(counts.approved, 1);
        assert_eq!(counts.submitted, 1);
        assert_eq!(counts.pending, 0);
        assert_eq!(counts.total, 2);
    }

    #[test]
    fn test_folds_are_idempotent() {
        let now = at(2026, 3, 15);
        let orders = vec![
            order_with(OrderStatus::Active, 10000.0, at(2026, 3, 1)),
            order_with(OrderStatus::Pending, 2000.0, at(2026, 2, 1)),
        ];
        let users = vec![user_registered_at(at(2026, 3, 1))];

        assert_eq!(order_status_counts(&orders), order_status_counts(&orders));
        assert_eq!(
            monthly_revenue_series(&orders, now),
            monthly_revenue_series(&orders, now)
        );
        assert_eq!(
            registration_series(&users, now, SeriesWindow::Days30),
            registration_series(&users, now, SeriesWindow::Days30)
        );
    }
}
