//! Investment Plan Entity

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// Fixed-deposit investment plan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentPlan {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// Plan name (unique)
    pub name: String,

    pub description: String,

    /// Minimum investment amount
    pub min_amount: f64,

    /// Maximum investment amount, None means uncapped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_amount: Option<f64>,

    /// Annual interest rate in percent
    pub interest_rate: f64,

    /// Deposit tenure in months
    pub tenure_months: i32,

    /// Inactive plans are hidden from users and reject new orders
    #[serde(default = "default_active")]
    pub is_active: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

impl InvestmentPlan {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        min_amount: f64,
        max_amount: Option<f64>,
        interest_rate: f64,
        tenure_months: i32,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            name: name.into(),
            description: description.into(),
            min_amount,
            max_amount,
            interest_rate,
            tenure_months,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check an order amount against the plan bounds
    pub fn accepts_amount(&self, amount: f64) -> bool {
        if amount < self.min_amount {
            return false;
        }
        match self.max_amount {
            Some(max) => amount <= max,
            None => true,
        }
    }

    pub fn activate(&mut self) {
        self.is_active = true;
        self.updated_at = Utc::now();
    }

    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_amount_within_bounds() {
        let plan = InvestmentPlan::new("Gold", "12 month deposit", 10000.0, Some(500000.0), 7.5, 12);
        assert!(plan.accepts_amount(10000.0));
        assert!(plan.accepts_amount(500000.0));
        assert!(!plan.accepts_amount(9999.99));
        assert!(!plan.accepts_amount(500000.01));
    }

    #[test]
    fn test_uncapped_plan() {
        let plan = InvestmentPlan::new("Platinum", "uncapped", 100000.0, None, 8.0, 24);
        assert!(plan.accepts_amount(10_000_000.0));
        assert!(!plan.accepts_amount(50000.0));
    }

    #[test]
    fn test_activate_deactivate() {
        let mut plan = InvestmentPlan::new("Silver", "6 month deposit", 5000.0, None, 6.0, 6);
        assert!(plan.is_active);
        plan.deactivate();
        assert!(!plan.is_active);
        plan.activate();
        assert!(plan.is_active);
    }
}
