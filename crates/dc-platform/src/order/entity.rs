//! Order Entity
//!
//! Fixed-deposit order aggregate with an explicit state machine.
//!
//! Status transitions:
//!
//! ```text
//! Pending --submit_payment--> PaymentUploaded --approve--> Active
//!                                    |
//!                                    +--reject--> Cancelled
//! ```
//!
//! `Active` and `Cancelled` are terminal for status. While `Active`, the
//! fulfillment stage may advance `Confirmed -> Processing` and a certificate
//! may be attached or replaced; neither changes the status.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use crate::bank_detail::entity::BankDetail;
use crate::usecase::UseCaseError;
use crate::usecase::unit_of_work::HasId;
use crate::details;

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Created, awaiting payment submission
    Pending,
    /// Payment proof submitted, awaiting admin review
    PaymentUploaded,
    /// Payment approved, deposit running (terminal for status)
    Active,
    /// Payment rejected (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Wire name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::PaymentUploaded => "PAYMENT_UPLOADED",
            Self::Active => "ACTIVE",
            Self::Cancelled => "CANCELLED",
        }
    }
}

/// Fulfillment stage, set only while the order is Active
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FulfillmentStage {
    /// Payment confirmed, deposit booked
    Confirmed,
    /// Back-office processing underway
    Processing,
}

impl FulfillmentStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "CONFIRMED",
            Self::Processing => "PROCESSING",
        }
    }
}

/// Snapshot of the receiving account taken at checkout.
/// Later edits to the bank detail do not affect existing orders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankSnapshot {
    pub account_name: String,
    pub account_number: String,
    pub ifsc: String,
    pub bank_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
}

impl From<&BankDetail> for BankSnapshot {
    fn from(detail: &BankDetail) -> Self {
        Self {
            account_name: detail.account_name.clone(),
            account_number: detail.account_number.clone(),
            ifsc: detail.ifsc.clone(),
            bank_name: detail.bank_name.clone(),
            upi_id: detail.upi_id.clone(),
        }
    }
}

/// Investment certificate attached by an admin once the order is Active
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub url: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: String,
}

/// Order aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub user_id: String,
    pub user_name: String,
    pub user_email: String,

    pub plan_id: String,
    pub plan_name: String,

    /// Invested amount, immutable after creation
    pub amount: f64,

    pub status: OrderStatus,

    /// Set only while Active
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fulfillment_stage: Option<FulfillmentStage>,

    /// Uploaded payment proof URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_proof: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_note: Option<String>,

    /// Bank transaction reference supplied by the user
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,

    /// Receiving account snapshot taken at checkout
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_details: Option<BankSnapshot>,

    /// Note recorded by the reviewing admin
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub certificate: Option<Certificate>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
        plan_id: impl Into<String>,
        plan_name: impl Into<String>,
        amount: f64,
        bank_details: Option<BankSnapshot>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            user_id: user_id.into(),
            user_name: user_name.into(),
            user_email: user_email.into(),
            plan_id: plan_id.into(),
            plan_name: plan_name.into(),
            amount,
            status: OrderStatus::Pending,
            fulfillment_stage: None,
            payment_proof: None,
            payment_note: None,
            transaction_id: None,
            bank_details,
            admin_note: None,
            certificate: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// User submits the bank transaction reference: Pending -> PaymentUploaded
    pub fn submit_payment(
        &mut self,
        transaction_id: String,
        payment_proof: Option<String>,
        payment_note: Option<String>,
    ) -> Result<(), UseCaseError> {
        if self.status != OrderStatus::Pending {
            return Err(self.invalid_state("ORDER_NOT_PENDING", "Payment can only be submitted for a pending order"));
        }

        self.transaction_id = Some(transaction_id);
        self.payment_proof = payment_proof;
        self.payment_note = payment_note;
        self.status = OrderStatus::PaymentUploaded;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Admin approves the payment: PaymentUploaded -> Active(Confirmed)
    pub fn approve(&mut self, admin_note: Option<String>) -> Result<(), UseCaseError> {
        if self.status != OrderStatus::PaymentUploaded {
            return Err(self.invalid_state("ORDER_NOT_AWAITING_REVIEW", "Only an order awaiting review can be approved"));
        }

        self.status = OrderStatus::Active;
        self.fulfillment_stage = Some(FulfillmentStage::Confirmed);
        self.admin_note = admin_note;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Admin rejects the payment: PaymentUploaded -> Cancelled
    pub fn reject(&mut self, admin_note: Option<String>) -> Result<(), UseCaseError> {
        if self.status != OrderStatus::PaymentUploaded {
            return Err(self.invalid_state("ORDER_NOT_AWAITING_REVIEW", "Only an order awaiting review can be rejected"));
        }

        self.status = OrderStatus::Cancelled;
        self.admin_note = admin_note;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Advance the fulfillment stage: Active(Confirmed) -> Active(Processing)
    pub fn mark_processing(&mut self) -> Result<(), UseCaseError> {
        if self.status != OrderStatus::Active {
            return Err(self.invalid_state("ORDER_NOT_ACTIVE", "Only an active order can be marked processing"));
        }
        if self.fulfillment_stage != Some(FulfillmentStage::Confirmed) {
            return Err(self.invalid_state("ORDER_NOT_CONFIRMED", "Order is already past the confirmed stage"));
        }

        self.fulfillment_stage = Some(FulfillmentStage::Processing);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Attach or replace the investment certificate. Allowed only while
    /// Active; does not change the status.
    pub fn attach_certificate(
        &mut self,
        url: String,
        uploaded_by: String,
    ) -> Result<(), UseCaseError> {
        if self.status != OrderStatus::Active {
            return Err(self.invalid_state("ORDER_NOT_ACTIVE", "Certificates can only be attached to active orders"));
        }

        self.certificate = Some(Certificate {
            url,
            uploaded_at: Utc::now(),
            uploaded_by,
        });
        self.updated_at = Utc::now();
        Ok(())
    }

    fn invalid_state(&self, code: &str, message: &str) -> UseCaseError {
        UseCaseError::business_rule_with_details(
            code,
            message,
            details! {
                "orderId" => &self.id,
                "status" => format!("{:?}", self.status)
            },
        )
    }
}

impl HasId for Order {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "orders"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending_order() -> Order {
        Order::new("user-1", "Alice", "alice@example.com", "plan-1", "Gold Saver", 50000.0, None)
    }

    fn uploaded_order() -> Order {
        let mut order = pending_order();
        order.submit_payment("TXN-001".to_string(), None, None).unwrap();
        order
    }

    #[test]
    fn test_new_order_is_pending() {
        let order = pending_order();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.fulfillment_stage.is_none());
        assert!(order.certificate.is_none());
    }

    #[test]
    fn test_submit_payment_transitions_to_payment_uploaded() {
        let mut order = pending_order();
        order.submit_payment("TXN-001".to_string(), Some("https://blob/proof.png".to_string()), None).unwrap();
        assert_eq!(order.status, OrderStatus::PaymentUploaded);
        assert_eq!(order.transaction_id.as_deref(), Some("TXN-001"));
    }

    #[test]
    fn test_submit_payment_twice_fails() {
        let mut order = uploaded_order();
        let err = order.submit_payment("TXN-002".to_string(), None, None).unwrap_err();
        assert_eq!(err.code(), "ORDER_NOT_PENDING");
        assert_eq!(order.transaction_id.as_deref(), Some("TXN-001"));
    }

    #[test]
    fn test_approve_sets_active_and_confirmed() {
        let mut order = uploaded_order();
        order.approve(Some("verified".to_string())).unwrap();
        assert_eq!(order.status, OrderStatus::Active);
        assert_eq!(order.fulfillment_stage, Some(FulfillmentStage::Confirmed));
        assert_eq!(order.admin_note.as_deref(), Some("verified"));
    }

    #[test]
    fn test_double_decide_fails() {
        let mut order = uploaded_order();
        order.approve(None).unwrap();

        let err = order.approve(None).unwrap_err();
        assert_eq!(err.code(), "ORDER_NOT_AWAITING_REVIEW");
        assert_eq!(order.status, OrderStatus::Active);

        let err = order.reject(None).unwrap_err();
        assert_eq!(err.code(), "ORDER_NOT_AWAITING_REVIEW");
        assert_eq!(order.status, OrderStatus::Active);
    }

    #[test]
    fn test_reject_is_terminal() {
        let mut order = uploaded_order();
        order.reject(Some("transaction not found".to_string())).unwrap();
        assert_eq!(order.status, OrderStatus::Cancelled);
        assert!(order.fulfillment_stage.is_none());

        assert!(order.approve(None).is_err());
        assert!(order.mark_processing().is_err());
        assert!(order.attach_certificate("u".to_string(), "admin".to_string()).is_err());
    }

    #[test]
    fn test_mark_processing_requires_confirmed_stage() {
        let mut order = uploaded_order();
        assert_eq!(order.mark_processing().unwrap_err().code(), "ORDER_NOT_ACTIVE");

        order.approve(None).unwrap();
        order.mark_processing().unwrap();
        assert_eq!(order.status, OrderStatus::Active);
        assert_eq!(order.fulfillment_stage, Some(FulfillmentStage::Processing));

        assert_eq!(order.mark_processing().unwrap_err().code(), "ORDER_NOT_CONFIRMED");
    }

    #[test]
    fn test_certificate_only_on_active_and_replaceable() {
        let mut order = uploaded_order();
        assert!(order.attach_certificate("https://blob/cert.pdf".to_string(), "admin-1".to_string()).is_err());

        order.approve(None).unwrap();
        order.attach_certificate("https://blob/cert.pdf".to_string(), "admin-1".to_string()).unwrap();
        assert_eq!(order.status, OrderStatus::Active);

        // Re-upload replaces the previous certificate
        order.attach_certificate("https://blob/cert-v2.pdf".to_string(), "admin-2".to_string()).unwrap();
        assert_eq!(order.certificate.as_ref().unwrap().url, "https://blob/cert-v2.pdf");
        assert_eq!(order.certificate.as_ref().unwrap().uploaded_by, "admin-2");
    }

    #[test]
    fn test_bank_snapshot_from_detail() {
        let detail = BankDetail::new("DepositCore Ltd", "1234567890", "HDFC0001234", "HDFC Bank", None);
        let snapshot = BankSnapshot::from(&detail);
        assert_eq!(snapshot.account_number, "1234567890");
        assert_eq!(snapshot.ifsc, "HDFC0001234");
    }
}
