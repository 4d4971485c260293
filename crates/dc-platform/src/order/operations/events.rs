//! Order Domain Events

use serde::{Deserialize, Serialize};
use crate::usecase::ExecutionContext;
use crate::usecase::domain_event::EventMetadata;
use crate::impl_domain_event;
use crate::order::entity::Order;

const SPEC_VERSION: &str = "1.0";
const SOURCE: &str = "depositcore:invest";

fn order_metadata(ctx: &ExecutionContext, order_id: &str, event_type: &str) -> EventMetadata {
    EventMetadata::builder()
        .from(ctx)
        .event_type(event_type)
        .spec_version(SPEC_VERSION)
        .source(SOURCE)
        .subject(format!("invest.order.{}", order_id))
        .message_group(format!("invest:order:{}", order_id))
        .build()
}

/// Event emitted when a user creates an order at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub order_id: String,
    pub user_id: String,
    pub plan_id: String,
    pub plan_name: String,
    pub amount: f64,
}

impl_domain_event!(OrderCreated);

impl OrderCreated {
    const EVENT_TYPE: &'static str = "depositcore:invest:order:created";

    pub fn new(ctx: &ExecutionContext, order: &Order) -> Self {
        Self {
            metadata: order_metadata(ctx, &order.id, Self::EVENT_TYPE),
            order_id: order.id.clone(),
            user_id: order.user_id.clone(),
            plan_id: order.plan_id.clone(),
            plan_name: order.plan_name.clone(),
            amount: order.amount,
        }
    }
}

/// Event emitted when a user submits the bank transaction reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSubmitted {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub order_id: String,
    pub user_id: String,
    pub transaction_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_proof: Option<String>,
}

impl_domain_event!(PaymentSubmitted);

impl PaymentSubmitted {
    const EVENT_TYPE: &'static str = "depositcore:invest:order:payment-submitted";

    pub fn new(ctx: &ExecutionContext, order: &Order) -> Self {
        Self {
            metadata: order_metadata(ctx, &order.id, Self::EVENT_TYPE),
            order_id: order.id.clone(),
            user_id: order.user_id.clone(),
            transaction_id: order.transaction_id.clone().unwrap_or_default(),
            payment_proof: order.payment_proof.clone(),
        }
    }
}

/// Admin decision on an uploaded payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderDecision {
    Approve,
    Reject,
}

/// Event emitted when an admin approves or rejects an uploaded payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDecided {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub order_id: String,
    pub user_id: String,
    pub plan_name: String,
    pub amount: f64,
    pub decision: OrderDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
}

impl_domain_event!(OrderDecided);

impl OrderDecided {
    const APPROVED_TYPE: &'static str = "depositcore:invest:order:approved";
    const REJECTED_TYPE: &'static str = "depositcore:invest:order:rejected";

    pub fn new(ctx: &ExecutionContext, order: &Order, decision: OrderDecision) -> Self {
        let event_type = match decision {
            OrderDecision::Approve => Self::APPROVED_TYPE,
            OrderDecision::Reject => Self::REJECTED_TYPE,
        };
        Self {
            metadata: order_metadata(ctx, &order.id, event_type),
            order_id: order.id.clone(),
            user_id: order.user_id.clone(),
            plan_name: order.plan_name.clone(),
            amount: order.amount,
            decision,
            admin_note: order.admin_note.clone(),
        }
    }
}

/// Event emitted when an active order advances to the processing stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderMarkedProcessing {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub order_id: String,
    pub user_id: String,
}

impl_domain_event!(OrderMarkedProcessing);

impl OrderMarkedProcessing {
    const EVENT_TYPE: &'static str = "depositcore:invest:order:processing";

    pub fn new(ctx: &ExecutionContext, order: &Order) -> Self {
        Self {
            metadata: order_metadata(ctx, &order.id, Self::EVENT_TYPE),
            order_id: order.id.clone(),
            user_id: order.user_id.clone(),
        }
    }
}

/// Event emitted when a certificate is attached or replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateAttached {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub order_id: String,
    pub user_id: String,
    pub plan_name: String,
    pub certificate_url: String,
    pub uploaded_by: String,
}

impl_domain_event!(CertificateAttached);

impl CertificateAttached {
    const EVENT_TYPE: &'static str = "depositcore:invest:order:certificate-attached";

    pub fn new(ctx: &ExecutionContext, order: &Order) -> Self {
        let (certificate_url, uploaded_by) = order.certificate
            .as_ref()
            .map(|c| (c.url.clone(), c.uploaded_by.clone()))
            .unwrap_or_default();
        Self {
            metadata: order_metadata(ctx, &order.id, Self::EVENT_TYPE),
            order_id: order.id.clone(),
            user_id: order.user_id.clone(),
            plan_name: order.plan_name.clone(),
            certificate_url,
            uploaded_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::DomainEvent;

    fn test_order() -> Order {
        Order::new("user-1", "Alice", "alice@example.com", "plan-1", "Gold Saver", 50000.0, None)
    }

    #[test]
    fn test_order_created_event() {
        let ctx = ExecutionContext::create("user-1");
        let order = test_order();
        let event = OrderCreated::new(&ctx, &order);

        assert_eq!(event.event_type(), "depositcore:invest:order:created");
        assert_eq!(event.subject(), format!("invest.order.{}", order.id));
        assert_eq!(event.message_group(), format!("invest:order:{}", order.id));
        assert_eq!(event.amount, 50000.0);
        assert_eq!(event.correlation_id(), ctx.correlation_id);
    }

    #[test]
    fn test_decided_event_type_follows_decision() {
        let ctx = ExecutionContext::create("admin-1");
        let mut order = test_order();
        order.submit_payment("TXN-001".to_string(), None, None).unwrap();

        let mut approved = order.clone();
        approved.approve(None).unwrap();
        let event = OrderDecided::new(&ctx, &approved, OrderDecision::Approve);
        assert_eq!(event.event_type(), "depositcore:invest:order:approved");

        let mut rejected = order;
        rejected.reject(Some("no match".to_string())).unwrap();
        let event = OrderDecided::new(&ctx, &rejected, OrderDecision::Reject);
        assert_eq!(event.event_type(), "depositcore:invest:order:rejected");
        assert_eq!(event.admin_note.as_deref(), Some("no match"));
    }

    #[test]
    fn test_certificate_attached_event_carries_url() {
        let ctx = ExecutionContext::create("admin-1");
        let mut order = test_order();
        order.submit_payment("TXN-001".to_string(), None, None).unwrap();
        order.approve(None).unwrap();
        order.attach_certificate("https://blob/cert.pdf".to_string(), "admin-1".to_string()).unwrap();

        let event = CertificateAttached::new(&ctx, &order);
        assert_eq!(event.certificate_url, "https://blob/cert.pdf");
        assert_eq!(event.uploaded_by, "admin-1");
    }
}
