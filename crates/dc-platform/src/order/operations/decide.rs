//! Decide Order Use Case
//!
//! Admin approves or rejects an uploaded payment. Approval activates the
//! deposit; rejection cancels the order. Both decisions are final: a
//! second decide fails with an invalid-state error instead of silently
//! overwriting the first.

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::order::repository::OrderRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::details;
use super::events::{OrderDecided, OrderDecision};

/// Command for the admin payment decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideOrderCommand {
    pub order_id: String,
    pub decision: OrderDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_note: Option<String>,
}

pub struct DecideOrderUseCase<U: UnitOfWork> {
    order_repo: Arc<OrderRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> DecideOrderUseCase<U> {
    pub fn new(order_repo: Arc<OrderRepository>, unit_of_work: Arc<U>) -> Self {
        Self {
            order_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: DecideOrderCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<OrderDecided> {
        let mut order = match self.order_repo.find_by_id(&command.order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found_with_details(
                    "ORDER_NOT_FOUND",
                    "Order not found",
                    details! { "orderId" => &command.order_id },
                ));
            }
            Err(e) => {
                return UseCaseResult::failure(UseCaseError::commit(format!(
                    "Failed to load order: {}", e
                )));
            }
        };

        let admin_note = command.admin_note
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(String::from);

        let transition = match command.decision {
            OrderDecision::Approve => order.approve(admin_note),
            OrderDecision::Reject => order.reject(admin_note),
        };
        if let Err(e) = transition {
            return UseCaseResult::failure(e);
        }

        let event = OrderDecided::new(&ctx, &order, command.decision);

        self.unit_of_work.commit(&order, event, &command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = DecideOrderCommand {
            order_id: "order-1".to_string(),
            decision: OrderDecision::Approve,
            admin_note: Some("payment verified".to_string()),
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("APPROVE"));
        assert!(json.contains("adminNote"));
    }

    #[test]
    fn test_decision_deserialization() {
        let cmd: DecideOrderCommand = serde_json::from_str(
            r#"{"orderId":"order-1","decision":"REJECT"}"#
        ).unwrap();
        assert_eq!(cmd.decision, OrderDecision::Reject);
        assert!(cmd.admin_note.is_none());
    }
}
