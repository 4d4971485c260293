//! Submit Payment Use Case
//!
//! User supplies the bank transaction reference for a pending order.

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::order::repository::OrderRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::details;
use super::events::PaymentSubmitted;

/// Command for submitting payment proof.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitPaymentCommand {
    pub order_id: String,

    /// Bank transaction reference
    pub transaction_id: String,

    /// Uploaded proof URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_proof: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_note: Option<String>,
}

pub struct SubmitPaymentUseCase<U: UnitOfWork> {
    order_repo: Arc<OrderRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> SubmitPaymentUseCase<U> {
    pub fn new(order_repo: Arc<OrderRepository>, unit_of_work: Arc<U>) -> Self {
        Self {
            order_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: SubmitPaymentCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<PaymentSubmitted> {
        // Validation before any store access
        let transaction_id = command.transaction_id.trim().to_string();
        if transaction_id.is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "TRANSACTION_ID_REQUIRED",
                "Transaction reference is required",
            ));
        }

        let mut order = match self.order_repo.find_by_id(&command.order_id).await {
            Ok(Some(order)) => order,
            Ok(None) => return UseCaseResult::failure(order_not_found(&command.order_id)),
            Err(e) => {
                return UseCaseResult::failure(UseCaseError::commit(format!(
                    "Failed to load order: {}", e
                )));
            }
        };

        // Ownership check; foreign orders are indistinguishable from missing ones
        if order.user_id != ctx.principal_id {
            return UseCaseResult::failure(order_not_found(&command.order_id));
        }

        if let Err(e) = order.submit_payment(
            transaction_id,
            command.payment_proof.clone(),
            command.payment_note.clone(),
        ) {
            return UseCaseResult::failure(e);
        }

        let event = PaymentSubmitted::new(&ctx, &order);

        self.unit_of_work.commit(&order, event, &command).await
    }
}

fn order_not_found(order_id: &str) -> UseCaseError {
    UseCaseError::not_found_with_details(
        "ORDER_NOT_FOUND",
        "Order not found",
        details! { "orderId" => order_id },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = SubmitPaymentCommand {
            order_id: "order-1".to_string(),
            transaction_id: "TXN-001".to_string(),
            payment_proof: Some("https://blob/proof.png".to_string()),
            payment_note: None,
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("orderId"));
        assert!(json.contains("transactionId"));
        assert!(!json.contains("paymentNote"));
    }
}
