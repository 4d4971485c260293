//! Mark Processing Use Case
//!
//! Advances an active order's fulfillment stage to Processing.

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::order::repository::OrderRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::details;
use super::events::OrderMarkedProcessing;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkProcessingCommand {
    pub order_id: String,
}

pub struct MarkProcessingUseCase<U: UnitOfWork> {
    order_repo: Arc<OrderRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> MarkProcessingUseCase<U> {
    pub fn new(order_repo: Arc<OrderRepository>, unit_of_work: Arc<U>) -> Self {
        Self {
            order_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: MarkProcessingCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<OrderMarkedProcessing> {
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

        if let Err(e) = order.mark_processing() {
            return UseCaseResult::failure(e);
        }

        let event = OrderMarkedProcessing::new(&ctx, &order);

        self.unit_of_work.commit(&order, event, &command).await
    }
}
