//! Create Order Use Case
//!
//! Checkout: validates the plan and amount, snapshots the default
//! receiving account, and creates the order in Pending status.

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::order::entity::{Order, BankSnapshot};
use crate::plan::repository::PlanRepository;
use crate::bank_detail::repository::BankDetailRepository;
use crate::user::repository::UserRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::details;
use super::events::OrderCreated;

/// Command for creating a new order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderCommand {
    pub plan_id: String,
    pub amount: f64,
}

pub struct CreateOrderUseCase<U: UnitOfWork> {
    plan_repo: Arc<PlanRepository>,
    bank_detail_repo: Arc<BankDetailRepository>,
    user_repo: Arc<UserRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> CreateOrderUseCase<U> {
    pub fn new(
        plan_repo: Arc<PlanRepository>,
        bank_detail_repo: Arc<BankDetailRepository>,
        user_repo: Arc<UserRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            plan_repo,
            bank_detail_repo,
            user_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: CreateOrderCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<OrderCreated> {
        // Validation: amount must be positive
        if command.amount <= 0.0 {
            return UseCaseResult::failure(UseCaseError::validation(
                "AMOUNT_REQUIRED",
                "Investment amount must be positive",
            ));
        }

        // The ordering user must exist and not be banned
        let user = match self.user_repo.find_by_id(&ctx.principal_id).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "USER_NOT_FOUND",
                    "User account not found",
                ));
            }
            Err(e) => {
                return UseCaseResult::failure(UseCaseError::commit(format!(
                    "Failed to load user: {}", e
                )));
            }
        };
        if user.is_banned() {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "USER_BANNED",
                "Banned accounts cannot create orders",
            ));
        }

        // Business rule: plan must exist and be active
        let plan = match self.plan_repo.find_by_id(&command.plan_id).await {
            Ok(Some(plan)) => plan,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found_with_details(
                    "PLAN_NOT_FOUND",
                    "Investment plan not found",
                    details! { "planId" => &command.plan_id },
                ));
            }
            Err(e) => {
                return UseCaseResult::failure(UseCaseError::commit(format!(
                    "Failed to load plan: {}", e
                )));
            }
        };
        if !plan.is_active {
            return UseCaseResult::failure(UseCaseError::business_rule_with_details(
                "PLAN_INACTIVE",
                "Investment plan is no longer available",
                details! { "planId" => &plan.id },
            ));
        }

        // Business rule: amount within the plan bounds
        if !plan.accepts_amount(command.amount) {
            return UseCaseResult::failure(UseCaseError::validation_with_details(
                "AMOUNT_OUT_OF_RANGE",
                format!(
                    "Amount must be between {} and {}",
                    plan.min_amount,
                    plan.max_amount.map(|m| m.to_string()).unwrap_or_else(|| "unlimited".to_string())
                ),
                details! { "planId" => &plan.id },
            ));
        }

        // Snapshot the current default receiving account, if configured
        let bank_details = match self.bank_detail_repo.find_default().await {
            Ok(detail) => detail.as_ref().map(BankSnapshot::from),
            Err(e) => {
                return UseCaseResult::failure(UseCaseError::commit(format!(
                    "Failed to load bank details: {}", e
                )));
            }
        };

        let order = Order::new(
            &user.id,
            &user.name,
            &user.email,
            &plan.id,
            &plan.name,
            command.amount,
            bank_details,
        );

        let event = OrderCreated::new(&ctx, &order);

        self.unit_of_work.commit(&order, event, &command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = CreateOrderCommand {
            plan_id: "plan-123".to_string(),
            amount: 50000.0,
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("planId"));
        assert!(json.contains("50000"));
    }
}
