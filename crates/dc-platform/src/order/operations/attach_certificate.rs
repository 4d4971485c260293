//! Attach Certificate Use Case
//!
//! Admin attaches (or replaces) the investment certificate on an
//! active order.

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::order::repository::OrderRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::details;
use super::events::CertificateAttached;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachCertificateCommand {
    pub order_id: String,
    pub certificate_url: String,
}

pub struct AttachCertificateUseCase<U: UnitOfWork> {
    order_repo: Arc<OrderRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> AttachCertificateUseCase<U> {
    pub fn new(order_repo: Arc<OrderRepository>, unit_of_work: Arc<U>) -> Self {
        Self {
            order_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: AttachCertificateCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<CertificateAttached> {
        let certificate_url = command.certificate_url.trim().to_string();
        if certificate_url.is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "CERTIFICATE_URL_REQUIRED",
                "Certificate URL is required",
            ));
        }

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

        if let Err(e) = order.attach_certificate(certificate_url, ctx.principal_id.clone()) {
            return UseCaseResult::failure(e);
        }

        let event = CertificateAttached::new(&ctx, &order);

        self.unit_of_work.commit(&order, event, &command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = AttachCertificateCommand {
            order_id: "order-1".to_string(),
            certificate_url: "https://blob/certificates/cert.pdf".to_string(),
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("certificateUrl"));
    }
}
