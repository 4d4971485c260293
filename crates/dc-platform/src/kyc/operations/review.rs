//! Review KYC Use Case
//!
//! Admin approves or rejects a submitted record. Rejection requires a
//! non-empty reason, validated before any store access. The record and
//! the denormalized user status commit atomically.

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::kyc::entity::KycStatus;
use crate::kyc::repository::KycRepository;
use crate::user::repository::UserRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::details;
use super::events::{KycDecision, KycReviewed};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewKycCommand {
    pub user_id: String,
    pub decision: KycDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

pub struct ReviewKycUseCase<U: UnitOfWork> {
    kyc_repo: Arc<KycRepository>,
    user_repo: Arc<UserRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> ReviewKycUseCase<U> {
    pub fn new(
        kyc_repo: Arc<KycRepository>,
        user_repo: Arc<UserRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            kyc_repo,
            user_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: ReviewKycCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<KycReviewed> {
        // Rejection reason is validated before any store access
        let reason = command.rejection_reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(String::from);
        if command.decision == KycDecision::Reject && reason.is_none() {
            return UseCaseResult::failure(UseCaseError::validation(
                "REJECTION_REASON_REQUIRED",
                "A rejection reason is required",
            ));
        }

        let mut record = match self.kyc_repo.find_by_user(&command.user_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found_with_details(
                    "KYC_NOT_FOUND",
                    "No KYC record for this user",
                    details! { "userId" => &command.user_id },
                ));
            }
            Err(e) => {
                return UseCaseResult::failure(UseCaseError::commit(format!(
                    "Failed to load KYC record: {}", e
                )));
            }
        };

        let mut user = match self.user_repo.find_by_id(&command.user_id).await {
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

        let transition = match command.decision {
            KycDecision::Approve => record.approve(&ctx.principal_id),
            KycDecision::Reject => {
                // reason is Some, checked above
                record.reject(&ctx.principal_id, reason.unwrap_or_default())
            }
        };
        if let Err(e) = transition {
            return UseCaseResult::failure(e);
        }

        let user_status = match command.decision {
            KycDecision::Approve => KycStatus::Approved,
            KycDecision::Reject => KycStatus::Rejected,
        };
        user.set_kyc_status(user_status);

        let event = KycReviewed::new(&ctx, &record, command.decision);

        self.unit_of_work
            .commit_all(vec![Box::new(record), Box::new(user)], event, &command)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::unit_of_work::InMemoryUnitOfWork;

    /// The client only parses the URI here; nothing is listening, and the
    /// short selection timeout makes any accidental lookup fail fast.
    async fn offline_use_case() -> (ReviewKycUseCase<InMemoryUnitOfWork>, Arc<InMemoryUnitOfWork>) {
        let client = mongodb::Client::with_uri_str(
            "mongodb://127.0.0.1:27017/?serverSelectionTimeoutMS=50",
        )
        .await
        .unwrap();
        let db = client.database("depositcore-test");
        let uow = Arc::new(InMemoryUnitOfWork::new());
        let use_case = ReviewKycUseCase::new(
            Arc::new(KycRepository::new(&db)),
            Arc::new(UserRepository::new(&db)),
            uow.clone(),
        );
        (use_case, uow)
    }

    #[tokio::test]
    async fn test_reject_without_reason_fails_before_any_lookup() {
        let (use_case, uow) = offline_use_case().await;

        for reason in [None, Some(String::new()), Some("   ".to_string())] {
            let command = ReviewKycCommand {
                user_id: "user-1".to_string(),
                decision: KycDecision::Reject,
                rejection_reason: reason,
            };
            let ctx = ExecutionContext::create("admin-1");

            let err = use_case.execute(command, ctx).await.into_result().unwrap_err();
            assert_eq!(err.code(), "REJECTION_REASON_REQUIRED");
        }

        assert!(uow.committed_events.lock().unwrap().is_empty());
    }

    #[test]
    fn test_command_serialization() {
        let cmd = ReviewKycCommand {
            user_id: "user-1".to_string(),
            decision: KycDecision::Reject,
            rejection_reason: Some("Document illegible".to_string()),
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("REJECT"));
        assert!(json.contains("rejectionReason"));
    }
}
