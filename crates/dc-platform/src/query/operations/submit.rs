//! Submit Query Use Case
//!
//! Accepts guest and authenticated submissions. Priority queries
//! require an account.

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::query::entity::{QueryType, SupportQuery};
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use super::events::QuerySubmitted;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitQueryCommand {
    /// None for guest submissions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub user_email: String,
    pub user_name: String,
    pub subject: String,
    pub query_type: QueryType,
    pub message: String,
}

pub struct SubmitQueryUseCase<U: UnitOfWork> {
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> SubmitQueryUseCase<U> {
    pub fn new(unit_of_work: Arc<U>) -> Self {
        Self { unit_of_work }
    }

    pub async fn execute(
        &self,
        command: SubmitQueryCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<QuerySubmitted> {
        if command.subject.trim().is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "SUBJECT_REQUIRED",
                "Subject is required",
            ));
        }
        if command.message.trim().is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "MESSAGE_REQUIRED",
                "Message is required",
            ));
        }
        if command.user_email.trim().is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "EMAIL_REQUIRED",
                "A contact email is required",
            ));
        }
        if command.query_type == QueryType::Priority && command.user_id.is_none() {
            return UseCaseResult::failure(UseCaseError::validation(
                "PRIORITY_REQUIRES_ACCOUNT",
                "Priority queries require a signed-in account",
            ));
        }

        let query = SupportQuery::new(
            command.user_id.clone(),
            command.user_email.trim(),
            command.user_name.trim(),
            command.subject.trim(),
            command.query_type,
            command.message.trim(),
        );

        let event = QuerySubmitted::new(&ctx, &query);

        self.unit_of_work.commit(&query, event, &command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::unit_of_work::InMemoryUnitOfWork;

    fn guest_command(query_type: QueryType) -> SubmitQueryCommand {
        SubmitQueryCommand {
            user_id: None,
            user_email: "guest@example.com".to_string(),
            user_name: "Guest".to_string(),
            subject: "Rates".to_string(),
            query_type,
            message: "What are the current rates?".to_string(),
        }
    }

    #[tokio::test]
    async fn test_guest_can_submit_general() {
        let use_case = SubmitQueryUseCase::new(Arc::new(InMemoryUnitOfWork::new()));
        let ctx = ExecutionContext::create("anonymous");

        let result = use_case.execute(guest_command(QueryType::General), ctx).await;
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_guest_cannot_submit_priority() {
        let use_case = SubmitQueryUseCase::new(Arc::new(InMemoryUnitOfWork::new()));
        let ctx = ExecutionContext::create("anonymous");

        let err = use_case
            .execute(guest_command(QueryType::Priority), ctx)
            .await
            .into_result()
            .unwrap_err();
        assert_eq!(err.code(), "PRIORITY_REQUIRES_ACCOUNT");
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let use_case = SubmitQueryUseCase::new(Arc::new(InMemoryUnitOfWork::new()));
        let ctx = ExecutionContext::create("user-1");

        let mut command = guest_command(QueryType::General);
        command.message = "   ".to_string();
        let err = use_case.execute(command, ctx).await.into_result().unwrap_err();
        assert_eq!(err.code(), "MESSAGE_REQUIRED");
    }
}
