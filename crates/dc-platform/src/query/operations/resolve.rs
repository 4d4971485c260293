//! Resolve Query Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::query::repository::QueryRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::details;
use super::events::QueryResolved;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveQueryCommand {
    pub query_id: String,
}

pub struct ResolveQueryUseCase<U: UnitOfWork> {
    query_repo: Arc<QueryRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> ResolveQueryUseCase<U> {
    pub fn new(query_repo: Arc<QueryRepository>, unit_of_work: Arc<U>) -> Self {
        Self {
            query_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: ResolveQueryCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<QueryResolved> {
        let mut query = match self.query_repo.find_by_id(&command.query_id).await {
            Ok(Some(query)) => query,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found_with_details(
                    "QUERY_NOT_FOUND",
                    "Query not found",
                    details! { "queryId" => &command.query_id },
                ));
            }
            Err(e) => {
                return UseCaseResult::failure(UseCaseError::commit(format!(
                    "Failed to load query: {}", e
                )));
            }
        };

        if let Err(e) = query.resolve() {
            return UseCaseResult::failure(e);
        }

        let event = QueryResolved::new(&ctx, &query);

        self.unit_of_work.commit(&query, event, &command).await
    }
}
