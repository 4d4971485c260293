//! Support Query Domain Events

use serde::{Deserialize, Serialize};
use crate::usecase::ExecutionContext;
use crate::usecase::domain_event::EventMetadata;
use crate::impl_domain_event;
use crate::query::entity::SupportQuery;

const SPEC_VERSION: &str = "1.0";
const SOURCE: &str = "depositcore:invest";

fn query_metadata(ctx: &ExecutionContext, query_id: &str, event_type: &str) -> EventMetadata {
    EventMetadata::builder()
        .from(ctx)
        .event_type(event_type)
        .spec_version(SPEC_VERSION)
        .source(SOURCE)
        .subject(format!("invest.query.{}", query_id))
        .message_group(format!("invest:query:{}", query_id))
        .build()
}

/// Event emitted when a query is submitted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuerySubmitted {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub query_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub query_type: String,
    pub subject_line: String,
}

impl_domain_event!(QuerySubmitted);

impl QuerySubmitted {
    const EVENT_TYPE: &'static str = "depositcore:invest:query:submitted";

    pub fn new(ctx: &ExecutionContext, query: &SupportQuery) -> Self {
        Self {
            metadata: query_metadata(ctx, &query.id, Self::EVENT_TYPE),
            query_id: query.id.clone(),
            user_id: query.user_id.clone(),
            query_type: query.query_type.as_str().to_string(),
            subject_line: query.subject.clone(),
        }
    }
}

/// Event emitted when an admin replies.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryReplied {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub query_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub subject_line: String,
}

impl_domain_event!(QueryReplied);

impl QueryReplied {
    const EVENT_TYPE: &'static str = "depositcore:invest:query:replied";

    pub fn new(ctx: &ExecutionContext, query: &SupportQuery) -> Self {
        Self {
            metadata: query_metadata(ctx, &query.id, Self::EVENT_TYPE),
            query_id: query.id.clone(),
            user_id: query.user_id.clone(),
            subject_line: query.subject.clone(),
        }
    }
}

/// Event emitted when a query is resolved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResolved {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub query_id: String,
}

impl_domain_event!(QueryResolved);

impl QueryResolved {
    const EVENT_TYPE: &'static str = "depositcore:invest:query:resolved";

    pub fn new(ctx: &ExecutionContext, query: &SupportQuery) -> Self {
        Self {
            metadata: query_metadata(ctx, &query.id, Self::EVENT_TYPE),
            query_id: query.id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::entity::QueryType;
    use crate::usecase::DomainEvent;

    #[test]
    fn test_submitted_event_for_guest() {
        let ctx = ExecutionContext::create("anonymous");
        let query = SupportQuery::new(
            None,
            "guest@example.com",
            "Guest",
            "Rates",
            QueryType::General,
            "What are the current rates?",
        );
        let event = QuerySubmitted::new(&ctx, &query);
        assert_eq!(event.event_type(), "depositcore:invest:query:submitted");
        assert!(event.user_id.is_none());
        assert_eq!(event.query_type, "GENERAL");
    }
}
