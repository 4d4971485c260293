//! Support Query Entity
//!
//! A support conversation with an append-only message log. Guests may
//! submit General queries; Priority queries require an account.
//!
//! ```text
//! Open --reply--> Replied --resolve--> Resolved
//!   \______________resolve______________/
//! ```

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use crate::usecase::UseCaseError;
use crate::usecase::unit_of_work::HasId;
use crate::details;

/// Query priority class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryType {
    General,
    /// Requires an authenticated submitter
    Priority,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "GENERAL",
            Self::Priority => "PRIORITY",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "GENERAL" => Some(Self::General),
            "PRIORITY" => Some(Self::Priority),
            _ => None,
        }
    }
}

/// Conversation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QueryStatus {
    Open,
    Replied,
    Resolved,
}

impl QueryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "OPEN",
            Self::Replied => "REPLIED",
            Self::Resolved => "RESOLVED",
        }
    }
}

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuerySender {
    User,
    Admin,
}

/// Single message in the conversation log
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryMessage {
    pub sender: QuerySender,
    pub message: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub timestamp: DateTime<Utc>,
}

/// Support query aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportQuery {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// None for guest submissions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    pub user_email: String,
    pub user_name: String,

    pub subject: String,
    pub query_type: QueryType,
    pub status: QueryStatus,

    /// Append-only conversation log
    pub messages: Vec<QueryMessage>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl SupportQuery {
    pub fn new(
        user_id: Option<String>,
        user_email: impl Into<String>,
        user_name: impl Into<String>,
        subject: impl Into<String>,
        query_type: QueryType,
        message: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            user_id,
            user_email: user_email.into(),
            user_name: user_name.into(),
            subject: subject.into(),
            query_type,
            status: QueryStatus::Open,
            messages: vec![QueryMessage {
                sender: QuerySender::User,
                message: message.into(),
                timestamp: now,
            }],
            created_at: now,
            updated_at: now,
        }
    }

    /// Admin reply: appends a message and moves the query to Replied.
    /// Resolved queries cannot be replied to.
    pub fn reply(&mut self, message: impl Into<String>) -> Result<(), UseCaseError> {
        if self.status == QueryStatus::Resolved {
            return Err(self.invalid_state(
                "QUERY_RESOLVED",
                "A resolved query cannot be replied to",
            ));
        }

        let now = Utc::now();
        self.messages.push(QueryMessage {
            sender: QuerySender::Admin,
            message: message.into(),
            timestamp: now,
        });
        self.status = QueryStatus::Replied;
        self.updated_at = now;
        Ok(())
    }

    /// Close the conversation: Open/Replied -> Resolved
    pub fn resolve(&mut self) -> Result<(), UseCaseError> {
        if self.status == QueryStatus::Resolved {
            return Err(self.invalid_state(
                "QUERY_ALREADY_RESOLVED",
                "Query is already resolved",
            ));
        }

        self.status = QueryStatus::Resolved;
        self.updated_at = Utc::now();
        Ok(())
    }

    fn invalid_state(&self, code: &str, message: &str) -> UseCaseError {
        UseCaseError::business_rule_with_details(
            code,
            message,
            details! {
                "queryId" => &self.id,
                "status" => self.status.as_str()
            },
        )
    }
}

impl HasId for SupportQuery {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "queries"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_query() -> SupportQuery {
        SupportQuery::new(
            Some("user-1".to_string()),
            "alice@example.com",
            "Alice",
            "Payout date",
            QueryType::General,
            "When does my deposit mature?",
        )
    }

    #[test]
    fn test_new_query_is_open_with_one_message() {
        let query = open_query();
        assert_eq!(query.status, QueryStatus::Open);
        assert_eq!(query.messages.len(), 1);
        assert_eq!(query.messages[0].sender, QuerySender::User);
    }

    #[test]
    fn test_reply_appends_and_sets_replied() {
        let mut query = open_query();
        query.reply("It matures on the tenure end date.").unwrap();
        assert_eq!(query.status, QueryStatus::Replied);
        assert_eq!(query.messages.len(), 2);
        assert_eq!(query.messages[1].sender, QuerySender::Admin);

        // Further replies stay in Replied
        query.reply("Anything else?").unwrap();
        assert_eq!(query.status, QueryStatus::Replied);
        assert_eq!(query.messages.len(), 3);
    }

    #[test]
    fn test_resolved_query_rejects_reply() {
        let mut query = open_query();
        query.resolve().unwrap();
        assert_eq!(query.reply("too late").unwrap_err().code(), "QUERY_RESOLVED");
        assert_eq!(query.messages.len(), 1);
    }

    #[test]
    fn test_resolve_twice_fails() {
        let mut query = open_query();
        query.resolve().unwrap();
        assert_eq!(query.resolve().unwrap_err().code(), "QUERY_ALREADY_RESOLVED");
    }

    #[test]
    fn test_open_query_can_resolve_directly() {
        let mut query = open_query();
        query.resolve().unwrap();
        assert_eq!(query.status, QueryStatus::Resolved);
    }
}
