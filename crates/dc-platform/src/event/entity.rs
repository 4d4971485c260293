//! Event Entity
//!
//! CloudEvents spec 1.0 compliant event storage.
//! Immutable once created.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

/// CloudEvents spec version
pub const CLOUDEVENTS_SPEC_VERSION: &str = "1.0";

/// Event entity - immutable event storage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    /// CloudEvents: Event type
    /// Format: {application}:{subdomain}:{aggregate}:{event}
    #[serde(rename = "type")]
    pub event_type: String,

    /// CloudEvents: Event source URI
    pub source: String,

    /// CloudEvents: Event subject (optional context)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    /// CloudEvents: Timestamp of event occurrence
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub time: DateTime<Utc>,

    /// CloudEvents: Event payload data
    pub data: serde_json::Value,

    /// CloudEvents: Content type of data
    #[serde(default = "default_content_type")]
    pub data_content_type: String,

    /// CloudEvents spec version
    #[serde(default = "default_spec_version")]
    pub spec_version: String,

    /// Message group for FIFO ordering
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_group: Option<String>,

    /// Correlation ID for request tracing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correlation_id: Option<String>,

    /// Causation ID - the event that caused this event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub causation_id: Option<String>,

    /// Deduplication ID for exactly-once delivery
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deduplication_id: Option<String>,

    /// Context data for filtering/searching
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context_data: Vec<ContextData>,

    /// When the event was stored
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

fn default_content_type() -> String {
    "application/json".to_string()
}

fn default_spec_version() -> String {
    CLOUDEVENTS_SPEC_VERSION.to_string()
}

/// Context data for event filtering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextData {
    pub key: String,
    pub value: String,
}

impl Event {
    /// Extract application code from event type
    /// Event type format: {application}:{subdomain}:{aggregate}:{event}
    pub fn application(&self) -> Option<&str> {
        self.event_type.split(':').next()
    }

    /// Extract subdomain from event type
    pub fn subdomain(&self) -> Option<&str> {
        self.event_type.split(':').nth(1)
    }

    /// Extract aggregate from event type
    pub fn aggregate(&self) -> Option<&str> {
        self.event_type.split(':').nth(2)
    }

    /// Extract event name from event type
    pub fn event_name(&self) -> Option<&str> {
        self.event_type.split(':').nth(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_parsing() {
        let event = Event {
            id: "0HZXEQ5Y8JY5Z".to_string(),
            event_type: "depositcore:invest:order:created".to_string(),
            source: "depositcore:invest".to_string(),
            subject: Some("invest.order.123".to_string()),
            time: Utc::now(),
            data: serde_json::json!({}),
            data_content_type: default_content_type(),
            spec_version: default_spec_version(),
            message_group: None,
            correlation_id: None,
            causation_id: None,
            deduplication_id: None,
            context_data: vec![],
            created_at: Utc::now(),
        };

        assert_eq!(event.application(), Some("depositcore"));
        assert_eq!(event.subdomain(), Some("invest"));
        assert_eq!(event.aggregate(), Some("order"));
        assert_eq!(event.event_name(), Some("created"));
    }
}
