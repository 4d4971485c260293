//! KYC Domain Events

use serde::{Deserialize, Serialize};
use crate::usecase::ExecutionContext;
use crate::usecase::domain_event::EventMetadata;
use crate::impl_domain_event;
use crate::kyc::entity::KycRecord;

const SPEC_VERSION: &str = "1.0";
const SOURCE: &str = "depositcore:invest";

fn kyc_metadata(ctx: &ExecutionContext, user_id: &str, event_type: &str) -> EventMetadata {
    EventMetadata::builder()
        .from(ctx)
        .event_type(event_type)
        .spec_version(SPEC_VERSION)
        .source(SOURCE)
        .subject(format!("invest.kyc.{}", user_id))
        .message_group(format!("invest:kyc:{}", user_id))
        .build()
}

/// Event emitted when a user submits or resubmits KYC documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycSubmitted {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub user_id: String,
    pub document_type: String,
    pub resubmission: bool,
}

impl_domain_event!(KycSubmitted);

impl KycSubmitted {
    const EVENT_TYPE: &'static str = "depositcore:invest:kyc:submitted";

    pub fn new(ctx: &ExecutionContext, record: &KycRecord, resubmission: bool) -> Self {
        Self {
            metadata: kyc_metadata(ctx, &record.user_id, Self::EVENT_TYPE),
            user_id: record.user_id.clone(),
            document_type: record.document_type.as_str().to_string(),
            resubmission,
        }
    }
}

/// Admin decision on a submitted KYC record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycDecision {
    Approve,
    Reject,
}

/// Event emitted when an admin approves or rejects a KYC record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycReviewed {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub user_id: String,
    pub decision: KycDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl_domain_event!(KycReviewed);

impl KycReviewed {
    const APPROVED_TYPE: &'static str = "depositcore:invest:kyc:approved";
    const REJECTED_TYPE: &'static str = "depositcore:invest:kyc:rejected";

    pub fn new(ctx: &ExecutionContext, record: &KycRecord, decision: KycDecision) -> Self {
        let event_type = match decision {
            KycDecision::Approve => Self::APPROVED_TYPE,
            KycDecision::Reject => Self::REJECTED_TYPE,
        };
        Self {
            metadata: kyc_metadata(ctx, &record.user_id, event_type),
            user_id: record.user_id.clone(),
            decision,
            rejection_reason: record.rejection_reason.clone(),
        }
    }
}

/// Event emitted when an admin edits KYC fields, forcing re-review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycAdminEdited {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub user_id: String,
    pub edited_by: String,
}

impl_domain_event!(KycAdminEdited);

impl KycAdminEdited {
    const EVENT_TYPE: &'static str = "depositcore:invest:kyc:admin-edited";

    pub fn new(ctx: &ExecutionContext, record: &KycRecord) -> Self {
        Self {
            metadata: kyc_metadata(ctx, &record.user_id, Self::EVENT_TYPE),
            user_id: record.user_id.clone(),
            edited_by: ctx.principal_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kyc::entity::{DocumentType, KycDetails};
    use crate::usecase::DomainEvent;

    fn test_record() -> KycRecord {
        KycRecord::new("user-1", KycDetails {
            full_name: "Alice Kumar".to_string(),
            date_of_birth: "1990-04-12".to_string(),
            address: "12 MG Road".to_string(),
            document_type: DocumentType::Pan,
            document_number: "ABCDE1234F".to_string(),
            document_url: "https://blob/kyc/pan.pdf".to_string(),
        })
    }

    #[test]
    fn test_submitted_event() {
        let ctx = ExecutionContext::create("user-1");
        let event = KycSubmitted::new(&ctx, &test_record(), false);
        assert_eq!(event.event_type(), "depositcore:invest:kyc:submitted");
        assert_eq!(event.subject(), "invest.kyc.user-1");
        assert_eq!(event.document_type, "PAN");
    }

    #[test]
    fn test_reviewed_event_type_follows_decision() {
        let ctx = ExecutionContext::create("admin-1");
        let mut record = test_record();

        let mut approved = record.clone();
        approved.approve("admin-1").unwrap();
        let event = KycReviewed::new(&ctx, &approved, KycDecision::Approve);
        assert_eq!(event.event_type(), "depositcore:invest:kyc:approved");
        assert!(event.rejection_reason.is_none());

        record.reject("admin-1", "Document illegible").unwrap();
        let event = KycReviewed::new(&ctx, &record, KycDecision::Reject);
        assert_eq!(event.event_type(), "depositcore:invest:kyc:rejected");
        assert_eq!(event.rejection_reason.as_deref(), Some("Document illegible"));
    }
}
