//! KYC Entity
//!
//! One record per user, keyed by the user's ID. Status transitions:
//!
//! ```text
//! Pending --submit--> Submitted --approve--> Approved
//!    ^                    |
//!    |                    +--reject--> Rejected --resubmit--> Submitted
//! ```
//!
//! `Approved` is terminal for the user path; an admin edit forces the
//! record back to `Submitted` for re-review.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::{
    chrono_datetime_as_bson_datetime,
    chrono_datetime_as_bson_datetime_optional,
};
use crate::usecase::UseCaseError;
use crate::usecase::unit_of_work::HasId;
use crate::details;

/// KYC review status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KycStatus {
    /// No documents submitted yet
    Pending,
    /// Awaiting admin review
    Submitted,
    Approved,
    Rejected,
}

impl Default for KycStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl KycStatus {
    /// Wire name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Submitted => "SUBMITTED",
            Self::Approved => "APPROVED",
            Self::Rejected => "REJECTED",
        }
    }
}

/// Accepted identity document types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    Aadhaar,
    Pan,
    Passport,
    DrivingLicense,
    VoterId,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aadhaar => "AADHAAR",
            Self::Pan => "PAN",
            Self::Passport => "PASSPORT",
            Self::DrivingLicense => "DRIVING_LICENSE",
            Self::VoterId => "VOTER_ID",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "AADHAAR" => Some(Self::Aadhaar),
            "PAN" => Some(Self::Pan),
            "PASSPORT" => Some(Self::Passport),
            "DRIVING_LICENSE" => Some(Self::DrivingLicense),
            "VOTER_ID" => Some(Self::VoterId),
            _ => None,
        }
    }
}

/// Identity fields supplied at submission or edited by an admin
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycDetails {
    pub full_name: String,
    pub date_of_birth: String,
    pub address: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub document_url: String,
}

/// KYC record, keyed by user ID
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KycRecord {
    /// Equal to the user's ID; one record per user
    #[serde(rename = "_id")]
    pub id: String,

    pub user_id: String,

    pub status: KycStatus,

    pub full_name: String,
    pub date_of_birth: String,
    pub address: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub document_url: String,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub submitted_at: DateTime<Utc>,

    #[serde(skip_serializing_if = "Option::is_none", default, with = "chrono_datetime_as_bson_datetime_optional")]
    pub reviewed_at: Option<DateTime<Utc>>,

    /// Reviewing admin's principal ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,

    /// Set only while Rejected; cleared on resubmission
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl KycRecord {
    /// First submission for a user
    pub fn new(user_id: impl Into<String>, details: KycDetails) -> Self {
        let user_id = user_id.into();
        let now = Utc::now();
        Self {
            id: user_id.clone(),
            user_id,
            status: KycStatus::Submitted,
            full_name: details.full_name,
            date_of_birth: details.date_of_birth,
            address: details.address,
            document_type: details.document_type,
            document_number: details.document_number,
            document_url: details.document_url,
            submitted_at: now,
            reviewed_at: None,
            reviewed_by: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Resubmission: allowed from any status except Approved.
    /// Replaces the identity fields and clears the rejection reason.
    pub fn resubmit(&mut self, details: KycDetails) -> Result<(), UseCaseError> {
        if self.status == KycStatus::Approved {
            return Err(self.invalid_state(
                "KYC_ALREADY_APPROVED",
                "An approved KYC record cannot be resubmitted",
            ));
        }

        self.full_name = details.full_name;
        self.date_of_birth = details.date_of_birth;
        self.address = details.address;
        self.document_type = details.document_type;
        self.document_number = details.document_number;
        self.document_url = details.document_url;
        self.status = KycStatus::Submitted;
        self.rejection_reason = None;
        self.reviewed_at = None;
        self.reviewed_by = None;
        self.submitted_at = Utc::now();
        self.updated_at = self.submitted_at;
        Ok(())
    }

    /// Admin approval: Submitted -> Approved
    pub fn approve(&mut self, reviewed_by: impl Into<String>) -> Result<(), UseCaseError> {
        if self.status != KycStatus::Submitted {
            return Err(self.invalid_state(
                "KYC_NOT_SUBMITTED",
                "Only a submitted KYC record can be approved",
            ));
        }

        self.status = KycStatus::Approved;
        self.rejection_reason = None;
        self.reviewed_at = Some(Utc::now());
        self.reviewed_by = Some(reviewed_by.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Admin rejection: Submitted -> Rejected. The reason must be
    /// non-empty; callers validate before any store access.
    pub fn reject(
        &mut self,
        reviewed_by: impl Into<String>,
        reason: impl Into<String>,
    ) -> Result<(), UseCaseError> {
        if self.status != KycStatus::Submitted {
            return Err(self.invalid_state(
                "KYC_NOT_SUBMITTED",
                "Only a submitted KYC record can be rejected",
            ));
        }

        self.status = KycStatus::Rejected;
        self.rejection_reason = Some(reason.into());
        self.reviewed_at = Some(Utc::now());
        self.reviewed_by = Some(reviewed_by.into());
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Admin field edit. Unconditionally resets the record to Submitted
    /// so the corrected data goes through review again.
    pub fn admin_edit(&mut self, details: KycDetails) {
        self.full_name = details.full_name;
        self.date_of_birth = details.date_of_birth;
        self.address = details.address;
        self.document_type = details.document_type;
        self.document_number = details.document_number;
        self.document_url = details.document_url;
        self.status = KycStatus::Submitted;
        self.rejection_reason = None;
        self.reviewed_at = None;
        self.reviewed_by = None;
        self.updated_at = Utc::now();
    }

    fn invalid_state(&self, code: &str, message: &str) -> UseCaseError {
        UseCaseError::business_rule_with_details(
            code,
            message,
            details! {
                "userId" => &self.user_id,
                "status" => self.status.as_str()
            },
        )
    }
}

impl HasId for KycRecord {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "kyc"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details() -> KycDetails {
        KycDetails {
            full_name: "Alice Kumar".to_string(),
            date_of_birth: "1990-04-12".to_string(),
            address: "12 MG Road, Bengaluru".to_string(),
            document_type: DocumentType::Pan,
            document_number: "ABCDE1234F".to_string(),
            document_url: "https://blob/kyc/pan.pdf".to_string(),
        }
    }

    fn submitted_record() -> KycRecord {
        KycRecord::new("user-1", details())
    }

    #[test]
    fn test_new_record_is_submitted_and_keyed_by_user() {
        let record = submitted_record();
        assert_eq!(record.status, KycStatus::Submitted);
        assert_eq!(record.id, "user-1");
        assert_eq!(record.user_id, "user-1");
    }

    #[test]
    fn test_approve_sets_reviewer() {
        let mut record = submitted_record();
        record.approve("admin-1").unwrap();
        assert_eq!(record.status, KycStatus::Approved);
        assert_eq!(record.reviewed_by.as_deref(), Some("admin-1"));
        assert!(record.reviewed_at.is_some());
    }

    #[test]
    fn test_reject_records_reason() {
        let mut record = submitted_record();
        record.reject("admin-1", "Document illegible").unwrap();
        assert_eq!(record.status, KycStatus::Rejected);
        assert_eq!(record.rejection_reason.as_deref(), Some("Document illegible"));
    }

    #[test]
    fn test_review_requires_submitted() {
        let mut record = submitted_record();
        record.approve("admin-1").unwrap();

        assert_eq!(record.approve("admin-2").unwrap_err().code(), "KYC_NOT_SUBMITTED");
        assert_eq!(record.reject("admin-2", "r").unwrap_err().code(), "KYC_NOT_SUBMITTED");
    }

    #[test]
    fn test_resubmit_after_rejection_clears_reason() {
        let mut record = submitted_record();
        record.reject("admin-1", "Document illegible").unwrap();

        let mut new_details = details();
        new_details.document_url = "https://blob/kyc/pan-v2.pdf".to_string();
        record.resubmit(new_details).unwrap();

        assert_eq!(record.status, KycStatus::Submitted);
        assert!(record.rejection_reason.is_none());
        assert!(record.reviewed_at.is_none());
        assert_eq!(record.document_url, "https://blob/kyc/pan-v2.pdf");
    }

    #[test]
    fn test_resubmit_approved_fails() {
        let mut record = submitted_record();
        record.approve("admin-1").unwrap();
        let err = record.resubmit(details()).unwrap_err();
        assert_eq!(err.code(), "KYC_ALREADY_APPROVED");
        assert_eq!(record.status, KycStatus::Approved);
    }

    #[test]
    fn test_admin_edit_forces_re_review() {
        let mut record = submitted_record();
        record.approve("admin-1").unwrap();

        record.admin_edit(details());
        assert_eq!(record.status, KycStatus::Submitted);
        assert!(record.reviewed_by.is_none());
    }

    #[test]
    fn test_document_type_parse_round_trip() {
        for doc_type in [
            DocumentType::Aadhaar,
            DocumentType::Pan,
            DocumentType::Passport,
            DocumentType::DrivingLicense,
            DocumentType::VoterId,
        ] {
            assert_eq!(DocumentType::parse(doc_type.as_str()), Some(doc_type));
        }
        assert_eq!(DocumentType::parse("RATION_CARD"), None);
    }

    #[test]
    fn test_bson_field_names() {
        let record = submitted_record();
        let doc = bson::to_document(&record).unwrap();
        assert!(doc.contains_key("_id"));
        assert!(doc.contains_key("fullName"));
        assert!(doc.contains_key("documentType"));
        assert_eq!(doc.get_str("status").unwrap(), "SUBMITTED");
    }
}
