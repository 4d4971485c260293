//! Submit KYC Use Case
//!
//! User submits (or resubmits) identity documents. The record and the
//! denormalized `kyc_status` on the user document commit atomically.

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::kyc::entity::{DocumentType, KycDetails, KycRecord, KycStatus};
use crate::kyc::repository::KycRepository;
use crate::user::repository::UserRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use super::events::KycSubmitted;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitKycCommand {
    pub full_name: String,
    pub date_of_birth: String,
    pub address: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub document_url: String,
}

impl SubmitKycCommand {
    fn into_details(self) -> KycDetails {
        KycDetails {
            full_name: self.full_name,
            date_of_birth: self.date_of_birth,
            address: self.address,
            document_type: self.document_type,
            document_number: self.document_number,
            document_url: self.document_url,
        }
    }
}

pub struct SubmitKycUseCase<U: UnitOfWork> {
    kyc_repo: Arc<KycRepository>,
    user_repo: Arc<UserRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> SubmitKycUseCase<U> {
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
        command: SubmitKycCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<KycSubmitted> {
        // Validation before any store access
        let required = [
            ("FULL_NAME_REQUIRED", command.full_name.trim()),
            ("DATE_OF_BIRTH_REQUIRED", command.date_of_birth.trim()),
            ("ADDRESS_REQUIRED", command.address.trim()),
            ("DOCUMENT_NUMBER_REQUIRED", command.document_number.trim()),
            ("DOCUMENT_URL_REQUIRED", command.document_url.trim()),
        ];
        for (code, value) in required {
            if value.is_empty() {
                return UseCaseResult::failure(UseCaseError::validation(
                    code,
                    "All KYC fields are required",
                ));
            }
        }

        let mut user = match self.user_repo.find_by_id(&ctx.principal_id).await {
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

        let existing = match self.kyc_repo.find_by_user(&ctx.principal_id).await {
            Ok(record) => record,
            Err(e) => {
                return UseCaseResult::failure(UseCaseError::commit(format!(
                    "Failed to load KYC record: {}", e
                )));
            }
        };

        let resubmission = existing.is_some();
        let record = match existing {
            Some(mut record) => {
                if let Err(e) = record.resubmit(command.clone().into_details()) {
                    return UseCaseResult::failure(e);
                }
                record
            }
            None => KycRecord::new(&ctx.principal_id, command.clone().into_details()),
        };

        user.set_kyc_status(KycStatus::Submitted);

        let event = KycSubmitted::new(&ctx, &record, resubmission);

        self.unit_of_work
            .commit_all(vec![Box::new(record), Box::new(user)], event, &command)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = SubmitKycCommand {
            full_name: "Alice Kumar".to_string(),
            date_of_birth: "1990-04-12".to_string(),
            address: "12 MG Road".to_string(),
            document_type: DocumentType::Aadhaar,
            document_number: "1234 5678 9012".to_string(),
            document_url: "https://blob/kyc/aadhaar.pdf".to_string(),
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("fullName"));
        assert!(json.contains("AADHAAR"));
    }
}
