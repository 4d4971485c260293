//! Admin Edit KYC Use Case
//!
//! Admin corrects identity fields on an existing record. The edit
//! unconditionally resets the record to Submitted for re-review.

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::kyc::entity::{DocumentType, KycDetails, KycStatus};
use crate::kyc::repository::KycRepository;
use crate::user::repository::UserRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::details;
use super::events::KycAdminEdited;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminEditKycCommand {
    pub user_id: String,
    pub full_name: String,
    pub date_of_birth: String,
    pub address: String,
    pub document_type: DocumentType,
    pub document_number: String,
    pub document_url: String,
}

impl AdminEditKycCommand {
    fn details(&self) -> KycDetails {
        KycDetails {
            full_name: self.full_name.clone(),
            date_of_birth: self.date_of_birth.clone(),
            address: self.address.clone(),
            document_type: self.document_type,
            document_number: self.document_number.clone(),
            document_url: self.document_url.clone(),
        }
    }
}

pub struct AdminEditKycUseCase<U: UnitOfWork> {
    kyc_repo: Arc<KycRepository>,
    user_repo: Arc<UserRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> AdminEditKycUseCase<U> {
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
        command: AdminEditKycCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<KycAdminEdited> {
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

        record.admin_edit(command.details());
        user.set_kyc_status(KycStatus::Submitted);

        let event = KycAdminEdited::new(&ctx, &record);

        self.unit_of_work
            .commit_all(vec![Box::new(record), Box::new(user)], event, &command)
            .await
    }
}
