//! User Entity
//!
//! Platform users provisioned from the external identity provider.
//! Admin access is derived from assigned role codes, not from identity.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use crate::kyc::entity::KycStatus;
use crate::usecase::unit_of_work::HasId;

/// Account status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    /// Normal account
    Active,
    /// Banned by an admin, rejected at the API boundary
    Banned,
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Active
    }
}

impl UserStatus {
    /// Wire name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Banned => "BANNED",
        }
    }
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Identity provider subject ID (or TSID for locally created users)
    #[serde(rename = "_id")]
    pub id: String,

    /// Email address (unique)
    pub email: String,

    /// Display name
    pub name: String,

    /// Phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    /// Account status
    #[serde(default)]
    pub status: UserStatus,

    /// Denormalized KYC status, kept in sync by the KYC review use case
    #[serde(default)]
    pub kyc_status: KycStatus,

    /// Assigned role codes (empty for customers)
    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            email: email.into(),
            name: name.into(),
            phone: None,
            status: UserStatus::Active,
            kyc_status: KycStatus::Pending,
            roles: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    /// Create with an externally assigned ID (identity provider subject)
    pub fn with_id(id: impl Into<String>, email: impl Into<String>, name: impl Into<String>) -> Self {
        let mut user = Self::new(email, name);
        user.id = id.into();
        user
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn ban(&mut self) {
        self.status = UserStatus::Banned;
        self.updated_at = Utc::now();
    }

    pub fn reactivate(&mut self) {
        self.status = UserStatus::Active;
        self.updated_at = Utc::now();
    }

    pub fn is_banned(&self) -> bool {
        self.status == UserStatus::Banned
    }

    pub fn set_kyc_status(&mut self, status: KycStatus) {
        self.kyc_status = status;
        self.updated_at = Utc::now();
    }
}

impl HasId for User {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "users"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_defaults() {
        let user = User::new("alice@example.com", "Alice");
        assert_eq!(user.status, UserStatus::Active);
        assert_eq!(user.kyc_status, KycStatus::Pending);
        assert!(user.roles.is_empty());
        assert!(!user.id.is_empty());
    }

    #[test]
    fn test_ban_and_reactivate() {
        let mut user = User::new("bob@example.com", "Bob");
        assert!(!user.is_banned());

        user.ban();
        assert!(user.is_banned());
        assert_eq!(user.status, UserStatus::Banned);

        user.reactivate();
        assert!(!user.is_banned());
    }

    #[test]
    fn test_bson_field_names() {
        let user = User::with_id("idp-sub-1", "carol@example.com", "Carol");
        let doc = mongodb::bson::to_document(&user).unwrap();
        assert_eq!(doc.get_str("_id").unwrap(), "idp-sub-1");
        assert_eq!(doc.get_str("kycStatus").unwrap(), "PENDING");
        assert_eq!(doc.get_str("status").unwrap(), "ACTIVE");
    }
}
