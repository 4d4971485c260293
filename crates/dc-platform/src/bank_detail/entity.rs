//! Bank Detail Entity
//!
//! Platform receiving accounts shown to users during checkout.
//! At most one account is the default; exclusivity is enforced by
//! `BankDetailRepository::set_default` in a single transaction.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BankDetail {
    /// TSID as Crockford Base32 string
    #[serde(rename = "_id")]
    pub id: String,

    pub account_name: String,

    pub account_number: String,

    /// IFSC code of the branch
    pub ifsc: String,

    pub bank_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,

    #[serde(default)]
    pub is_default: bool,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl BankDetail {
    pub fn new(
        account_name: impl Into<String>,
        account_number: impl Into<String>,
        ifsc: impl Into<String>,
        bank_name: impl Into<String>,
        upi_id: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: crate::TsidGenerator::generate(),
            account_name: account_name.into(),
            account_number: account_number.into(),
            ifsc: ifsc.into(),
            bank_name: bank_name.into(),
            upi_id,
            is_default: false,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bank_detail_is_not_default() {
        let detail = BankDetail::new("DepositCore Ltd", "1234567890", "HDFC0001234", "HDFC Bank", None);
        assert!(!detail.is_default);
        assert!(!detail.id.is_empty());
    }

    #[test]
    fn test_bson_field_names() {
        let detail = BankDetail::new("DepositCore Ltd", "1234567890", "HDFC0001234", "HDFC Bank", Some("depositcore@upi".to_string()));
        let doc = mongodb::bson::to_document(&detail).unwrap();
        assert!(doc.contains_key("accountNumber"));
        assert!(doc.contains_key("isDefault"));
        assert_eq!(doc.get_str("upiId").unwrap(), "depositcore@upi");
    }
}
