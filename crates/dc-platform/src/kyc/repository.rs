//! KYC Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::kyc::entity::{KycRecord, KycStatus};
use crate::shared::error::Result;

pub struct KycRepository {
    collection: Collection<KycRecord>,
}

impl KycRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("kyc"),
        }
    }

    /// Records are keyed by user ID
    pub async fn find_by_user(&self, user_id: &str) -> Result<Option<KycRecord>> {
        Ok(self.collection.find_one(doc! { "_id": user_id }).await?)
    }

    /// Admin listing, optionally filtered by status, newest submission first
    pub async fn find_by_status(&self, status: Option<KycStatus>) -> Result<Vec<KycRecord>> {
        let filter = match status {
            Some(status) => doc! { "status": status.as_str() },
            None => doc! {},
        };
        let options = FindOptions::builder()
            .sort(doc! { "submittedAt": -1 })
            .build();
        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// Full snapshot for the analytics folds
    pub async fn find_all(&self) -> Result<Vec<KycRecord>> {
        let cursor = self.collection.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }
}
