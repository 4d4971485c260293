//! Bank Detail Repository
//!
//! Holds the transactional default-account switch.

use mongodb::{Client, Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use tracing::error;
use crate::bank_detail::entity::BankDetail;
use crate::shared::error::{PlatformError, Result};

pub struct BankDetailRepository {
    client: Client,
    collection: Collection<BankDetail>,
}

impl BankDetailRepository {
    pub fn new(client: Client, db: &Database) -> Self {
        Self {
            client,
            collection: db.collection("bank_details"),
        }
    }

    pub async fn insert(&self, detail: &BankDetail) -> Result<()> {
        self.collection.insert_one(detail).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<BankDetail>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_all(&self) -> Result<Vec<BankDetail>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    /// The account currently shown to users at checkout
    pub async fn find_default(&self) -> Result<Option<BankDetail>> {
        Ok(self.collection.find_one(doc! { "isDefault": true }).await?)
    }

    pub async fn update(&self, detail: &BankDetail) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &detail.id }, detail)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    /// Make one account the default, clearing all others, in a single
    /// multi-document transaction. The invariant "at most one default"
    /// holds at every committed point.
    pub async fn set_default(&self, id: &str) -> Result<()> {
        let mut session = self.client.start_session().await?;
        session.start_transaction().await?;

        let clear_result = self.collection
            .update_many(
                doc! { "isDefault": true },
                doc! { "$set": { "isDefault": false } },
            )
            .session(&mut session)
            .await;

        if let Err(e) = clear_result {
            let _ = session.abort_transaction().await;
            error!(error = %e, "Failed to clear default bank details");
            return Err(e.into());
        }

        let set_result = self.collection
            .update_one(
                doc! { "_id": id },
                doc! { "$set": { "isDefault": true } },
            )
            .session(&mut session)
            .await;

        match set_result {
            Ok(result) if result.matched_count == 0 => {
                let _ = session.abort_transaction().await;
                return Err(PlatformError::not_found("BankDetail", id));
            }
            Ok(_) => {}
            Err(e) => {
                let _ = session.abort_transaction().await;
                error!(error = %e, "Failed to set default bank detail");
                return Err(e.into());
            }
        }

        session.commit_transaction().await?;
        Ok(())
    }
}
