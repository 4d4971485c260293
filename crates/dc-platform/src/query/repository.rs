//! Support Query Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::query::entity::{QueryStatus, SupportQuery};
use crate::shared::error::Result;

pub struct QueryRepository {
    collection: Collection<SupportQuery>,
}

impl QueryRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("queries"),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<SupportQuery>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// A user's own queries, newest first
    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<SupportQuery>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self.collection
            .find(doc! { "userId": user_id })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Admin listing, optionally filtered by status, newest first
    pub async fn find_by_status(&self, status: Option<QueryStatus>) -> Result<Vec<SupportQuery>> {
        let filter = match status {
            Some(status) => doc! { "status": status.as_str() },
            None => doc! {},
        };
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }
}
