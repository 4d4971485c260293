//! Order Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::order::entity::{Order, OrderStatus};
use crate::shared::error::Result;

pub struct OrderRepository {
    collection: Collection<Order>,
}

impl OrderRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("orders"),
        }
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Order>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// A user's own orders, newest first
    pub async fn find_by_user(&self, user_id: &str) -> Result<Vec<Order>> {
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
    pub async fn find_page(
        &self,
        status: Option<OrderStatus>,
        skip: u64,
        limit: i64,
    ) -> Result<Vec<Order>> {
        let filter = match status {
            Some(status) => doc! { "status": status.as_str() },
            None => doc! {},
        };
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .skip(skip)
            .limit(limit)
            .build();
        let cursor = self.collection.find(filter).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn count(&self, status: Option<OrderStatus>) -> Result<u64> {
        let filter = match status {
            Some(status) => doc! { "status": status.as_str() },
            None => doc! {},
        };
        Ok(self.collection.count_documents(filter).await?)
    }

    /// Full snapshot for the analytics folds
    pub async fn find_all(&self) -> Result<Vec<Order>> {
        let cursor = self.collection.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_as_str_matches_serde() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::PaymentUploaded,
            OrderStatus::Active,
            OrderStatus::Cancelled,
        ] {
            let serialized = serde_json::to_string(&status).unwrap();
            assert_eq!(serialized.trim_matches('"'), status.as_str());
        }
    }
}
