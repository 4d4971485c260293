//! Notification Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use chrono::{DateTime, Utc};
use crate::notification::entity::Notification;
use crate::shared::error::Result;

pub struct NotificationRepository {
    collection: Collection<Notification>,
}

impl NotificationRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("notifications"),
        }
    }

    pub async fn insert(&self, notification: &Notification) -> Result<()> {
        self.collection.insert_one(notification).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Notification>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// List a user's notifications, newest first
    pub async fn find_by_user(&self, user_id: &str, limit: i64) -> Result<Vec<Notification>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .limit(limit)
            .build();
        let cursor = self.collection
            .find(doc! { "userId": user_id })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// Count unread notifications created after the given cutoff
    pub async fn count_unread_since(&self, user_id: &str, since: DateTime<Utc>) -> Result<u64> {
        let count = self.collection.count_documents(doc! {
            "userId": user_id,
            "read": false,
            "createdAt": { "$gte": bson::DateTime::from_chrono(since) }
        }).await?;
        Ok(count)
    }

    /// Flip the read flag on a single notification owned by the user.
    /// Returns false when no matching document exists.
    pub async fn mark_read(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = self.collection
            .update_one(
                doc! { "_id": id, "userId": user_id },
                doc! { "$set": { "read": true } },
            )
            .await?;
        Ok(result.matched_count > 0)
    }

    /// Mark all of a user's notifications read. Returns the modified count.
    pub async fn mark_all_read(&self, user_id: &str) -> Result<u64> {
        let result = self.collection
            .update_many(
                doc! { "userId": user_id, "read": false },
                doc! { "$set": { "read": true } },
            )
            .await?;
        Ok(result.modified_count)
    }
}
