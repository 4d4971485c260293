//! Feedback Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::feedback::entity::Feedback;
use crate::shared::error::Result;

pub struct FeedbackRepository {
    collection: Collection<Feedback>,
}

impl FeedbackRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("feedback"),
        }
    }

    pub async fn insert(&self, feedback: &Feedback) -> Result<()> {
        self.collection.insert_one(feedback).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<Feedback>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    /// Published entries for the public list, newest first
    pub async fn find_published(&self) -> Result<Vec<Feedback>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self.collection
            .find(doc! { "published": true })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    /// All entries for the admin view, newest first
    pub async fn find_all(&self) -> Result<Vec<Feedback>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, feedback: &Feedback) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &feedback.id }, feedback)
            .await?;
        Ok(())
    }
}
