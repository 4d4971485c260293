//! Investment Plan Repository

use mongodb::{Collection, Database, bson::doc, options::FindOptions};
use futures::TryStreamExt;
use crate::plan::entity::InvestmentPlan;
use crate::shared::error::Result;

pub struct PlanRepository {
    collection: Collection<InvestmentPlan>,
}

impl PlanRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("investment_plans"),
        }
    }

    pub async fn insert(&self, plan: &InvestmentPlan) -> Result<()> {
        self.collection.insert_one(plan).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<InvestmentPlan>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Option<InvestmentPlan>> {
        Ok(self.collection.find_one(doc! { "name": name }).await?)
    }

    /// Active plans for the public listing, lowest entry amount first
    pub async fn find_active(&self) -> Result<Vec<InvestmentPlan>> {
        let options = FindOptions::builder()
            .sort(doc! { "minAmount": 1 })
            .build();
        let cursor = self.collection
            .find(doc! { "isActive": true })
            .with_options(options)
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_all(&self) -> Result<Vec<InvestmentPlan>> {
        let options = FindOptions::builder()
            .sort(doc! { "createdAt": -1 })
            .build();
        let cursor = self.collection.find(doc! {}).with_options(options).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn update(&self, plan: &InvestmentPlan) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &plan.id }, plan)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }
}
