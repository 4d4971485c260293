//! Role Repository

use mongodb::{Collection, Database, bson::doc};
use futures::TryStreamExt;
use tracing::info;
use crate::role::entity::AuthRole;
use crate::shared::error::Result;

pub struct RoleRepository {
    collection: Collection<AuthRole>,
}

impl RoleRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("roles"),
        }
    }

    pub async fn insert(&self, role: &AuthRole) -> Result<()> {
        self.collection.insert_one(role).await?;
        Ok(())
    }

    pub async fn find_by_id(&self, id: &str) -> Result<Option<AuthRole>> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Option<AuthRole>> {
        Ok(self.collection.find_one(doc! { "code": code }).await?)
    }

    pub async fn find_all(&self) -> Result<Vec<AuthRole>> {
        let cursor = self.collection.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn find_by_codes(&self, codes: &[String]) -> Result<Vec<AuthRole>> {
        let cursor = self.collection
            .find(doc! { "code": { "$in": codes } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn exists_by_code(&self, code: &str) -> Result<bool> {
        let count = self.collection
            .count_documents(doc! { "code": code })
            .await?;
        Ok(count > 0)
    }

    pub async fn update(&self, role: &AuthRole) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &role.id }, role)
            .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    /// Upsert the built-in code-defined roles at startup.
    ///
    /// Permissions of code-defined roles are replaced with the current
    /// definitions; database-defined roles are left untouched.
    pub async fn sync_builtin(&self, builtin: &[AuthRole]) -> Result<()> {
        for role in builtin {
            match self.find_by_code(&role.code).await? {
                Some(mut existing) => {
                    existing.permissions = role.permissions.clone();
                    existing.display_name = role.display_name.clone();
                    existing.description = role.description.clone();
                    existing.updated_at = chrono::Utc::now();
                    self.update(&existing).await?;
                }
                None => {
                    self.insert(role).await?;
                    info!(code = %role.code, "Created built-in role");
                }
            }
        }
        Ok(())
    }
}
