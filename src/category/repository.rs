use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

use crate::category::model::Category;
use crate::database::db::CATEGORIES;
use crate::utils::error::CustomError;

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn insert(&self, category: Category) -> Result<Category, CustomError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Category>, CustomError>;

    /// Newest first.
    async fn find_all(&self) -> Result<Vec<Category>, CustomError>;
}

pub struct MongoCategoryRepository {
    collection: Collection<Category>,
}

impl MongoCategoryRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Category>(CATEGORIES),
        }
    }
}

#[async_trait]
impl CategoryRepository for MongoCategoryRepository {
    async fn insert(&self, category: Category) -> Result<Category, CustomError> {
        self.collection.insert_one(&category).await?;
        Ok(category)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Category>, CustomError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_all(&self) -> Result<Vec<Category>, CustomError> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "_id": -1 }).await?;
        Ok(cursor.try_collect().await?)
    }
}
