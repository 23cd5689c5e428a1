use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

use crate::database::db::LIKES;
use crate::like::model::Like;
use crate::utils::error::CustomError;

#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Fails with `ConflictError` when `like.author` already likes `like.blog`.
    async fn insert(&self, like: Like) -> Result<Like, CustomError>;

    async fn find_one(
        &self,
        blog: &ObjectId,
        author: &ObjectId,
    ) -> Result<Option<Like>, CustomError>;

    /// Returns the removed like, `None` if it was already gone.
    async fn delete(&self, id: &ObjectId) -> Result<Option<Like>, CustomError>;

    /// Newest first.
    async fn find_for_blog(&self, blog: &ObjectId) -> Result<Vec<Like>, CustomError>;

    async fn count_for_blog(&self, blog: &ObjectId) -> Result<u64, CustomError>;
}

pub struct MongoLikeRepository {
    collection: Collection<Like>,
}

impl MongoLikeRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Like>(LIKES),
        }
    }
}

#[async_trait]
impl LikeRepository for MongoLikeRepository {
    async fn insert(&self, like: Like) -> Result<Like, CustomError> {
        self.collection.insert_one(&like).await?;
        Ok(like)
    }

    async fn find_one(
        &self,
        blog: &ObjectId,
        author: &ObjectId,
    ) -> Result<Option<Like>, CustomError> {
        Ok(self
            .collection
            .find_one(doc! { "blog": blog, "author": author })
            .await?)
    }

    async fn delete(&self, id: &ObjectId) -> Result<Option<Like>, CustomError> {
        Ok(self.collection.find_one_and_delete(doc! { "_id": id }).await?)
    }

    async fn find_for_blog(&self, blog: &ObjectId) -> Result<Vec<Like>, CustomError> {
        let cursor = self
            .collection
            .find(doc! { "blog": blog })
            .sort(doc! { "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn count_for_blog(&self, blog: &ObjectId) -> Result<u64, CustomError> {
        Ok(self.collection.count_documents(doc! { "blog": blog }).await?)
    }
}
