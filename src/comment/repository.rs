use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::comment::model::Comment;
use crate::database::db::COMMENTS;
use crate::utils::error::CustomError;

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: Comment) -> Result<Comment, CustomError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError>;

    /// Newest first.
    async fn find_for_blog(&self, blog: &ObjectId) -> Result<Vec<Comment>, CustomError>;

    async fn update_content(
        &self,
        id: &ObjectId,
        content: String,
    ) -> Result<Option<Comment>, CustomError>;

    /// Returns the removed comment, `None` if it was already gone.
    async fn delete(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError>;

    async fn count_for_blog(&self, blog: &ObjectId) -> Result<u64, CustomError>;
}

pub struct MongoCommentRepository {
    collection: Collection<Comment>,
}

impl MongoCommentRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Comment>(COMMENTS),
        }
    }
}

#[async_trait]
impl CommentRepository for MongoCommentRepository {
    async fn insert(&self, comment: Comment) -> Result<Comment, CustomError> {
        self.collection.insert_one(&comment).await?;
        Ok(comment)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_for_blog(&self, blog: &ObjectId) -> Result<Vec<Comment>, CustomError> {
        let cursor = self
            .collection
            .find(doc! { "blog": blog })
            .sort(doc! { "_id": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update_content(
        &self,
        id: &ObjectId,
        content: String,
    ) -> Result<Option<Comment>, CustomError> {
        let now = bson::DateTime::from_millis(Utc::now().timestamp_millis());

        Ok(self
            .collection
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": { "content": content, "updatedAt": now } },
            )
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError> {
        Ok(self.collection.find_one_and_delete(doc! { "_id": id }).await?)
    }

    async fn count_for_blog(&self, blog: &ObjectId) -> Result<u64, CustomError> {
        Ok(self.collection.count_documents(doc! { "blog": blog }).await?)
    }
}
