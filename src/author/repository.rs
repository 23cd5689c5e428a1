use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId};
use mongodb::{Collection, Database};

use crate::author::model::Author;
use crate::database::db::AUTHORS;
use crate::utils::error::CustomError;

#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Fails with `ConflictError` when the email is taken.
    async fn insert(&self, author: Author) -> Result<Author, CustomError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Author>, CustomError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, CustomError>;

    async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Author>, CustomError>;

    /// Newest first.
    async fn find_all(&self) -> Result<Vec<Author>, CustomError>;

    /// Ids of authors whose first name or surname contains `query`, ignoring case.
    async fn search_ids_by_name(&self, query: &str) -> Result<Vec<ObjectId>, CustomError>;
}

pub struct MongoAuthorRepository {
    collection: Collection<Author>,
}

impl MongoAuthorRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Author>(AUTHORS),
        }
    }
}

#[async_trait]
impl AuthorRepository for MongoAuthorRepository {
    async fn insert(&self, author: Author) -> Result<Author, CustomError> {
        self.collection.insert_one(&author).await.map_err(|e| match CustomError::from(e) {
            CustomError::ConflictError(_) => {
                CustomError::ConflictError("An author with this email already exists".to_string())
            }
            other => other,
        })?;
        Ok(author)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Author>, CustomError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, CustomError> {
        Ok(self.collection.find_one(doc! { "email": email }).await?)
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Author>, CustomError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let cursor = self
            .collection
            .find(doc! { "_id": { "$in": ids.to_vec() } })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_all(&self) -> Result<Vec<Author>, CustomError> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "_id": -1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn search_ids_by_name(&self, query: &str) -> Result<Vec<ObjectId>, CustomError> {
        let pattern = regex::escape(query);
        let filter = doc! {
            "$or": [
                { "first_name": { "$regex": pattern.as_str(), "$options": "i" } },
                { "surname": { "$regex": pattern.as_str(), "$options": "i" } },
            ]
        };

        let authors: Vec<Author> = self.collection.find(filter).await?.try_collect().await?;
        Ok(authors.into_iter().map(|a| a.id).collect())
    }
}
