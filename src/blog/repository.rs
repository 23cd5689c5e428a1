use async_trait::async_trait;
use chrono::Utc;
use futures_util::TryStreamExt;
use mongodb::bson::{self, Document, doc, oid::ObjectId};
use mongodb::options::ReturnDocument;
use mongodb::{Collection, Database};

use crate::blog::model::{Blog, BlogChanges};
use crate::counter::Counter;
use crate::database::db::BLOGS;
use crate::utils::error::CustomError;

#[async_trait]
pub trait BlogRepository: Send + Sync {
    async fn insert(&self, blog: Blog) -> Result<Blog, CustomError>;

    /// Newest first.
    async fn find_all(&self) -> Result<Vec<Blog>, CustomError>;

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Blog>, CustomError>;

    /// Blogs whose title contains `query` (ignoring case) or written by one of
    /// `authors`, newest first.
    async fn search(&self, query: &str, authors: &[ObjectId]) -> Result<Vec<Blog>, CustomError>;

    /// Returns the blog after the update, `None` if it does not exist.
    async fn update(
        &self,
        id: &ObjectId,
        changes: BlogChanges,
    ) -> Result<Option<Blog>, CustomError>;

    async fn delete(&self, id: &ObjectId) -> Result<bool, CustomError>;

    /// Overwrite one derived counter field. Used by the counter synchronizer only.
    async fn set_counter(
        &self,
        id: &ObjectId,
        counter: Counter,
        value: i64,
    ) -> Result<(), CustomError>;
}

pub struct MongoBlogRepository {
    collection: Collection<Blog>,
}

impl MongoBlogRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection::<Blog>(BLOGS),
        }
    }
}

fn to_bson<T: serde::Serialize>(value: &T) -> Result<bson::Bson, CustomError> {
    bson::to_bson(value)
        .map_err(|e| CustomError::InternalServerError(format!("Failed to encode field: {}", e)))
}

fn update_document(changes: BlogChanges) -> Result<Document, CustomError> {
    let mut set = doc! {
        "updatedAt": bson::DateTime::from_millis(Utc::now().timestamp_millis())
    };

    if let Some(title) = changes.title {
        set.insert("title", title);
    }
    if let Some(body) = changes.body {
        set.insert("body", body);
    }
    if let Some(state) = changes.state {
        set.insert("state", to_bson(&state)?);
    }
    if let Some(images) = changes.images {
        set.insert("images", images);
    }
    if let Some(category) = changes.category {
        set.insert("category", category);
    }

    Ok(doc! { "$set": set })
}

#[async_trait]
impl BlogRepository for MongoBlogRepository {
    async fn insert(&self, blog: Blog) -> Result<Blog, CustomError> {
        self.collection.insert_one(&blog).await?;
        Ok(blog)
    }

    async fn find_all(&self) -> Result<Vec<Blog>, CustomError> {
        let cursor = self.collection.find(doc! {}).sort(doc! { "_id": -1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Blog>, CustomError> {
        Ok(self.collection.find_one(doc! { "_id": id }).await?)
    }

    async fn search(&self, query: &str, authors: &[ObjectId]) -> Result<Vec<Blog>, CustomError> {
        let pattern = regex::escape(query);
        let filter = doc! {
            "$or": [
                { "title": { "$regex": pattern.as_str(), "$options": "i" } },
                { "author": { "$in": authors.to_vec() } },
            ]
        };

        let cursor = self.collection.find(filter).sort(doc! { "_id": -1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn update(
        &self,
        id: &ObjectId,
        changes: BlogChanges,
    ) -> Result<Option<Blog>, CustomError> {
        let update = update_document(changes)?;

        Ok(self
            .collection
            .find_one_and_update(doc! { "_id": id }, update)
            .return_document(ReturnDocument::After)
            .await?)
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, CustomError> {
        let result = self.collection.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn set_counter(
        &self,
        id: &ObjectId,
        counter: Counter,
        value: i64,
    ) -> Result<(), CustomError> {
        let mut set = Document::new();
        set.insert(counter.field(), value);

        self.collection
            .update_one(doc! { "_id": id }, doc! { "$set": set })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blog::model::BlogState;

    #[test]
    fn update_document_sets_only_changed_fields() {
        let update = update_document(BlogChanges {
            title: Some("New title".to_string()),
            state: Some(BlogState::Published),
            ..Default::default()
        })
        .unwrap();

        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("title").unwrap(), "New title");
        assert_eq!(set.get_str("state").unwrap(), "published");
        assert!(set.get_datetime("updatedAt").is_ok());
        assert!(!set.contains_key("body"));
        assert!(!set.contains_key("likeCount"));
        assert!(!set.contains_key("commentCount"));
    }
}
