//! Process-local content store. Backs the test suites and mirrors the
//! behaviour of the MongoDB repositories, unique indexes included.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::author::model::Author;
use crate::author::repository::AuthorRepository;
use crate::blog::model::{Blog, BlogChanges};
use crate::blog::repository::BlogRepository;
use crate::category::model::Category;
use crate::category::repository::CategoryRepository;
use crate::comment::model::Comment;
use crate::comment::repository::CommentRepository;
use crate::counter::Counter;
use crate::like::model::Like;
use crate::like::repository::LikeRepository;
use crate::utils::error::CustomError;

#[derive(Default)]
pub struct InMemoryStore {
    authors: RwLock<HashMap<ObjectId, Author>>,
    blogs: RwLock<HashMap<ObjectId, Blog>>,
    comments: RwLock<HashMap<ObjectId, Comment>>,
    likes: RwLock<HashMap<ObjectId, Like>>,
    categories: RwLock<HashMap<ObjectId, Category>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ignoring_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[async_trait]
impl AuthorRepository for InMemoryStore {
    async fn insert(&self, author: Author) -> Result<Author, CustomError> {
        let mut authors = self.authors.write().await;
        if authors.values().any(|a| a.email == author.email) {
            return Err(CustomError::ConflictError(
                "An author with this email already exists".to_string(),
            ));
        }
        authors.insert(author.id, author.clone());
        Ok(author)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Author>, CustomError> {
        Ok(self.authors.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, CustomError> {
        Ok(self
            .authors
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_by_ids(&self, ids: &[ObjectId]) -> Result<Vec<Author>, CustomError> {
        let authors = self.authors.read().await;
        Ok(ids.iter().filter_map(|id| authors.get(id).cloned()).collect())
    }

    async fn find_all(&self) -> Result<Vec<Author>, CustomError> {
        let mut authors: Vec<Author> = self.authors.read().await.values().cloned().collect();
        authors.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(authors)
    }

    async fn search_ids_by_name(&self, query: &str) -> Result<Vec<ObjectId>, CustomError> {
        Ok(self
            .authors
            .read()
            .await
            .values()
            .filter(|a| {
                contains_ignoring_case(&a.first_name, query)
                    || contains_ignoring_case(&a.surname, query)
            })
            .map(|a| a.id)
            .collect())
    }
}

fn newest_first(blogs: &mut [Blog]) {
    blogs.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
}

#[async_trait]
impl BlogRepository for InMemoryStore {
    async fn insert(&self, blog: Blog) -> Result<Blog, CustomError> {
        self.blogs.write().await.insert(blog.id, blog.clone());
        Ok(blog)
    }

    async fn find_all(&self) -> Result<Vec<Blog>, CustomError> {
        let mut blogs: Vec<Blog> = self.blogs.read().await.values().cloned().collect();
        newest_first(&mut blogs);
        Ok(blogs)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Blog>, CustomError> {
        Ok(self.blogs.read().await.get(id).cloned())
    }

    async fn search(&self, query: &str, authors: &[ObjectId]) -> Result<Vec<Blog>, CustomError> {
        let mut blogs: Vec<Blog> = self
            .blogs
            .read()
            .await
            .values()
            .filter(|b| contains_ignoring_case(&b.title, query) || authors.contains(&b.author))
            .cloned()
            .collect();
        newest_first(&mut blogs);
        Ok(blogs)
    }

    async fn update(
        &self,
        id: &ObjectId,
        changes: BlogChanges,
    ) -> Result<Option<Blog>, CustomError> {
        let mut blogs = self.blogs.write().await;
        Ok(blogs.get_mut(id).map(|blog| {
            changes.apply(blog, Utc::now());
            blog.clone()
        }))
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, CustomError> {
        Ok(self.blogs.write().await.remove(id).is_some())
    }

    async fn set_counter(
        &self,
        id: &ObjectId,
        counter: Counter,
        value: i64,
    ) -> Result<(), CustomError> {
        if let Some(blog) = self.blogs.write().await.get_mut(id) {
            match counter {
                Counter::Comments => blog.comment_count = value,
                Counter::Likes => blog.like_count = value,
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn insert(&self, comment: Comment) -> Result<Comment, CustomError> {
        self.comments.write().await.insert(comment.id, comment.clone());
        Ok(comment)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError> {
        Ok(self.comments.read().await.get(id).cloned())
    }

    async fn find_for_blog(&self, blog: &ObjectId) -> Result<Vec<Comment>, CustomError> {
        let mut comments: Vec<Comment> = self
            .comments
            .read()
            .await
            .values()
            .filter(|c| c.blog == *blog)
            .cloned()
            .collect();
        comments.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(comments)
    }

    async fn update_content(
        &self,
        id: &ObjectId,
        content: String,
    ) -> Result<Option<Comment>, CustomError> {
        let mut comments = self.comments.write().await;
        Ok(comments.get_mut(id).map(|comment| {
            comment.content = content;
            comment.updated_at = Utc::now();
            comment.clone()
        }))
    }

    async fn delete(&self, id: &ObjectId) -> Result<Option<Comment>, CustomError> {
        Ok(self.comments.write().await.remove(id))
    }

    async fn count_for_blog(&self, blog: &ObjectId) -> Result<u64, CustomError> {
        let count = self
            .comments
            .read()
            .await
            .values()
            .filter(|c| c.blog == *blog)
            .count();
        Ok(count as u64)
    }
}

#[async_trait]
impl LikeRepository for InMemoryStore {
    async fn insert(&self, like: Like) -> Result<Like, CustomError> {
        let mut likes = self.likes.write().await;
        if likes
            .values()
            .any(|l| l.blog == like.blog && l.author == like.author)
        {
            return Err(CustomError::ConflictError("Duplicate record".to_string()));
        }
        likes.insert(like.id, like.clone());
        Ok(like)
    }

    async fn find_one(
        &self,
        blog: &ObjectId,
        author: &ObjectId,
    ) -> Result<Option<Like>, CustomError> {
        Ok(self
            .likes
            .read()
            .await
            .values()
            .find(|l| l.blog == *blog && l.author == *author)
            .cloned())
    }

    async fn delete(&self, id: &ObjectId) -> Result<Option<Like>, CustomError> {
        Ok(self.likes.write().await.remove(id))
    }

    async fn find_for_blog(&self, blog: &ObjectId) -> Result<Vec<Like>, CustomError> {
        let mut likes: Vec<Like> = self
            .likes
            .read()
            .await
            .values()
            .filter(|l| l.blog == *blog)
            .cloned()
            .collect();
        likes.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(likes)
    }

    async fn count_for_blog(&self, blog: &ObjectId) -> Result<u64, CustomError> {
        let count = self
            .likes
            .read()
            .await
            .values()
            .filter(|l| l.blog == *blog)
            .count();
        Ok(count as u64)
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn insert(&self, category: Category) -> Result<Category, CustomError> {
        self.categories
            .write()
            .await
            .insert(category.id, category.clone());
        Ok(category)
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Category>, CustomError> {
        Ok(self.categories.read().await.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Category>, CustomError> {
        let mut categories: Vec<Category> =
            self.categories.read().await.values().cloned().collect();
        categories.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        Ok(categories)
    }
}

/// Blog store whose counter writes can be switched to fail.
#[cfg(test)]
pub(crate) struct FlakyCounterWrites {
    inner: std::sync::Arc<InMemoryStore>,
    fail: std::sync::atomic::AtomicBool,
}

#[cfg(test)]
impl FlakyCounterWrites {
    pub(crate) fn new(inner: std::sync::Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            fail: Default::default(),
        }
    }

    pub(crate) fn fail_counter_writes(&self, fail: bool) {
        self.fail.store(fail, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
#[async_trait]
impl BlogRepository for FlakyCounterWrites {
    async fn insert(&self, blog: Blog) -> Result<Blog, CustomError> {
        BlogRepository::insert(self.inner.as_ref(), blog).await
    }

    async fn find_all(&self) -> Result<Vec<Blog>, CustomError> {
        BlogRepository::find_all(self.inner.as_ref()).await
    }

    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<Blog>, CustomError> {
        BlogRepository::find_by_id(self.inner.as_ref(), id).await
    }

    async fn search(&self, query: &str, authors: &[ObjectId]) -> Result<Vec<Blog>, CustomError> {
        self.inner.search(query, authors).await
    }

    async fn update(
        &self,
        id: &ObjectId,
        changes: BlogChanges,
    ) -> Result<Option<Blog>, CustomError> {
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, CustomError> {
        BlogRepository::delete(self.inner.as_ref(), id).await
    }

    async fn set_counter(
        &self,
        id: &ObjectId,
        counter: Counter,
        value: i64,
    ) -> Result<(), CustomError> {
        if self.fail.load(std::sync::atomic::Ordering::SeqCst) {
            return Err(CustomError::InternalServerError(
                "Database error: counter write refused".to_string(),
            ));
        }
        self.inner.set_counter(id, counter, value).await
    }
}
