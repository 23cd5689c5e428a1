use std::sync::Arc;

use chrono::Utc;
use log::info;
use mongodb::bson::oid::ObjectId;

use crate::author::model::Role;
use crate::author::repository::AuthorRepository;
use crate::author::service::resolve_summaries;
use crate::blog::model::{
    Blog, BlogChanges, BlogView, CreateBlogRequest, MIN_IMAGES, UpdateBlogRequest,
};
use crate::blog::repository::BlogRepository;
use crate::cache::invalidation::Mutation;
use crate::cache::{CacheKey, CacheStatus, ReadCache};
use crate::category::repository::CategoryRepository;
use crate::middleware::auth::AuthUser;
use crate::utils::error::CustomError;
use crate::utils::helpers::{optional_text, parse_object_id, required_text};

pub struct BlogService {
    blogs: Arc<dyn BlogRepository>,
    authors: Arc<dyn AuthorRepository>,
    categories: Arc<dyn CategoryRepository>,
    cache: ReadCache,
}

impl BlogService {
    pub fn new(
        blogs: Arc<dyn BlogRepository>,
        authors: Arc<dyn AuthorRepository>,
        categories: Arc<dyn CategoryRepository>,
        cache: ReadCache,
    ) -> Self {
        Self {
            blogs,
            authors,
            categories,
            cache,
        }
    }

    pub async fn create(
        &self,
        user: &AuthUser,
        req: CreateBlogRequest,
    ) -> Result<BlogView, CustomError> {
        if user.role == Role::User {
            return Err(CustomError::ForbiddenError(
                "Only authors and admins can create blogs".to_string(),
            ));
        }

        let title = required_text(req.title.as_deref(), "title")?;
        let body = required_text(req.body.as_deref(), "body")?;
        let images = validate_images(req.images.unwrap_or_default())?;
        let category = self.resolve_category(req.category.as_deref()).await?;

        let now = Utc::now();
        let blog = self
            .blogs
            .insert(Blog {
                id: ObjectId::new(),
                title,
                body,
                author: user.id,
                category,
                state: req.state.unwrap_or_default(),
                images,
                like_count: 0,
                comment_count: 0,
                created_at: now,
                updated_at: now,
            })
            .await?;

        info!("blog {} created by {}", blog.id, user.id);
        self.cache.invalidate_for(Mutation::blog_created(blog.id)).await;

        self.view(blog).await
    }

    /// All blogs, newest first. Served from the read cache when possible.
    pub async fn list(&self) -> Result<(Vec<BlogView>, CacheStatus), CustomError> {
        self.cache
            .read_through(CacheKey::BlogList, move || async move {
                let blogs = self.blogs.find_all().await?;
                self.views(blogs).await
            })
            .await
    }

    pub async fn get(&self, id: &ObjectId) -> Result<(BlogView, CacheStatus), CustomError> {
        self.cache
            .read_through(CacheKey::Blog(*id), move || async move {
                let blog = self.find(id).await?;
                self.view(blog).await
            })
            .await
    }

    /// Blogs whose title or author name contains `query`. Not cached.
    pub async fn search(&self, query: Option<&str>) -> Result<Vec<BlogView>, CustomError> {
        let query = optional_text(query).ok_or_else(|| {
            CustomError::BadRequestError("Provide a search query".to_string())
        })?;

        let authors = self.authors.search_ids_by_name(&query).await?;
        let blogs = self.blogs.search(&query, &authors).await?;
        self.views(blogs).await
    }

    pub async fn update(
        &self,
        user: &AuthUser,
        id: &ObjectId,
        req: UpdateBlogRequest,
    ) -> Result<BlogView, CustomError> {
        let existing = self.find(id).await?;
        if !user.can_manage(&existing.author) {
            return Err(CustomError::ForbiddenError(
                "You can only update your own blogs".to_string(),
            ));
        }

        let changes = BlogChanges {
            title: changed_text(req.title.as_deref(), "title")?,
            body: changed_text(req.body.as_deref(), "body")?,
            state: req.state,
            images: req.images.map(validate_images).transpose()?,
            category: self.resolve_category(req.category.as_deref()).await?,
        };

        let blog = self
            .blogs
            .update(id, changes)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Blog not found".to_string()))?;

        self.cache.invalidate_for(Mutation::blog_updated(blog.id)).await;

        self.view(blog).await
    }

    pub async fn delete(&self, user: &AuthUser, id: &ObjectId) -> Result<BlogView, CustomError> {
        let existing = self.find(id).await?;
        if !user.can_manage(&existing.author) {
            return Err(CustomError::ForbiddenError(
                "You can only delete your own blogs".to_string(),
            ));
        }

        if !self.blogs.delete(id).await? {
            return Err(CustomError::NotFoundError("Blog not found".to_string()));
        }

        info!("blog {} deleted by {}", id, user.id);
        self.cache.invalidate_for(Mutation::blog_deleted(*id)).await;

        self.view(existing).await
    }

    async fn find(&self, id: &ObjectId) -> Result<Blog, CustomError> {
        self.blogs
            .find_by_id(id)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Blog not found".to_string()))
    }

    async fn resolve_category(&self, raw: Option<&str>) -> Result<Option<ObjectId>, CustomError> {
        let Some(raw) = optional_text(raw) else {
            return Ok(None);
        };

        let id = parse_object_id(&raw, "category")?;
        if self.categories.find_by_id(&id).await?.is_none() {
            return Err(CustomError::NotFoundError("Category not found".to_string()));
        }
        Ok(Some(id))
    }

    async fn view(&self, blog: Blog) -> Result<BlogView, CustomError> {
        let mut authors = resolve_summaries(self.authors.as_ref(), [blog.author]).await?;
        let author = authors.remove(&blog.author);
        Ok(BlogView::new(blog, author))
    }

    async fn views(&self, blogs: Vec<Blog>) -> Result<Vec<BlogView>, CustomError> {
        let authors =
            resolve_summaries(self.authors.as_ref(), blogs.iter().map(|b| b.author)).await?;

        Ok(blogs
            .into_iter()
            .map(|blog| {
                let author = authors.get(&blog.author).cloned();
                BlogView::new(blog, author)
            })
            .collect())
    }
}

fn validate_images(images: Vec<String>) -> Result<Vec<String>, CustomError> {
    let images: Vec<String> = images
        .iter()
        .filter_map(|url| optional_text(Some(url.as_str())))
        .collect();

    if images.len() < MIN_IMAGES {
        return Err(CustomError::ValidationError(format!(
            "At least {} images are required",
            MIN_IMAGES
        )));
    }
    Ok(images)
}

/// A field sent in an update must not be blank; an absent field is left alone.
fn changed_text(value: Option<&str>, field: &str) -> Result<Option<String>, CustomError> {
    value.map(|v| required_text(Some(v), field)).transpose()
}
