use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};
use mongodb::bson::oid::ObjectId;

use crate::author::repository::AuthorRepository;
use crate::author::service::resolve_summaries;
use crate::blog::model::{Blog, BlogCounters};
use crate::blog::repository::BlogRepository;
use crate::cache::ReadCache;
use crate::cache::invalidation::Mutation;
use crate::counter::{Counter, CounterSynchronizer};
use crate::like::model::{Like, LikeToggle, LikeView, ToggleLikeRequest};
use crate::like::repository::LikeRepository;
use crate::middleware::auth::AuthUser;
use crate::utils::error::CustomError;
use crate::utils::helpers::{parse_object_id, required_text};

pub struct LikeService {
    likes: Arc<dyn LikeRepository>,
    blogs: Arc<dyn BlogRepository>,
    authors: Arc<dyn AuthorRepository>,
    counters: CounterSynchronizer,
    cache: ReadCache,
}

impl LikeService {
    pub fn new(
        likes: Arc<dyn LikeRepository>,
        blogs: Arc<dyn BlogRepository>,
        authors: Arc<dyn AuthorRepository>,
        counters: CounterSynchronizer,
        cache: ReadCache,
    ) -> Self {
        Self {
            likes,
            blogs,
            authors,
            counters,
            cache,
        }
    }

    /// Like the blog, or unlike it when the caller already does.
    pub async fn toggle(
        &self,
        user: &AuthUser,
        req: ToggleLikeRequest,
    ) -> Result<LikeToggle, CustomError> {
        let blog_id = required_text(req.blog_id.as_deref(), "blogId")?;
        let blog = parse_object_id(&blog_id, "blog")?;
        self.find_blog(&blog).await?;

        let is_liked = match self.likes.find_one(&blog, &user.id).await? {
            Some(existing) => {
                if let Some(removed) = self.likes.delete(&existing.id).await? {
                    self.counters.on_like_deleted(&removed).await;
                }
                self.cache.invalidate_for(Mutation::like_deleted(blog)).await;
                false
            }
            None => {
                let like = Like {
                    id: ObjectId::new(),
                    blog,
                    author: user.id,
                    created_at: Utc::now(),
                };

                match self.likes.insert(like).await {
                    Ok(created) => {
                        self.counters.on_like_created(&created).await;
                    }
                    // A concurrent request stored the same like first.
                    Err(CustomError::ConflictError(_)) => {
                        debug!("like on blog {} by {} already stored", blog, user.id);
                        self.counters.sync(Counter::Likes, &blog).await;
                    }
                    Err(e) => return Err(e),
                }
                self.cache.invalidate_for(Mutation::like_created(blog)).await;
                true
            }
        };

        Ok(LikeToggle {
            is_liked,
            blog: self.counters_for(&blog).await,
        })
    }

    /// Likes on one blog, newest first.
    pub async fn list_for_blog(&self, blog: &ObjectId) -> Result<Vec<LikeView>, CustomError> {
        self.find_blog(blog).await?;

        let likes = self.likes.find_for_blog(blog).await?;
        let authors =
            resolve_summaries(self.authors.as_ref(), likes.iter().map(|l| l.author)).await?;

        Ok(likes
            .into_iter()
            .map(|like| {
                let author = authors.get(&like.author).cloned();
                LikeView::new(like, author)
            })
            .collect())
    }

    /// Whether the caller likes the blog, with its current counters.
    pub async fn status(&self, user: &AuthUser, blog: &ObjectId) -> Result<LikeToggle, CustomError> {
        let found = self.find_blog(blog).await?;
        let is_liked = self.likes.find_one(blog, &user.id).await?.is_some();

        Ok(LikeToggle {
            is_liked,
            blog: Some(BlogCounters::from(&found)),
        })
    }

    async fn find_blog(&self, blog: &ObjectId) -> Result<Blog, CustomError> {
        self.blogs
            .find_by_id(blog)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Blog not found".to_string()))
    }

    async fn counters_for(&self, blog: &ObjectId) -> Option<BlogCounters> {
        match self.blogs.find_by_id(blog).await {
            Ok(found) => found.as_ref().map(BlogCounters::from),
            Err(e) => {
                warn!("could not read counters for blog {}: {}", blog, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::author::model::Role;
    use crate::blog::model::BlogState;
    use crate::cache::DEFAULT_TTL_SECONDS;
    use crate::cache::memory::InMemoryCacheStore;
    use crate::database::memory::InMemoryStore;

    async fn fixture() -> (Arc<InMemoryStore>, LikeService, ObjectId) {
        let store = Arc::new(InMemoryStore::new());
        let cache = ReadCache::new(Arc::new(InMemoryCacheStore::new()), DEFAULT_TTL_SECONDS);
        let counters = CounterSynchronizer::new(store.clone(), store.clone(), store.clone());
        let service = LikeService::new(store.clone(), store.clone(), store.clone(), counters, cache);

        let now = Utc::now();
        let blog = BlogRepository::insert(
            store.as_ref(),
            Blog {
                id: ObjectId::new(),
                title: "t".to_string(),
                body: "b".to_string(),
                author: ObjectId::new(),
                category: None,
                state: BlogState::Published,
                images: vec!["1".to_string(), "2".to_string()],
                like_count: 0,
                comment_count: 0,
                created_at: now,
                updated_at: now,
            },
        )
        .await
        .unwrap();

        (store, service, blog.id)
    }

    fn user() -> AuthUser {
        AuthUser {
            id: ObjectId::new(),
            role: Role::User,
        }
    }

    fn request(blog: &ObjectId) -> ToggleLikeRequest {
        ToggleLikeRequest {
            blog_id: Some(blog.to_hex()),
        }
    }

    #[tokio::test]
    async fn toggling_twice_likes_then_unlikes() {
        let (_, service, blog) = fixture().await;
        let reader = user();

        let liked = service.toggle(&reader, request(&blog)).await.unwrap();
        assert!(liked.is_liked);
        assert_eq!(liked.blog.unwrap().like_count, 1);

        let unliked = service.toggle(&reader, request(&blog)).await.unwrap();
        assert!(!unliked.is_liked);
        assert_eq!(unliked.blog.unwrap().like_count, 0);
    }

    #[tokio::test]
    async fn like_count_tracks_distinct_authors() {
        let (store, service, blog) = fixture().await;
        let (a, b) = (user(), user());

        service.toggle(&a, request(&blog)).await.unwrap();
        let res = service.toggle(&b, request(&blog)).await.unwrap();
        assert_eq!(res.blog.unwrap().like_count, 2);

        let status = service.status(&a, &blog).await.unwrap();
        assert!(status.is_liked);
        assert_eq!(service.list_for_blog(&blog).await.unwrap().len(), 2);
        assert_eq!(LikeRepository::count_for_blog(store.as_ref(), &blog).await.unwrap(), 2);
    }

    /// Never sees an existing like, so every toggle races straight to insert.
    struct StaleLookup {
        inner: Arc<InMemoryStore>,
    }

    #[async_trait::async_trait]
    impl LikeRepository for StaleLookup {
        async fn insert(&self, like: Like) -> Result<Like, CustomError> {
            LikeRepository::insert(self.inner.as_ref(), like).await
        }

        async fn find_one(
            &self,
            _blog: &ObjectId,
            _author: &ObjectId,
        ) -> Result<Option<Like>, CustomError> {
            Ok(None)
        }

        async fn delete(&self, id: &ObjectId) -> Result<Option<Like>, CustomError> {
            LikeRepository::delete(self.inner.as_ref(), id).await
        }

        async fn find_for_blog(&self, blog: &ObjectId) -> Result<Vec<Like>, CustomError> {
            LikeRepository::find_for_blog(self.inner.as_ref(), blog).await
        }

        async fn count_for_blog(&self, blog: &ObjectId) -> Result<u64, CustomError> {
            LikeRepository::count_for_blog(self.inner.as_ref(), blog).await
        }
    }

    #[tokio::test]
    async fn racing_duplicate_like_is_reported_as_liked_once() {
        let (store, _, blog) = fixture().await;
        let likes = Arc::new(StaleLookup {
            inner: store.clone(),
        });
        let cache = ReadCache::new(Arc::new(InMemoryCacheStore::new()), DEFAULT_TTL_SECONDS);
        let counters = CounterSynchronizer::new(store.clone(), store.clone(), likes.clone());
        let service = LikeService::new(likes, store.clone(), store.clone(), counters, cache);
        let reader = user();

        let first = service.toggle(&reader, request(&blog)).await.unwrap();
        assert!(first.is_liked);
        assert_eq!(first.blog.unwrap().like_count, 1);

        let second = service.toggle(&reader, request(&blog)).await.unwrap();
        assert!(second.is_liked);
        assert_eq!(second.blog.unwrap().like_count, 1);

        assert_eq!(LikeRepository::count_for_blog(store.as_ref(), &blog).await.unwrap(), 1);
        let stored = BlogRepository::find_by_id(store.as_ref(), &blog)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.like_count, 1);
    }

    #[tokio::test]
    async fn liking_a_missing_blog_is_not_found() {
        let (_, service, _) = fixture().await;
        let err = service.toggle(&user(), request(&ObjectId::new())).await.unwrap_err();
        assert!(matches!(err, CustomError::NotFoundError(_)));
    }
}
