use std::sync::Arc;

use chrono::Utc;
use log::{info, warn};
use mongodb::bson::oid::ObjectId;

use crate::author::repository::AuthorRepository;
use crate::author::service::resolve_summaries;
use crate::blog::model::BlogCounters;
use crate::blog::repository::BlogRepository;
use crate::cache::ReadCache;
use crate::cache::invalidation::Mutation;
use crate::comment::model::{
    Comment, CommentView, CommentWrite, CreateCommentRequest, UpdateCommentRequest,
};
use crate::comment::repository::CommentRepository;
use crate::counter::CounterSynchronizer;
use crate::middleware::auth::AuthUser;
use crate::utils::error::CustomError;
use crate::utils::helpers::{parse_object_id, required_text};

pub struct CommentService {
    comments: Arc<dyn CommentRepository>,
    blogs: Arc<dyn BlogRepository>,
    authors: Arc<dyn AuthorRepository>,
    counters: CounterSynchronizer,
    cache: ReadCache,
}

impl CommentService {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        blogs: Arc<dyn BlogRepository>,
        authors: Arc<dyn AuthorRepository>,
        counters: CounterSynchronizer,
        cache: ReadCache,
    ) -> Self {
        Self {
            comments,
            blogs,
            authors,
            counters,
            cache,
        }
    }

    pub async fn add(
        &self,
        user: &AuthUser,
        req: CreateCommentRequest,
    ) -> Result<CommentWrite, CustomError> {
        let blog_id = required_text(req.blog_id.as_deref(), "blogId")?;
        let blog = parse_object_id(&blog_id, "blog")?;
        let content = required_text(req.content.as_deref(), "content")?;

        if self.blogs.find_by_id(&blog).await?.is_none() {
            return Err(CustomError::NotFoundError("Blog not found".to_string()));
        }

        let now = Utc::now();
        let comment = self
            .comments
            .insert(Comment {
                id: ObjectId::new(),
                content,
                blog,
                author: user.id,
                created_at: now,
                updated_at: now,
            })
            .await?;

        self.counters.on_comment_created(&comment).await;
        self.cache.invalidate_for(Mutation::comment_created(blog)).await;

        self.write_result(comment).await
    }

    /// Comments on one blog, newest first.
    pub async fn list_for_blog(&self, blog: &ObjectId) -> Result<Vec<CommentView>, CustomError> {
        if self.blogs.find_by_id(blog).await?.is_none() {
            return Err(CustomError::NotFoundError("Blog not found".to_string()));
        }

        let comments = self.comments.find_for_blog(blog).await?;
        let authors =
            resolve_summaries(self.authors.as_ref(), comments.iter().map(|c| c.author)).await?;

        Ok(comments
            .into_iter()
            .map(|comment| {
                let author = authors.get(&comment.author).cloned();
                CommentView::new(comment, author)
            })
            .collect())
    }

    /// Only the commenter may edit; the blog's counters and cached views are unaffected.
    pub async fn update(
        &self,
        user: &AuthUser,
        id: &ObjectId,
        req: UpdateCommentRequest,
    ) -> Result<CommentView, CustomError> {
        let content = required_text(req.content.as_deref(), "content")?;
        let existing = self.find(id).await?;
        if existing.author != user.id {
            return Err(CustomError::ForbiddenError(
                "You can only edit your own comments".to_string(),
            ));
        }

        let comment = self
            .comments
            .update_content(id, content)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Comment not found".to_string()))?;

        self.view(comment).await
    }

    pub async fn delete(&self, user: &AuthUser, id: &ObjectId) -> Result<CommentWrite, CustomError> {
        let existing = self.find(id).await?;
        if !user.can_manage(&existing.author) {
            return Err(CustomError::ForbiddenError(
                "You can only delete your own comments".to_string(),
            ));
        }

        let comment = self
            .comments
            .delete(id)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Comment not found".to_string()))?;

        info!("comment {} on blog {} deleted by {}", comment.id, comment.blog, user.id);
        self.counters.on_comment_deleted(&comment).await;
        self.cache
            .invalidate_for(Mutation::comment_deleted(comment.blog))
            .await;

        self.write_result(comment).await
    }

    async fn find(&self, id: &ObjectId) -> Result<Comment, CustomError> {
        self.comments
            .find_by_id(id)
            .await?
            .ok_or_else(|| CustomError::NotFoundError("Comment not found".to_string()))
    }

    async fn view(&self, comment: Comment) -> Result<CommentView, CustomError> {
        let mut authors = resolve_summaries(self.authors.as_ref(), [comment.author]).await?;
        let author = authors.remove(&comment.author);
        Ok(CommentView::new(comment, author))
    }

    /// Runs after the comment write succeeded: lookup failures here only drop
    /// the author or the counters from the response.
    async fn write_result(&self, comment: Comment) -> Result<CommentWrite, CustomError> {
        let blog = self.counters_for(&comment.blog).await;
        let author = match resolve_summaries(self.authors.as_ref(), [comment.author]).await {
            Ok(mut authors) => authors.remove(&comment.author),
            Err(e) => {
                warn!("could not resolve author of comment {}: {}", comment.id, e);
                None
            }
        };

        Ok(CommentWrite {
            comment: CommentView::new(comment, author),
            blog,
        })
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
    use crate::author::model::{Author, Role};
    use crate::blog::model::{Blog, BlogState};
    use crate::cache::memory::InMemoryCacheStore;
    use crate::cache::{CacheKey, CacheStore, DEFAULT_TTL_SECONDS};
    use crate::database::memory::{FlakyCounterWrites, InMemoryStore};

    struct Fixture {
        store: Arc<InMemoryStore>,
        cache_store: Arc<InMemoryCacheStore>,
        service: CommentService,
        blog: ObjectId,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let cache_store = Arc::new(InMemoryCacheStore::new());
        let cache = ReadCache::new(cache_store.clone(), DEFAULT_TTL_SECONDS);
        let counters = CounterSynchronizer::new(store.clone(), store.clone(), store.clone());
        let service =
            CommentService::new(store.clone(), store.clone(), store.clone(), counters, cache);

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

        Fixture {
            store,
            cache_store,
            service,
            blog: blog.id,
        }
    }

    fn user(role: Role) -> AuthUser {
        AuthUser {
            id: ObjectId::new(),
            role,
        }
    }

    fn request(blog: &ObjectId, content: &str) -> CreateCommentRequest {
        CreateCommentRequest {
            blog_id: Some(blog.to_hex()),
            content: Some(content.to_string()),
        }
    }

    #[tokio::test]
    async fn add_and_delete_keep_the_comment_count() {
        let f = fixture().await;
        let reader = user(Role::User);

        let first = f.service.add(&reader, request(&f.blog, "one")).await.unwrap();
        assert_eq!(first.blog.unwrap().comment_count, 1);
        let second = f.service.add(&reader, request(&f.blog, "two")).await.unwrap();
        assert_eq!(second.blog.unwrap().comment_count, 2);

        let id = ObjectId::parse_str(&first.comment.id).unwrap();
        let deleted = f.service.delete(&reader, &id).await.unwrap();
        assert_eq!(deleted.blog.unwrap().comment_count, 1);
        assert_eq!(f.service.list_for_blog(&f.blog).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn add_invalidates_the_cached_blog() {
        let f = fixture().await;
        let key = CacheKey::Blog(f.blog).to_string();
        f.cache_store.set(&key, "{}", 60).await.unwrap();
        f.cache_store.set("blogs", "[]", 60).await.unwrap();

        f.service.add(&user(Role::User), request(&f.blog, "hi")).await.unwrap();

        assert_eq!(f.cache_store.get(&key).await.unwrap(), None);
        assert_eq!(f.cache_store.get("blogs").await.unwrap(), None);
    }

    #[tokio::test]
    async fn comment_on_missing_blog_is_not_found() {
        let f = fixture().await;
        let err = f
            .service
            .add(&user(Role::User), request(&ObjectId::new(), "hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, CustomError::NotFoundError(_)));
    }

    #[tokio::test]
    async fn counter_failure_does_not_fail_the_comment() {
        let f = fixture().await;
        let blogs = Arc::new(FlakyCounterWrites::new(f.store.clone()));
        blogs.fail_counter_writes(true);
        let cache = ReadCache::new(f.cache_store.clone(), DEFAULT_TTL_SECONDS);
        let counters = CounterSynchronizer::new(blogs.clone(), f.store.clone(), f.store.clone());
        let service = CommentService::new(f.store.clone(), blogs, f.store.clone(), counters, cache);

        let res = service.add(&user(Role::User), request(&f.blog, "hi")).await.unwrap();
        assert_eq!(res.blog.unwrap().comment_count, 0);
        assert_eq!(CommentRepository::count_for_blog(f.store.as_ref(), &f.blog).await.unwrap(), 1);
    }

    /// Every lookup fails, as when the authors collection is unreachable.
    struct UnreachableAuthors;

    #[async_trait::async_trait]
    impl AuthorRepository for UnreachableAuthors {
        async fn insert(&self, _author: Author) -> Result<Author, CustomError> {
            Err(unreachable_authors())
        }

        async fn find_by_id(&self, _id: &ObjectId) -> Result<Option<Author>, CustomError> {
            Err(unreachable_authors())
        }

        async fn find_by_email(&self, _email: &str) -> Result<Option<Author>, CustomError> {
            Err(unreachable_authors())
        }

        async fn find_by_ids(&self, _ids: &[ObjectId]) -> Result<Vec<Author>, CustomError> {
            Err(unreachable_authors())
        }

        async fn find_all(&self) -> Result<Vec<Author>, CustomError> {
            Err(unreachable_authors())
        }

        async fn search_ids_by_name(&self, _query: &str) -> Result<Vec<ObjectId>, CustomError> {
            Err(unreachable_authors())
        }
    }

    fn unreachable_authors() -> CustomError {
        CustomError::InternalServerError("Database error: authors unreachable".to_string())
    }

    #[tokio::test]
    async fn saved_comment_is_returned_when_its_author_cannot_be_read() {
        let f = fixture().await;
        let cache = ReadCache::new(f.cache_store.clone(), DEFAULT_TTL_SECONDS);
        let counters = CounterSynchronizer::new(f.store.clone(), f.store.clone(), f.store.clone());
        let service = CommentService::new(
            f.store.clone(),
            f.store.clone(),
            Arc::new(UnreachableAuthors),
            counters,
            cache,
        );

        let res = service.add(&user(Role::User), request(&f.blog, "hi")).await.unwrap();
        assert!(res.comment.author.is_none());
        assert_eq!(res.comment.content, "hi");
        assert_eq!(res.blog.unwrap().comment_count, 1);
        assert_eq!(CommentRepository::count_for_blog(f.store.as_ref(), &f.blog).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn only_the_commenter_edits_and_admins_may_delete() {
        let f = fixture().await;
        let owner = user(Role::User);
        let added = f.service.add(&owner, request(&f.blog, "first")).await.unwrap();
        let id = ObjectId::parse_str(&added.comment.id).unwrap();

        let edit = || UpdateCommentRequest {
            content: Some("edited".to_string()),
        };
        let err = f.service.update(&user(Role::Admin), &id, edit()).await.unwrap_err();
        assert!(matches!(err, CustomError::ForbiddenError(_)));

        let updated = f.service.update(&owner, &id, edit()).await.unwrap();
        assert_eq!(updated.content, "edited");

        let err = f.service.delete(&user(Role::Author), &id).await.unwrap_err();
        assert!(matches!(err, CustomError::ForbiddenError(_)));
        f.service.delete(&user(Role::Admin), &id).await.unwrap();
    }
}
