use std::sync::Arc;

use actix_web::web;
use mongodb::Database;

use crate::author::repository::{AuthorRepository, MongoAuthorRepository};
use crate::author::service::AuthorService;
use crate::blog::repository::{BlogRepository, MongoBlogRepository};
use crate::blog::service::BlogService;
use crate::cache::memory::InMemoryCacheStore;
use crate::cache::{CacheStore, ReadCache};
use crate::category::repository::{CategoryRepository, MongoCategoryRepository};
use crate::category::service::CategoryService;
use crate::comment::repository::{CommentRepository, MongoCommentRepository};
use crate::comment::service::CommentService;
use crate::config::{AppConfig, AuthConfig};
use crate::counter::CounterSynchronizer;
use crate::database::memory::InMemoryStore;
use crate::like::repository::{LikeRepository, MongoLikeRepository};
use crate::like::service::LikeService;
use crate::middleware::error_handler::{json_config, path_config, query_config};

/// Storage backends the services are built on.
pub struct Stores {
    pub authors: Arc<dyn AuthorRepository>,
    pub blogs: Arc<dyn BlogRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub likes: Arc<dyn LikeRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub cache: Arc<dyn CacheStore>,
}

impl Stores {
    pub fn mongo(db: &Database, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            authors: Arc::new(MongoAuthorRepository::new(db)),
            blogs: Arc::new(MongoBlogRepository::new(db)),
            comments: Arc::new(MongoCommentRepository::new(db)),
            likes: Arc::new(MongoLikeRepository::new(db)),
            categories: Arc::new(MongoCategoryRepository::new(db)),
            cache,
        }
    }

    pub fn from_memory(store: Arc<InMemoryStore>, cache: Arc<dyn CacheStore>) -> Self {
        Self {
            authors: store.clone(),
            blogs: store.clone(),
            comments: store.clone(),
            likes: store.clone(),
            categories: store,
            cache,
        }
    }

    pub fn in_memory() -> Self {
        Self::from_memory(
            Arc::new(InMemoryStore::new()),
            Arc::new(InMemoryCacheStore::new()),
        )
    }
}

/// Shared application state, built once and cloned into every worker.
#[derive(Clone)]
pub struct AppServices {
    pub authors: web::Data<AuthorService>,
    pub blogs: web::Data<BlogService>,
    pub comments: web::Data<CommentService>,
    pub likes: web::Data<LikeService>,
    pub categories: web::Data<CategoryService>,
    pub auth: web::Data<AuthConfig>,
}

impl AppServices {
    pub fn new(stores: Stores, config: &AppConfig) -> Self {
        let cache = ReadCache::new(stores.cache, config.cache_ttl_seconds);
        let counters = CounterSynchronizer::new(
            stores.blogs.clone(),
            stores.comments.clone(),
            stores.likes.clone(),
        );

        Self {
            authors: web::Data::new(AuthorService::new(
                stores.authors.clone(),
                config.auth.clone(),
            )),
            blogs: web::Data::new(BlogService::new(
                stores.blogs.clone(),
                stores.authors.clone(),
                stores.categories.clone(),
                cache.clone(),
            )),
            comments: web::Data::new(CommentService::new(
                stores.comments.clone(),
                stores.blogs.clone(),
                stores.authors.clone(),
                counters.clone(),
                cache.clone(),
            )),
            likes: web::Data::new(LikeService::new(
                stores.likes,
                stores.blogs,
                stores.authors,
                counters,
                cache,
            )),
            categories: web::Data::new(CategoryService::new(stores.categories)),
            auth: web::Data::new(config.auth.clone()),
        }
    }

    /// Register the services and extractor settings on an app or scope.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(self.authors.clone())
            .app_data(self.blogs.clone())
            .app_data(self.comments.clone())
            .app_data(self.likes.clone())
            .app_data(self.categories.clone())
            .app_data(self.auth.clone())
            .app_data(json_config())
            .app_data(path_config())
            .app_data(query_config());
    }
}
