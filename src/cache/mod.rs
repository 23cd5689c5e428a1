//! Cache-aside layer in front of blog list and blog detail reads.
//!
//! Entries are never patched: a write removes the affected keys (see
//! [`invalidation`]) and the next read repopulates them from the content store.

pub mod invalidation;
pub mod memory;

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, warn};
use mongodb::bson::oid::ObjectId;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::utils::error::CustomError;
use invalidation::Mutation;

pub const DEFAULT_TTL_SECONDS: u64 = 300;

const BLOG_LIST_KEY: &str = "blogs";

/// Key/value store with per-entry expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CustomError>;

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CustomError>;

    /// Removing a key that is not present is not an error.
    async fn invalidate(&self, key: &str) -> Result<(), CustomError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    BlogList,
    Blog(ObjectId),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::BlogList => f.write_str(BLOG_LIST_KEY),
            CacheKey::Blog(id) => write!(f, "{}{}", BLOG_LIST_KEY, id.to_hex()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

#[derive(Debug, PartialEq)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss,
}

#[derive(Clone)]
pub struct ReadCache {
    store: Arc<dyn CacheStore>,
    ttl_seconds: u64,
}

impl ReadCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl_seconds: u64) -> Self {
        Self { store, ttl_seconds }
    }

    pub fn ttl_seconds(&self) -> u64 {
        self.ttl_seconds
    }

    /// Look up `key`. Store failures surface; a payload that no longer decodes
    /// is dropped and reported as a miss.
    pub async fn get<T: DeserializeOwned>(
        &self,
        key: CacheKey,
    ) -> Result<CacheLookup<T>, CustomError> {
        let key = key.to_string();
        let Some(raw) = self.store.get(&key).await? else {
            debug!("cache miss for {}", key);
            return Ok(CacheLookup::Miss);
        };

        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!("cache hit for {}", key);
                Ok(CacheLookup::Hit(value))
            }
            Err(e) => {
                warn!("discarding undecodable cache entry {}: {}", key, e);
                self.remove(&key).await;
                Ok(CacheLookup::Miss)
            }
        }
    }

    /// Populate `key`. Failures are logged and never reach the caller.
    pub async fn set<T: Serialize>(&self, key: CacheKey, value: &T) {
        let key = key.to_string();
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!("failed to serialize cache entry {}: {}", key, e);
                return;
            }
        };

        if let Err(e) = self.store.set(&key, &json, self.ttl_seconds).await {
            warn!("failed to populate cache entry {}: {}", key, e);
        }
    }

    pub async fn invalidate(&self, key: CacheKey) {
        self.remove(&key.to_string()).await;
    }

    /// Drop every key the rule table maps `mutation` to.
    pub async fn invalidate_for(&self, mutation: Mutation) {
        for key in mutation.keys() {
            self.invalidate(key).await;
        }
    }

    /// Serve `key` from the cache, or run `load` and populate on a miss.
    /// A failed load propagates and leaves the entry absent.
    pub async fn read_through<T, F, Fut>(
        &self,
        key: CacheKey,
        load: F,
    ) -> Result<(T, CacheStatus), CustomError>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, CustomError>>,
    {
        if let CacheLookup::Hit(value) = self.get(key).await? {
            return Ok((value, CacheStatus::Hit));
        }

        let value = load().await?;
        self.set(key, &value).await;
        Ok((value, CacheStatus::Miss))
    }

    async fn remove(&self, key: &str) {
        if let Err(e) = self.store.invalidate(key).await {
            warn!(
                "failed to invalidate cache entry {} (stale for at most {}s): {}",
                key, self.ttl_seconds, e
            );
        }
    }
}
