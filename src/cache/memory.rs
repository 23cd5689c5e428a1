use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::time::Instant;

use super::CacheStore;
use crate::utils::error::CustomError;

/// In-process TTL cache, used when Redis is unavailable and in tests.
#[derive(Default)]
pub struct InMemoryCacheStore {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl InMemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries that have not expired yet.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .values()
            .filter(|(_, expires_at)| *expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for InMemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CustomError> {
        let now = Instant::now();
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some((value, expires_at)) if *expires_at > now => return Ok(Some(value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // expired: drop it so the map does not grow with dead keys
        let mut entries = self.entries.write().await;
        if entries.get(key).is_some_and(|(_, expires_at)| *expires_at <= now) {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CustomError> {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        // sweep keys that expired without being read again
        entries.retain(|_, (_, expires_at)| *expires_at > now);
        entries.insert(
            key.to_string(),
            (value.to_string(), now + Duration::from_secs(ttl_seconds)),
        );
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), CustomError> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_then_get_before_expiry() {
        let store = InMemoryCacheStore::new();
        store.set("blogs", "[1,2]", 300).await.unwrap();
        assert_eq!(store.get("blogs").await.unwrap(), Some("[1,2]".to_string()));
    }

    #[tokio::test]
    async fn set_overwrites() {
        let store = InMemoryCacheStore::new();
        store.set("blogs", "old", 300).await.unwrap();
        store.set("blogs", "new", 300).await.unwrap();
        assert_eq!(store.get("blogs").await.unwrap(), Some("new".to_string()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entry_expires_after_ttl() {
        let store = InMemoryCacheStore::new();
        store.set("blogs", "v", 300).await.unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        assert_eq!(store.get("blogs").await.unwrap(), Some("v".to_string()));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.get("blogs").await.unwrap(), None);
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn set_drops_entries_that_expired_unread() {
        let store = InMemoryCacheStore::new();
        store.set("blog:1", "one", 10).await.unwrap();
        store.set("blog:2", "two", 60).await.unwrap();

        tokio::time::advance(Duration::from_secs(11)).await;
        store.set("blogs", "[]", 300).await.unwrap();

        let entries = store.entries.read().await;
        assert_eq!(entries.len(), 2);
        assert!(!entries.contains_key("blog:1"));
        assert!(entries.contains_key("blog:2"));
    }

    #[tokio::test]
    async fn invalidate_absent_key_is_a_no_op() {
        let store = InMemoryCacheStore::new();
        store.invalidate("missing").await.unwrap();
        store.invalidate("missing").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn entry_lifecycle_absent_present_absent_present() {
        let store = InMemoryCacheStore::new();
        assert_eq!(store.get("blogs").await.unwrap(), None);

        store.set("blogs", "a", 300).await.unwrap();
        assert!(store.get("blogs").await.unwrap().is_some());

        store.invalidate("blogs").await.unwrap();
        assert_eq!(store.get("blogs").await.unwrap(), None);

        store.set("blogs", "b", 300).await.unwrap();
        assert_eq!(store.get("blogs").await.unwrap(), Some("b".to_string()));
    }
}
