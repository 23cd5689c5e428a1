use async_trait::async_trait;
use log::info;
use redis::aio::MultiplexedConnection;
use redis::{AsyncCommands, Client};

use crate::cache::CacheStore;
use crate::utils::error::CustomError;

const CACHE_PREFIX: &str = "cache:";

/// Redis connection wrapper
pub struct RedisClient {
    connection: MultiplexedConnection,
}

impl RedisClient {
    pub async fn init(redis_url: &str) -> Result<Self, redis::RedisError> {
        let client = Client::open(redis_url)?;
        let connection = client.get_multiplexed_async_connection().await?;

        info!("Connected successfully to Redis");

        Ok(Self { connection })
    }

    pub fn get_connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }
}

/// Read-cache backend on Redis. Keys live under the `cache:` prefix and expire
/// through `SET ... EX`.
#[derive(Clone)]
pub struct RedisCacheStore {
    connection: MultiplexedConnection,
}

impl RedisCacheStore {
    pub fn new(client: &RedisClient) -> Self {
        Self {
            connection: client.get_connection(),
        }
    }

    fn cache_key(key: &str) -> String {
        format!("{}{}", CACHE_PREFIX, key)
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CustomError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(Self::cache_key(key)).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<(), CustomError> {
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(Self::cache_key(key), value, ttl_seconds)
            .await?;
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), CustomError> {
        let mut conn = self.connection.clone();
        // DEL on a missing key returns 0, not an error
        conn.del::<_, ()>(Self::cache_key(key)).await?;
        Ok(())
    }
}

pub async fn connect_to_redis(redis_url: &str) -> Result<RedisClient, redis::RedisError> {
    RedisClient::init(redis_url).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_prefixed() {
        assert_eq!(RedisCacheStore::cache_key("blogs"), "cache:blogs");
    }
}
