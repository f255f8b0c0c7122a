//! Redis cache client.
//!
//! Values are stored as JSON. Every key is namespaced with `CACHE_PREFIX`.

use std::time::Duration;

use redis::{AsyncCommands, Client, aio::ConnectionManager};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};
use uuid::Uuid;

use warden_config::CacheConfig;

const PROBE_KEY_PREFIX: &str = "probe";
const PROBE_TTL: Duration = Duration::from_secs(5);

/// Redis cache client over a shared connection manager.
#[derive(Clone)]
pub struct RedisCache {
    conn: ConnectionManager,
    default_ttl: Duration,
    config: CacheConfig,
}

impl std::fmt::Debug for RedisCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisCache")
            .field("default_ttl", &self.default_ttl)
            .field("key_prefix", &self.config.key_prefix)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Cache probe read back a different value")]
    ProbeMismatch,
}

impl RedisCache {
    /// Connects to `REDIS_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid or the server
    /// cannot be reached.
    pub async fn connect(config: &CacheConfig) -> Result<Self, CacheError> {
        let client = Client::open(config.redis_url.as_str())?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn,
            default_ttl: Duration::from_secs(config.default_ttl_seconds),
            config: config.clone(),
        })
    }

    fn key(&self, key: &str) -> String {
        self.config.prefixed_key(key)
    }

    /// Gets a cached value. Misses, Redis errors and undecodable values all
    /// read as `None`.
    #[instrument(skip(self), fields(cache.operation = "GET"))]
    pub async fn get<T>(&self, key: &str) -> Option<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        let mut conn = self.conn.clone();
        let key = self.key(key);

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(value)) => match serde_json::from_str(&value) {
                Ok(parsed) => {
                    debug!(cache.key = %key, "Cache hit");
                    Some(parsed)
                }
                Err(e) => {
                    error!(cache.key = %key, error = %e, "Failed to deserialize cached value");
                    None
                }
            },
            Ok(None) => {
                debug!(cache.key = %key, "Cache miss");
                None
            }
            Err(e) => {
                error!(cache.key = %key, error = %e, "Redis GET error");
                None
            }
        }
    }

    /// Sets a value with the default TTL.
    #[instrument(skip(self, value), fields(cache.operation = "SET"))]
    pub async fn set<T>(&self, key: &str, value: &T) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        self.set_with_ttl(key, value, self.default_ttl).await
    }

    #[instrument(skip(self, value), fields(cache.operation = "SETEX"))]
    pub async fn set_with_ttl<T>(
        &self,
        key: &str,
        value: &T,
        ttl: Duration,
    ) -> Result<(), CacheError>
    where
        T: Serialize,
    {
        let mut conn = self.conn.clone();
        let key = self.key(key);
        let json = serde_json::to_string(value)?;

        conn.set_ex::<_, _, ()>(&key, json, ttl.as_secs().max(1)).await?;
        debug!(cache.key = %key, cache.ttl_secs = %ttl.as_secs(), "Cache set");

        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "DEL"))]
    pub async fn invalidate(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let key = self.key(key);

        conn.del::<_, ()>(&key).await?;
        debug!(cache.key = %key, "Cache invalidated");

        Ok(())
    }

    #[instrument(skip(self), fields(cache.operation = "PING"))]
    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    /// Pings, then writes, reads back and deletes a short-lived key unique
    /// to this call.
    #[instrument(skip(self), fields(cache.operation = "PROBE"))]
    pub async fn probe(&self) -> Result<(), CacheError> {
        self.ping().await?;

        let token = Uuid::new_v4().to_string();
        let key = probe_key(&token);
        self.set_with_ttl(&key, &token, PROBE_TTL).await?;

        let read: Option<String> = self.get(&key).await;
        self.invalidate(&key).await?;

        if read.as_deref() == Some(token.as_str()) {
            Ok(())
        } else {
            Err(CacheError::ProbeMismatch)
        }
    }
}

fn probe_key(token: &str) -> String {
    format!("{}:{}", PROBE_KEY_PREFIX, token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Marker {
        id: i32,
        name: String,
    }

    #[tokio::test]
    async fn connect_rejects_bad_url() {
        let config = CacheConfig {
            redis_url: "not a redis url".into(),
            ..CacheConfig::default()
        };
        assert!(matches!(
            RedisCache::connect(&config).await,
            Err(CacheError::Connection(_))
        ));
    }

    #[test]
    fn probe_keys_are_per_call() {
        let a = probe_key(&Uuid::new_v4().to_string());
        let b = probe_key(&Uuid::new_v4().to_string());
        assert!(a.starts_with("probe:"));
        assert_ne!(a, b);
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn concurrent_probes_do_not_interfere() {
        let cache = RedisCache::connect(&CacheConfig::default()).await.unwrap();
        let (a, b) = tokio::join!(cache.probe(), cache.probe());
        a.unwrap();
        b.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires Redis"]
    async fn set_get_invalidate() {
        let cache = RedisCache::connect(&CacheConfig::default()).await.unwrap();
        let marker = Marker {
            id: 1,
            name: "warden".to_string(),
        };

        cache.set("test:marker", &marker).await.unwrap();
        let read: Option<Marker> = cache.get("test:marker").await;
        assert_eq!(read, Some(marker));

        cache.invalidate("test:marker").await.unwrap();
        let read: Option<Marker> = cache.get("test:marker").await;
        assert_eq!(read, None);

        cache.ping().await.unwrap();
        cache.probe().await.unwrap();
    }
}
