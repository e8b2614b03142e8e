use redis::{Client, RedisError, aio::ConnectionManager};
use serde::{Serialize, de::DeserializeOwned};
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct RedisCache {
    connection: ConnectionManager,
}

impl RedisCache {
    pub async fn new(redis_url: &str) -> Result<Self, RedisError> {
        let client = Client::open(redis_url)?;
        let connection = ConnectionManager::new(client).await?;
        Ok(Self { connection })
    }

    /// Get a value from cache
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> redis::RedisResult<Option<T>> {
        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut self.connection.clone())
            .await?;

        match value {
            Some(v) => {
                let deserialized = serde_json::from_str(&v).map_err(|e| {
                    redis::RedisError::from((
                        redis::ErrorKind::TypeError,
                        "Deserialization error",
                        e.to_string(),
                    ))
                })?;
                Ok(Some(deserialized))
            }
            None => Ok(None),
        }
    }

    /// Set a value in cache with optional TTL (in seconds)
    pub async fn set<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        ttl_seconds: Option<u64>,
    ) -> redis::RedisResult<()> {
        let serialized = serde_json::to_string(value).map_err(|e| {
            redis::RedisError::from((
                redis::ErrorKind::TypeError,
                "Serialization error",
                e.to_string(),
            ))
        })?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(serialized);

        if let Some(ttl) = ttl_seconds {
            cmd.arg("EX").arg(ttl);
        }

        cmd.query_async(&mut self.connection.clone()).await
    }

    /// Delete multiple keys matching a pattern
    pub async fn delete_pattern(&self, pattern: &str) -> redis::RedisResult<()> {
        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(pattern)
            .query_async(&mut self.connection.clone())
            .await?;

        if !keys.is_empty() {
            let _: () = redis::cmd("DEL")
                .arg(&keys)
                .query_async(&mut self.connection.clone())
                .await?;
        }

        Ok(())
    }
}

/// Cache key generators
pub mod keys {
    use uuid::Uuid;

    /// Every catalog key starts with this.
    pub const CATALOG_PREFIX: &str = "courses:";

    /// Key for an available-course listing with the given filters.
    pub fn course_list(filters: &str) -> String {
        format!("{CATALOG_PREFIX}list:{filters}")
    }

    /// Key for one course with its modules.
    pub fn course(id: Uuid) -> String {
        format!("{CATALOG_PREFIX}{id}")
    }

    pub fn catalog_pattern() -> String {
        format!("{CATALOG_PREFIX}*")
    }
}

/// Course catalog cache. Without Redis every lookup misses and every
/// write is a no-op, so handlers never need to know whether it is enabled.
/// Redis errors are logged and treated as misses.
#[derive(Clone)]
pub struct CatalogCache {
    redis: Option<RedisCache>,
    ttl: Duration,
}

impl CatalogCache {
    pub fn new(redis: Option<RedisCache>, ttl: Duration) -> Self {
        Self { redis, ttl }
    }

    pub fn disabled() -> Self {
        Self::new(None, Duration::ZERO)
    }

    /// Connect to `redis_url` when given; a failed connection disables the
    /// cache instead of aborting startup.
    pub async fn connect(redis_url: Option<&str>, ttl: Duration) -> Self {
        let Some(url) = redis_url else {
            tracing::info!("REDIS_URL not set, catalog cache disabled");
            return Self::disabled();
        };

        match RedisCache::new(url).await {
            Ok(redis) => {
                tracing::info!("Connected to Redis");
                Self::new(Some(redis), ttl)
            }
            Err(e) => {
                tracing::warn!("Redis unavailable, catalog cache disabled: {e}");
                Self::disabled()
            }
        }
    }

    pub async fn fetch<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let redis = self.redis.as_ref()?;
        match redis.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, "cache read failed: {e}");
                None
            }
        }
    }

    pub async fn store<T: Serialize>(&self, key: &str, value: &T) {
        let Some(redis) = &self.redis else {
            return;
        };
        if let Err(e) = redis.set(key, value, Some(self.ttl.as_secs())).await {
            tracing::warn!(key, "cache write failed: {e}");
        }
    }

    /// Drop every catalog entry. Called after any change to a course, its
    /// modules or its seat counter.
    pub async fn invalidate_catalog(&self) {
        let Some(redis) = &self.redis else {
            return;
        };
        if let Err(e) = redis.delete_pattern(&keys::catalog_pattern()).await {
            tracing::warn!("cache invalidation failed: {e}");
        }
    }
}

/// Wrapper type for Actix-web app data
pub type CacheData = Arc<CatalogCache>;
