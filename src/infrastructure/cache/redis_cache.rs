//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::entities::Link;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

/// Redis cache implementation for fast link lookups.
///
/// Links are stored as JSON under `link:{code}`. All operations are
/// fail-open: errors are logged but never propagate to the Resolver.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: usize,
    key_prefix: String,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// `default_ttl_secs` backs entries written without an explicit TTL
    /// (the spec default is 300s / `cache_ttl`).
    pub async fn connect(redis_url: &str, default_ttl_secs: usize) -> CacheResult<Self> {
        info!("Connecting to Redis at {}", redis_url);

        let client = Client::open(redis_url).map_err(|e| {
            CacheError::ConnectionError(format!("Failed to create Redis client: {}", e))
        })?;

        let manager = ConnectionManager::new(client).await.map_err(|e| {
            CacheError::ConnectionError(format!("Failed to connect to Redis: {}", e))
        })?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::ConnectionError(format!("Redis PING failed: {}", e)))?;

        info!("connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_secs,
            key_prefix: "link:".to_string(),
        })
    }

    fn build_key(&self, short_code: &str) -> String {
        format!("{}{}", self.key_prefix, short_code)
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_link(&self, short_code: &str) -> CacheResult<Option<Link>> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<Link>(&raw) {
                Ok(link) => {
                    debug!(short_code, "cache hit");
                    Ok(Some(link))
                }
                Err(e) => {
                    warn!(short_code, error = %e, "cache payload corrupt, treating as miss");
                    Ok(None)
                }
            },
            Ok(None) => {
                debug!(short_code, "cache miss");
                Ok(None)
            }
            Err(e) => {
                error!(short_code, error = %e, "redis GET error");
                Ok(None)
            }
        }
    }

    async fn put_link(&self, short_code: &str, link: &Link, ttl_seconds: Option<usize>) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);

        let raw = match serde_json::to_string(link) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(short_code, error = %e, "failed to serialize link for cache");
                return Ok(());
            }
        };

        match conn.set_ex::<_, _, ()>(&key, raw, ttl as u64).await {
            Ok(_) => {
                debug!(short_code, ttl, "cache set");
                Ok(())
            }
            Err(e) => {
                warn!(short_code, error = %e, "redis SET error");
                Ok(())
            }
        }
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        let key = self.build_key(short_code);
        let mut conn = self.client.clone();

        match conn.del::<_, i32>(&key).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!(short_code, "cache invalidated");
                }
                Ok(())
            }
            Err(e) => {
                warn!(short_code, error = %e, "redis DEL error");
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
