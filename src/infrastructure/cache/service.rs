//! Cache service trait and error types.

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

use crate::domain::entities::Link;

/// Errors that can occur during cache operations.
#[derive(Debug)]
pub enum CacheError {
    ConnectionError(String),
    OperationError(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::ConnectionError(e) => write!(f, "Cache connection error: {}", e),
            Self::OperationError(e) => write!(f, "Cache operation error: {}", e),
        }
    }
}

impl std::error::Error for CacheError {}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Cache (C): maps short-code to a resolvable link record with TTL and
/// explicit invalidation.
///
/// C is a strict performance optimization. Its absence or failure must never
/// change Resolver correctness, only latency: implementations are fail-open
/// and return `Ok(None)` rather than propagating transport errors on reads,
/// and swallow write/invalidate errors after logging.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed, production
/// - [`crate::infrastructure::cache::NullCache`] - no-op, disabled caching
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves a cached link by short code.
    ///
    /// Returns `Ok(None)` on cache miss or on any backend error (fail-open).
    async fn get_link(&self, short_code: &str) -> CacheResult<Option<Link>>;

    /// Stores a link under `short_code` with the given TTL in seconds, or the
    /// implementation's default TTL if `None`.
    async fn put_link(&self, short_code: &str, link: &Link, ttl_seconds: Option<usize>) -> CacheResult<()>;

    /// Removes a cached link. Must be called by every LinkStore mutator
    /// (update/delete) on the affected short code; C does not self-repair.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;
}

/// Lets `Arc<dyn CacheService>` itself satisfy `CacheService`, so
/// application services that are generic over the cache implementation can
/// be monomorphized once over the trait object and swap Redis/Null at
/// startup based on configuration, rather than per-deployment recompilation.
#[async_trait]
impl CacheService for Arc<dyn CacheService> {
    async fn get_link(&self, short_code: &str) -> CacheResult<Option<Link>> {
        (**self).get_link(short_code).await
    }

    async fn put_link(&self, short_code: &str, link: &Link, ttl_seconds: Option<usize>) -> CacheResult<()> {
        (**self).put_link(short_code, link, ttl_seconds).await
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        (**self).invalidate(short_code).await
    }

    async fn health_check(&self) -> bool {
        (**self).health_check().await
    }
}
