//! Cache service trait and error types.

use async_trait::async_trait;

use crate::domain::entities::CachedLink;

/// Errors that can occur inside a cache backend.
///
/// These never reach HTTP responses: backends log them and degrade to a miss or no-op.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),

    #[error("Cache operation error: {0}")]
    OperationError(String),

    #[error("Cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Slug-keyed store of [`CachedLink`] snapshots.
///
/// Implementations must be thread-safe and fail open: the durable store is always
/// authoritative, so a broken cache only costs latency.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache with TTL support
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Retrieves the snapshot cached for a slug.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(link))` on cache hit
    /// - `Ok(None)` on cache miss or backend failure (fail-open behavior)
    async fn get_link(&self, slug: &str) -> CacheResult<Option<CachedLink>>;

    /// Stores a snapshot with an optional TTL.
    ///
    /// `ttl_seconds = None` uses the backend's default TTL.
    async fn set_link(
        &self,
        slug: &str,
        link: &CachedLink,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Removes the snapshot for a slug.
    ///
    /// Called on expiry, deletion, slug change and deactivation.
    async fn invalidate(&self, slug: &str) -> CacheResult<()>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;

    /// Whether this backend actually stores anything.
    fn is_enabled(&self) -> bool {
        true
    }
}
