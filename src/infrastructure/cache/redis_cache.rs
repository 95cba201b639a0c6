//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use crate::domain::entities::CachedLink;
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, error, info, warn};

const KEY_PREFIX: &str = "savlink:link:";

/// Redis cache of link snapshots.
///
/// Uses `ConnectionManager` for connection reuse and automatic reconnects. Every
/// operation first PINGs the server; an unreachable server turns the operation into a
/// miss or a no-op. Errors are logged and never propagated.
pub struct RedisCache {
    client: ConnectionManager,
    default_ttl: u64,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// `default_ttl_seconds` applies when [`CacheService::set_link`] is called without a
    /// TTL; controlled via `CACHE_TTL_SECONDS`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::ConnectionError`] if the URL is invalid, the connection cannot
    /// be established, or the PING fails. The caller falls back to
    /// [`super::NullCache`] in that case.
    pub async fn connect(redis_url: &str, default_ttl_seconds: u64) -> CacheResult<Self> {
        info!(
            "Connecting to Redis at {}",
            crate::config::mask_connection_string(redis_url)
        );

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

        info!("✓ Connected to Redis");

        Ok(Self {
            client: manager,
            default_ttl: default_ttl_seconds,
        })
    }

    /// Full Redis key for a slug.
    pub fn build_key(slug: &str) -> String {
        format!("{}{}", KEY_PREFIX, slug)
    }

    /// Returns a live connection, or `None` when the server does not answer PING.
    async fn connection(&self) -> Option<ConnectionManager> {
        let mut conn = self.client.clone();

        match conn.ping::<()>().await {
            Ok(()) => Some(conn),
            Err(e) => {
                debug!("Redis unavailable: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_link(&self, slug: &str) -> CacheResult<Option<CachedLink>> {
        let Some(mut conn) = self.connection().await else {
            return Ok(None);
        };

        let key = Self::build_key(slug);

        let payload = match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(payload)) => payload,
            Ok(None) => {
                debug!("Cache MISS: {}", slug);
                return Ok(None);
            }
            Err(e) => {
                error!("Redis GET error for {}: {}", slug, e);
                return Ok(None);
            }
        };

        match serde_json::from_str::<CachedLink>(&payload) {
            Ok(link) => {
                debug!("Cache HIT: {}", slug);
                Ok(Some(link))
            }
            Err(e) => {
                warn!("Corrupt cache entry for {}, evicting: {}", slug, e);
                if let Err(e) = conn.del::<_, i32>(&key).await {
                    warn!("Redis DEL error for {}: {}", slug, e);
                }
                Ok(None)
            }
        }
    }

    async fn set_link(
        &self,
        slug: &str,
        link: &CachedLink,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let Some(mut conn) = self.connection().await else {
            return Ok(());
        };

        let payload = match serde_json::to_string(link) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("{}", CacheError::from(e));
                return Ok(());
            }
        };

        let key = Self::build_key(slug);
        let ttl = ttl_seconds.unwrap_or(self.default_ttl);

        match conn.set_ex::<_, _, ()>(&key, payload, ttl).await {
            Ok(()) => {
                debug!("Cache SET: {} (TTL: {}s)", slug, ttl);
                Ok(())
            }
            Err(e) => {
                warn!("Redis SET error for {}: {}", slug, e);
                Ok(())
            }
        }
    }

    async fn invalidate(&self, slug: &str) -> CacheResult<()> {
        let Some(mut conn) = self.connection().await else {
            return Ok(());
        };

        match conn.del::<_, i32>(Self::build_key(slug)).await {
            Ok(deleted) => {
                if deleted > 0 {
                    debug!("Cache INVALIDATE: {}", slug);
                }
                Ok(())
            }
            Err(e) => {
                warn!("Redis DEL error for {}: {}", slug, e);
                Ok(())
            }
        }
    }

    async fn health_check(&self) -> bool {
        self.connection().await.is_some()
    }
}
