//! Short-link resolution: cache first, store second.
//!
//! The resolver is the only reader of links on the public path. It decides between
//! "redirect", "redirect to the expired fallback" and the error outcomes, keeps the
//! cache warm on misses and hands successful redirects to the click recorder.

use chrono::{DateTime, Utc};
use metrics::counter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::domain::click_event::RequestContext;
use crate::domain::click_worker::ClickRecorder;
use crate::domain::entities::{CachedLink, Link};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::slug::{ReservedSlugs, validate_slug};
use crate::utils::url_safety::is_safe_url;

/// Tunables for [`RedirectService`].
#[derive(Debug, Clone)]
pub struct RedirectSettings {
    pub cache_ttl_seconds: u64,
    pub cache_timeout: Duration,
    pub store_timeout: Duration,
    pub reserved: ReservedSlugs,
}

impl RedirectSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            cache_ttl_seconds: config.cache_ttl_seconds,
            cache_timeout: config.cache_timeout(),
            store_timeout: config.store_timeout(),
            reserved: ReservedSlugs::new(&config.extra_reserved_slugs),
        }
    }
}

impl Default for RedirectSettings {
    fn default() -> Self {
        Self {
            cache_ttl_seconds: 3600,
            cache_timeout: Duration::from_millis(500),
            store_timeout: Duration::from_millis(3000),
            reserved: ReservedSlugs::default(),
        }
    }
}

/// Outcome of the liveness checks for a servable link.
#[derive(Debug, PartialEq)]
enum Verdict {
    Live(String),
    Expired(Option<String>),
}

/// Applies the checks in order: deleted, inactive, expired, unsafe destination.
fn assess(slug: &str, link: &CachedLink, now: DateTime<Utc>) -> Result<Verdict, AppError> {
    if link.is_deleted {
        debug!("Slug {} is deleted", slug);
        return Err(AppError::not_found("Link not found"));
    }

    if !link.is_active {
        debug!("Slug {} is disabled", slug);
        return Err(AppError::gone("This link has been disabled"));
    }

    if link.is_expired_at(now) {
        debug!("Slug {} expired", slug);
        return Ok(Verdict::Expired(link.expired_redirect_url.clone()));
    }

    let destination = link.original_url.trim();
    if !is_safe_url(destination) {
        warn!("Blocked unsafe redirect: {}", slug);
        return Err(AppError::bad_request("Invalid destination"));
    }

    Ok(Verdict::Live(destination.to_string()))
}

/// Expired links redirect to their fallback when it is safe, otherwise 410.
fn expired_outcome(slug: &str, fallback: Option<String>) -> Result<String, AppError> {
    match fallback.as_deref().map(str::trim) {
        Some(url) if is_safe_url(url) => Ok(url.to_string()),
        Some(_) => {
            warn!("Ignoring unsafe expired-redirect URL for {}", slug);
            Err(AppError::gone("This link has expired"))
        }
        None => Err(AppError::gone("This link has expired")),
    }
}

/// Resolves slugs to destinations.
///
/// Cache failures are never visible to callers: a timed-out or failing cache is a miss.
/// Store failures surface as 500, store timeouts as 503.
pub struct RedirectService {
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    recorder: ClickRecorder,
    settings: RedirectSettings,
}

impl RedirectService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        recorder: ClickRecorder,
        settings: RedirectSettings,
    ) -> Self {
        Self {
            links,
            cache,
            recorder,
            settings,
        }
    }

    /// Resolves a slug to the URL to redirect to, and queues the click.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for malformed slugs and unsafe destinations
    /// - [`AppError::NotFound`] for unknown, reserved and deleted slugs
    /// - [`AppError::Gone`] for disabled links and expired links without a fallback
    /// - [`AppError::Unavailable`] / [`AppError::Internal`] when the store fails
    pub async fn resolve(&self, raw_slug: &str, context: RequestContext) -> Result<String, AppError> {
        let result = self.resolve_inner(raw_slug, context).await;

        let outcome = match &result {
            Ok(_) => "redirect",
            Err(e) => e.code(),
        };
        counter!("redirects_total", "outcome" => outcome).increment(1);

        result
    }

    async fn resolve_inner(
        &self,
        raw_slug: &str,
        context: RequestContext,
    ) -> Result<String, AppError> {
        let slug = self.checked_slug(raw_slug)?;
        let now = Utc::now();

        if let Some(cached) = self.cache_get(&slug).await {
            counter!("redirect_cache_total", "result" => "hit").increment(1);

            return match assess(&slug, &cached, now)? {
                Verdict::Expired(fallback) => {
                    self.cache_invalidate(&slug).await;
                    expired_outcome(&slug, fallback)
                }
                Verdict::Live(url) => {
                    self.record_cached_click(&slug, context).await;
                    Ok(url)
                }
            };
        }

        counter!("redirect_cache_total", "result" => "miss").increment(1);

        let link = self
            .with_store_timeout(self.links.find_by_slug(&slug, true))
            .await?
            .ok_or_else(|| {
                debug!("Slug {} not found", slug);
                AppError::not_found("Link not found")
            })?;

        let snapshot = CachedLink::from(&link);

        match assess(&slug, &snapshot, now)? {
            Verdict::Expired(fallback) => expired_outcome(&slug, fallback),
            Verdict::Live(url) => {
                self.cache_set(&slug, &snapshot).await;
                self.recorder.enqueue(link.id, &slug, context);
                Ok(url)
            }
        }
    }

    /// Loads a live link for the preview page. Reads the store only.
    ///
    /// # Errors
    ///
    /// Same classes as [`Self::resolve`]; expired links are always 410 here.
    pub async fn preview(&self, raw_slug: &str) -> Result<Link, AppError> {
        let slug = self.checked_slug(raw_slug)?;

        let link = self
            .with_store_timeout(self.links.find_by_slug(&slug, true))
            .await?
            .filter(|link| !link.is_deleted)
            .ok_or_else(|| AppError::not_found("Link not found"))?;

        if !link.is_active {
            return Err(AppError::gone("This link has been disabled"));
        }

        if link.is_expired() {
            return Err(AppError::gone("This link has expired"));
        }

        Ok(link)
    }

    /// Re-reads a slug from the store and writes its snapshot to the cache.
    ///
    /// Mutation flows call this after creating or editing a link. Deleted or missing
    /// links are evicted instead. Returns whether a snapshot was written.
    pub async fn refresh_cache(&self, raw_slug: &str) -> Result<bool, AppError> {
        let slug = validate_slug(raw_slug)?;

        let link = self
            .with_store_timeout(self.links.find_by_slug(&slug, true))
            .await?;

        match link {
            Some(link) if !link.is_deleted => {
                self.cache_set(&slug, &CachedLink::from(&link)).await;
                Ok(true)
            }
            _ => {
                self.cache_invalidate(&slug).await;
                Ok(false)
            }
        }
    }

    /// Evicts a slug from the cache. Called on delete, slug change and deactivation.
    pub async fn invalidate_cache(&self, raw_slug: &str) -> Result<(), AppError> {
        let slug = validate_slug(raw_slug)?;
        self.cache_invalidate(&slug).await;
        Ok(())
    }

    fn checked_slug(&self, raw_slug: &str) -> Result<String, AppError> {
        let slug = validate_slug(raw_slug).inspect_err(|_| {
            debug!("Rejected malformed slug ({} chars)", raw_slug.chars().count());
        })?;

        if self.settings.reserved.contains(&slug) {
            debug!("Slug {} is reserved", slug);
            return Err(AppError::not_found("Not found"));
        }

        Ok(slug)
    }

    /// Cache hits carry no durable id, so the id is looked up before queueing.
    /// Failure here only costs the click; the redirect is still served.
    async fn record_cached_click(&self, slug: &str, context: RequestContext) {
        match self
            .with_store_timeout(self.links.find_id_by_slug(slug))
            .await
        {
            Ok(Some(id)) => {
                self.recorder.enqueue(id, slug, context);
            }
            Ok(None) => debug!("Cached slug {} has no live row, click skipped", slug),
            Err(e) => warn!("Could not resolve id for {}, click skipped: {}", slug, e),
        }
    }

    async fn with_store_timeout<T, F>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, AppError>>,
    {
        match timeout(self.settings.store_timeout, fut).await {
            Ok(result) => result,
            Err(_) => {
                error!(
                    "Store call timed out after {}ms",
                    self.settings.store_timeout.as_millis()
                );
                Err(AppError::unavailable("Service temporarily unavailable"))
            }
        }
    }

    async fn cache_get(&self, slug: &str) -> Option<CachedLink> {
        match timeout(self.settings.cache_timeout, self.cache.get_link(slug)).await {
            Ok(Ok(link)) => link,
            Ok(Err(e)) => {
                warn!("Cache lookup failed for {}: {}", slug, e);
                None
            }
            Err(_) => {
                debug!("Cache lookup timed out for {}", slug);
                None
            }
        }
    }

    async fn cache_set(&self, slug: &str, link: &CachedLink) {
        let write = self
            .cache
            .set_link(slug, link, Some(self.settings.cache_ttl_seconds));

        match timeout(self.settings.cache_timeout, write).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Cache write failed for {}: {}", slug, e),
            Err(_) => debug!("Cache write timed out for {}", slug),
        }
    }

    async fn cache_invalidate(&self, slug: &str) {
        match timeout(self.settings.cache_timeout, self.cache.invalidate(slug)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("Cache invalidation failed for {}: {}", slug, e),
            Err(_) => debug!("Cache invalidation timed out for {}", slug),
        }
    }
}
