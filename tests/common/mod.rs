#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use savlink::application::services::{RedirectService, RedirectSettings};
use savlink::domain::click_event::ClickEvent;
use savlink::domain::click_worker::ClickRecorder;
use savlink::domain::entities::{CachedLink, Click, Link, LinkType, NewClick};
use savlink::domain::repositories::{ClickRepository, ClickSummary, LinkRepository};
use savlink::error::AppError;
use savlink::infrastructure::cache::{CacheResult, CacheService, NullCache};
use savlink::state::AppState;
use sqlx::PgPool;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use uuid::Uuid;

pub const OWNER_ID: Uuid = Uuid::from_u128(0x5a71_0000_0000_0000_0000_0000_0000_0001);

// ---------------------------------------------------------------------------
// In-memory link store
// ---------------------------------------------------------------------------

/// `LinkRepository` over a `Vec`, with the same slug precedence as the SQL version.
#[derive(Default)]
pub struct InMemoryLinkStore {
    links: Mutex<Vec<Link>>,
    down: AtomicBool,
}

impl InMemoryLinkStore {
    pub fn insert(&self, link: Link) -> Uuid {
        let id = link.id;
        self.links.lock().unwrap().push(link);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<Link> {
        self.links
            .lock()
            .unwrap()
            .iter()
            .find(|link| link.id == id)
            .cloned()
    }

    pub fn clicks(&self, id: Uuid) -> i64 {
        self.get(id).map(|link| link.clicks).unwrap_or_default()
    }

    pub fn update(&self, id: Uuid, f: impl FnOnce(&mut Link)) {
        if let Some(link) = self.links.lock().unwrap().iter_mut().find(|l| l.id == id) {
            f(link);
        }
    }

    pub fn remove(&self, id: Uuid) {
        self.links.lock().unwrap().retain(|link| link.id != id);
    }

    /// Makes every call fail as if the database were unreachable.
    pub fn set_down(&self, down: bool) {
        self.down.store(down, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), AppError> {
        if self.down.load(Ordering::SeqCst) {
            Err(AppError::unavailable("Database unavailable"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkStore {
    async fn find_by_slug(
        &self,
        slug: &str,
        only_shortened: bool,
    ) -> Result<Option<Link>, AppError> {
        self.check()?;

        let links = self.links.lock().unwrap();
        let mut matches: Vec<&Link> = links
            .iter()
            .filter(|link| link.slug.as_deref() == Some(slug))
            .filter(|link| !only_shortened || link.link_type == LinkType::Shortened)
            .collect();

        matches.sort_by(|a, b| {
            a.is_deleted
                .cmp(&b.is_deleted)
                .then(b.created_at.cmp(&a.created_at))
        });

        Ok(matches.first().map(|link| (*link).clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Link>, AppError> {
        self.check()?;
        Ok(self.get(id))
    }

    async fn find_id_by_slug(&self, slug: &str) -> Result<Option<Uuid>, AppError> {
        self.check()?;

        Ok(self
            .links
            .lock()
            .unwrap()
            .iter()
            .find(|link| {
                link.slug.as_deref() == Some(slug)
                    && link.link_type == LinkType::Shortened
                    && !link.is_deleted
            })
            .map(|link| link.id))
    }

    async fn increment_clicks(
        &self,
        id: Uuid,
        clicked_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        self.check()?;

        let mut links = self.links.lock().unwrap();
        let Some(link) = links.iter_mut().find(|link| link.id == id) else {
            return Ok(false);
        };

        link.clicks += 1;
        link.last_clicked_at = Some(link.last_clicked_at.map_or(clicked_at, |t| t.max(clicked_at)));
        Ok(true)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check()
    }
}

// ---------------------------------------------------------------------------
// In-memory click store
// ---------------------------------------------------------------------------

/// `ClickRepository` that appends events and bumps the shared link store's counter.
pub struct InMemoryClickStore {
    links: Arc<InMemoryLinkStore>,
    clicks: Mutex<Vec<Click>>,
}

impl InMemoryClickStore {
    pub fn new(links: Arc<InMemoryLinkStore>) -> Self {
        Self {
            links,
            clicks: Mutex::new(Vec::new()),
        }
    }

    pub fn all(&self) -> Vec<Click> {
        self.clicks.lock().unwrap().clone()
    }
}

#[async_trait]
impl ClickRepository for InMemoryClickStore {
    async fn record_click(&self, new_click: NewClick) -> Result<(), AppError> {
        if !self
            .links
            .increment_clicks(new_click.link_id, new_click.clicked_at)
            .await?
        {
            return Err(AppError::not_found("Referenced row no longer exists"));
        }

        self.clicks.lock().unwrap().push(Click {
            id: Uuid::new_v4(),
            link_id: new_click.link_id,
            clicked_at: new_click.clicked_at,
            ip_hash: new_click.ip_hash,
            user_agent: new_click.user_agent,
            referrer: new_click.referrer,
            referrer_domain: new_click.referrer_domain,
            device_type: new_click.device_type,
            browser: new_click.browser,
            os: new_click.os,
            country_code: new_click.country_code,
        });
        Ok(())
    }

    async fn recent_clicks(&self, link_id: Uuid, limit: i64) -> Result<Vec<Click>, AppError> {
        let mut clicks: Vec<Click> = self
            .all()
            .into_iter()
            .filter(|click| click.link_id == link_id)
            .collect();
        clicks.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at));
        clicks.truncate(limit.max(0) as usize);
        Ok(clicks)
    }

    async fn summary_for_link(
        &self,
        link_id: Uuid,
        since: DateTime<Utc>,
        _limit: i64,
    ) -> Result<ClickSummary, AppError> {
        let total_in_period = self
            .all()
            .iter()
            .filter(|click| click.link_id == link_id && click.clicked_at >= since)
            .count() as i64;

        Ok(ClickSummary {
            total_in_period,
            ..Default::default()
        })
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let mut clicks = self.clicks.lock().unwrap();
        let before = clicks.len();
        clicks.retain(|click| click.clicked_at >= cutoff);
        Ok((before - clicks.len()) as u64)
    }
}

// ---------------------------------------------------------------------------
// In-memory cache
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, CachedLink>>,
    unhealthy: AtomicBool,
}

impl InMemoryCache {
    pub fn get(&self, slug: &str) -> Option<CachedLink> {
        self.entries.lock().unwrap().get(slug).cloned()
    }

    pub fn put(&self, slug: &str, link: CachedLink) {
        self.entries.lock().unwrap().insert(slug.to_string(), link);
    }

    pub fn set_unhealthy(&self, unhealthy: bool) {
        self.unhealthy.store(unhealthy, Ordering::SeqCst);
    }
}

#[async_trait]
impl CacheService for InMemoryCache {
    async fn get_link(&self, slug: &str) -> CacheResult<Option<CachedLink>> {
        Ok(self.get(slug))
    }

    async fn set_link(
        &self,
        slug: &str,
        link: &CachedLink,
        _ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        self.put(slug, link.clone());
        Ok(())
    }

    async fn invalidate(&self, slug: &str) -> CacheResult<()> {
        self.entries.lock().unwrap().remove(slug);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        !self.unhealthy.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

pub fn short_link(slug: &str, url: &str) -> Link {
    Link::shortened(OWNER_ID, slug, url)
}

/// Seeds the link states the redirect tests rely on.
pub fn seed_links(store: &InMemoryLinkStore) {
    let now = Utc::now();

    let mut live = short_link("abc123", "https://example.com");
    live.title = Some("Example".to_string());
    live.notes = Some("An example page".to_string());
    store.insert(live);

    let mut old = short_link("old", "https://example.com/old");
    old.expires_at = Some(now - Duration::days(1));
    old.expired_redirect_url = Some("https://example.com/gone".to_string());
    store.insert(old);

    let mut stale = short_link("stale", "https://example.com/stale");
    stale.expires_at = Some(now - Duration::hours(1));
    store.insert(stale);

    store.insert(short_link("bad", "javascript:alert(1)"));

    let mut off = short_link("off", "https://example.com/off");
    off.is_active = false;
    store.insert(off);

    let mut deleted = short_link("deleted", "https://example.com/deleted");
    deleted.is_deleted = true;
    deleted.deleted_at = Some(now);
    store.insert(deleted);

    let mut saved = short_link("saved1", "https://example.com/saved");
    saved.link_type = LinkType::Saved;
    store.insert(saved);
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

pub struct TestApp {
    pub state: AppState,
    pub links: Arc<InMemoryLinkStore>,
    pub cache: Arc<InMemoryCache>,
    pub click_rx: mpsc::Receiver<ClickEvent>,
}

impl TestApp {
    /// Seeded store, in-memory cache, queue of 1000.
    pub fn new() -> Self {
        let links = Arc::new(InMemoryLinkStore::default());
        seed_links(&links);
        let cache = Arc::new(InMemoryCache::default());

        let (state, click_rx) = build_state(links.clone(), cache.clone(), 1000);

        Self {
            state,
            links,
            cache,
            click_rx,
        }
    }

    /// Drains every queued click event without blocking.
    pub fn queued_clicks(&mut self) -> Vec<ClickEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.click_rx.try_recv() {
            events.push(event);
        }
        events
    }
}

/// State backed by the given stores, with the default redirect settings.
pub fn build_state(
    links: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    queue_capacity: usize,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    let (click_recorder, click_rx) = ClickRecorder::channel(queue_capacity);

    let redirect_service = Arc::new(RedirectService::new(
        links.clone(),
        cache.clone(),
        click_recorder.clone(),
        RedirectSettings::default(),
    ));

    let state = AppState {
        redirect_service,
        link_repository: links,
        cache,
        click_recorder,
        public_base_url: Arc::from("https://sav.link"),
        behind_proxy: false,
    };

    (state, click_rx)
}

/// State without a cache backend.
pub fn build_uncached_state(
    links: Arc<dyn LinkRepository>,
) -> (AppState, mpsc::Receiver<ClickEvent>) {
    build_state(links, Arc::new(NullCache::new()), 100)
}

// ---------------------------------------------------------------------------
// PostgreSQL fixtures
// ---------------------------------------------------------------------------

pub async fn insert_link(pool: &PgPool, slug: &str, url: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO links (id, owner_id, link_type, slug, original_url)
         VALUES ($1, $2, 'shortened', $3, $4)
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(OWNER_ID)
    .bind(slug)
    .bind(url)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn insert_saved_link(pool: &PgPool, slug: &str, url: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO links (id, owner_id, link_type, slug, original_url)
         VALUES ($1, $2, 'saved', $3, $4)
         RETURNING id",
    )
    .bind(Uuid::new_v4())
    .bind(OWNER_ID)
    .bind(slug)
    .bind(url)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn soft_delete(pool: &PgPool, id: Uuid) {
    sqlx::query("UPDATE links SET is_deleted = TRUE, deleted_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await
        .unwrap();
}

// ---------------------------------------------------------------------------
// ConnectInfo for the mock transport
// ---------------------------------------------------------------------------

/// Inserts a fixed `ConnectInfo<SocketAddr>`, which the mock transport never provides.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> tower::Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut()
            .insert(axum::extract::ConnectInfo(addr));
        self.inner.call(req)
    }
}
