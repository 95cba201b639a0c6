//! Click enrichment and persistence, run by the click worker.

use async_trait::async_trait;
use metrics::counter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::click_worker::ClickProcessor;
use crate::domain::entities::NewClick;
use crate::domain::repositories::{ClickRepository, LinkRepository};
use crate::error::AppError;
use crate::utils::client_info::{
    IpHasher, MAX_REFERRER_LENGTH, MAX_USER_AGENT_LENGTH, referrer_domain, truncate_chars,
};
use crate::utils::user_agent::parse_user_agent;

/// Total attempts per store call, first try included.
const RETRY_ATTEMPTS: usize = 3;

/// What happened to a click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Event row written and counter incremented.
    Recorded,
    /// Tracking disabled: counter incremented, no event row.
    Counted,
    /// The link vanished before the click was processed.
    LinkMissing,
}

/// Turns queued [`ClickEvent`]s into stored clicks.
///
/// Links with tracking enabled get an event row plus the counter increment in one
/// transaction. Links with tracking disabled only get the counter increment.
pub struct ClickService {
    links: Arc<dyn LinkRepository>,
    clicks: Arc<dyn ClickRepository>,
    hasher: IpHasher,
}

impl ClickService {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        clicks: Arc<dyn ClickRepository>,
        hasher: IpHasher,
    ) -> Self {
        Self {
            links,
            clicks,
            hasher,
        }
    }

    /// Derives the stored form of a click from the raw request context.
    ///
    /// The client IP is hashed and dropped; free-text headers are truncated to their
    /// column limits.
    pub fn enrich(&self, event: &ClickEvent) -> NewClick {
        let context = &event.context;
        let parsed = context.user_agent.as_deref().and_then(parse_user_agent);

        NewClick {
            link_id: event.link_id,
            clicked_at: event.clicked_at,
            ip_hash: context.client_ip.map(|ip| self.hasher.hash(&ip)),
            user_agent: context
                .user_agent
                .as_deref()
                .map(|ua| truncate_chars(ua, MAX_USER_AGENT_LENGTH)),
            referrer: context
                .referrer
                .as_deref()
                .map(|r| truncate_chars(r, MAX_REFERRER_LENGTH)),
            referrer_domain: context.referrer.as_deref().and_then(referrer_domain),
            device_type: parsed
                .as_ref()
                .map(|p| p.device_type.as_str().to_string()),
            browser: parsed.as_ref().and_then(|p| p.browser.clone()),
            os: parsed.as_ref().and_then(|p| p.os.clone()),
            country_code: context.country_code.clone(),
        }
    }

    /// Persists one click.
    ///
    /// Transient store errors are retried with exponential backoff before giving up.
    /// A link deleted after the lookup (foreign key violation on insert) counts as
    /// missing, not as a failure.
    ///
    /// # Errors
    ///
    /// Returns the last store error once retries are exhausted.
    pub async fn record(&self, event: ClickEvent) -> Result<ClickOutcome, AppError> {
        let link = with_retry(|| self.links.find_by_id(event.link_id)).await?;

        let Some(link) = link else {
            debug!("Link {} disappeared, dropping click", event.link_id);
            return Ok(ClickOutcome::LinkMissing);
        };

        if link.click_tracking_enabled {
            let new_click = self.enrich(&event);
            return match with_retry(|| self.clicks.record_click(new_click.clone())).await {
                Ok(()) => Ok(ClickOutcome::Recorded),
                Err(AppError::NotFound { .. }) => {
                    debug!("Link {} deleted mid-flight, dropping click", link.id);
                    Ok(ClickOutcome::LinkMissing)
                }
                Err(e) => Err(e),
            };
        }

        let updated = with_retry(|| self.links.increment_clicks(link.id, event.clicked_at)).await?;

        Ok(if updated {
            ClickOutcome::Counted
        } else {
            ClickOutcome::LinkMissing
        })
    }
}

#[async_trait]
impl ClickProcessor for ClickService {
    async fn process(&self, event: ClickEvent) {
        let slug = event.slug.clone();

        match self.record(event).await {
            Ok(ClickOutcome::LinkMissing) => {}
            Ok(outcome) => {
                debug!("Click for {} stored ({:?})", slug, outcome);
                counter!("clicks_recorded_total").increment(1);
            }
            Err(e) => {
                warn!("Click recording failed for {}: {}", slug, e);
                counter!("clicks_failed_total").increment(1);
            }
        }
    }
}

async fn with_retry<T, F, Fut>(op: F) -> Result<T, AppError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    let strategy = ExponentialBackoff::from_millis(10)
        .factor(5)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(RETRY_ATTEMPTS - 1);

    RetryIf::spawn(strategy, op, |e: &AppError| e.is_transient()).await
}
