//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};
use std::net::IpAddr;
use uuid::Uuid;

/// Raw request data captured on the redirect path.
///
/// Nothing here is derived or hashed yet: enrichment (IP hashing, user-agent parsing,
/// referrer domain extraction) happens on the click worker, off the request's critical
/// path. `country_code` is only populated from trusted edge headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestContext {
    pub client_ip: Option<IpAddr>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub country_code: Option<String>,
}

/// A click waiting in the recorder queue.
///
/// # Usage Flow
///
/// 1. Created by [`crate::domain::click_worker::ClickRecorder::enqueue`] after a successful resolve
/// 2. Sent to the bounded channel (non-blocking)
/// 3. Processed by [`crate::domain::click_worker::run_click_worker`]
/// 4. Enriched into a [`crate::domain::entities::NewClick`] for persistence
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub link_id: Uuid,
    pub slug: String,
    pub clicked_at: DateTime<Utc>,
    pub context: RequestContext,
}

impl ClickEvent {
    pub fn new(link_id: Uuid, slug: impl Into<String>, context: RequestContext) -> Self {
        Self {
            link_id,
            slug: slug.into(),
            clicked_at: Utc::now(),
            context,
        }
    }
}
