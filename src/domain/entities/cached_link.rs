//! Denormalized snapshot of the redirect-relevant fields of a link.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Link;

/// What the cache stores per slug.
///
/// Serialized to JSON only at the cache boundary. Missing boolean fields in older
/// payloads default to the permissive value the store would have (`is_active` and
/// `click_tracking_enabled` true, `is_deleted` false).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedLink {
    pub original_url: String,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expired_redirect_url: Option<String>,
    #[serde(default = "default_true")]
    pub click_tracking_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl CachedLink {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now > expires)
    }
}

impl From<&Link> for CachedLink {
    fn from(link: &Link) -> Self {
        Self {
            original_url: link.original_url.clone(),
            is_active: link.is_active,
            is_deleted: link.is_deleted,
            expires_at: link.expires_at,
            expired_redirect_url: link.expired_redirect_url.clone(),
            click_tracking_enabled: link.click_tracking_enabled,
        }
    }
}
