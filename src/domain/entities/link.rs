//! Link entity representing a saved or shortened URL.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a link is a plain bookmark or a public short link.
///
/// Only `Shortened` links are reachable through the redirect path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkType {
    Saved,
    Shortened,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Saved => "saved",
            LinkType::Shortened => "shortened",
        }
    }

    /// Parses the database representation. Unknown values are treated as `Saved`
    /// so they can never be served as redirects.
    pub fn from_db(value: &str) -> Self {
        match value {
            "shortened" => LinkType::Shortened,
            _ => LinkType::Saved,
        }
    }
}

/// A link owned by a user.
///
/// The redirect path only reads the liveness fields (`is_active`, `is_deleted`,
/// `expires_at`) and the destination; the remaining metadata feeds the preview endpoint.
/// `clicks` and `last_clicked_at` are only ever changed by the click recorder.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub link_type: LinkType,
    pub slug: Option<String>,
    pub original_url: String,
    pub title: Option<String>,
    pub notes: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub favicon_url: Option<String>,
    pub is_active: bool,
    pub is_deleted: bool,
    pub deleted_at: Option<DateTime<Utc>>,
    pub clicks: i64,
    pub last_clicked_at: Option<DateTime<Utc>>,
    pub click_tracking_enabled: bool,
    pub expires_at: Option<DateTime<Utc>>,
    pub expired_redirect_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Link {
    /// Builds an active, tracked short link with no metadata.
    ///
    /// The slug is stored lower-cased and trimmed, matching how it is looked up.
    pub fn shortened(owner_id: Uuid, slug: &str, original_url: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            link_type: LinkType::Shortened,
            slug: Some(slug.trim().to_lowercase()),
            original_url: original_url.into(),
            title: None,
            notes: None,
            og_title: None,
            og_description: None,
            og_image: None,
            favicon_url: None,
            is_active: true,
            is_deleted: false,
            deleted_at: None,
            clicks: 0,
            last_clicked_at: None,
            click_tracking_enabled: true,
            expires_at: None,
            expired_redirect_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_shortened(&self) -> bool {
        self.link_type == LinkType::Shortened && self.slug.is_some()
    }

    /// Returns true if the link had an expiry and `now` is past it.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires| now > expires)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Returns the public short URL, or `None` for links without a slug.
    pub fn short_url(&self, base_url: &str) -> Option<String> {
        if !self.is_shortened() {
            return None;
        }
        self.slug
            .as_ref()
            .map(|slug| format!("{}/{}", base_url.trim_end_matches('/'), slug))
    }
}
