//! DTO for the link preview endpoint.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Link;

/// Public metadata of a live short link.
///
/// `description` carries the owner's notes.
#[derive(Debug, Serialize)]
pub struct PreviewData {
    pub slug: String,
    pub short_url: String,
    pub original_url: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub og_title: Option<String>,
    pub og_description: Option<String>,
    pub og_image: Option<String>,
    pub favicon_url: Option<String>,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
}

impl PreviewData {
    pub fn from_link(link: Link, public_base_url: &str) -> Self {
        let slug = link.slug.clone().unwrap_or_default();
        let short_url = link
            .short_url(public_base_url)
            .unwrap_or_else(|| format!("{}/{}", public_base_url.trim_end_matches('/'), slug));

        Self {
            slug,
            short_url,
            original_url: link.original_url,
            title: link.title,
            description: link.notes,
            og_title: link.og_title,
            og_description: link.og_description,
            og_image: link.og_image,
            favicon_url: link.favicon_url,
            clicks: link.clicks,
            created_at: link.created_at,
        }
    }
}
