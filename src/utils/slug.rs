//! Slug normalization and the reserved-slug set.

use crate::error::AppError;
use std::collections::HashSet;

/// Maximum slug length in characters.
pub const MAX_SLUG_LENGTH: usize = 50;

/// Paths the service or its surrounding application routes itself.
///
/// A request for one of these never reaches the link store.
pub const BUILTIN_RESERVED_SLUGS: &[&str] = &[
    "api",
    "health",
    "admin",
    "auth",
    "login",
    "logout",
    "register",
    "signup",
    "dashboard",
    "static",
    "assets",
    "preview",
    "settings",
    "docs",
    "favicon.ico",
    "robots.txt",
    "www",
    "app",
    "help",
    "about",
    "terms",
    "privacy",
];

/// Lower-cases and trims a slug taken from a request path.
pub fn normalize_slug(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalizes a slug and checks its length.
///
/// # Errors
///
/// Returns [`AppError::Validation`] ("Invalid link") for empty slugs and slugs longer
/// than [`MAX_SLUG_LENGTH`] characters.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(validate_slug("  AbC123 ").unwrap(), "abc123");
/// assert!(validate_slug("").is_err());
/// ```
pub fn validate_slug(raw: &str) -> Result<String, AppError> {
    let slug = normalize_slug(raw);

    if slug.is_empty() || slug.chars().count() > MAX_SLUG_LENGTH {
        return Err(AppError::bad_request("Invalid link"));
    }

    Ok(slug)
}

/// Set of slugs that must resolve to 404 without touching the cache or the store.
#[derive(Debug, Clone)]
pub struct ReservedSlugs {
    slugs: HashSet<String>,
}

impl ReservedSlugs {
    /// Built-in list extended with `extra` (already normalized or not).
    pub fn new<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut slugs: HashSet<String> = BUILTIN_RESERVED_SLUGS
            .iter()
            .map(|s| s.to_string())
            .collect();

        slugs.extend(
            extra
                .into_iter()
                .map(|s| normalize_slug(s.as_ref()))
                .filter(|s| !s.is_empty()),
        );

        Self { slugs }
    }

    /// Checks an already-normalized slug.
    pub fn contains(&self, slug: &str) -> bool {
        self.slugs.contains(slug)
    }

    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }
}

impl Default for ReservedSlugs {
    fn default() -> Self {
        Self::new(std::iter::empty::<&str>())
    }
}
