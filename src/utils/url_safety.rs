//! Redirect target allow-list.

use url::Url;

/// Schemes a stored destination may use.
const SAFE_SCHEMES: &[&str] = &["http", "https"];

/// Returns true only if `url` parses and its scheme is `http` or `https`.
///
/// Anything else (`javascript:`, `data:`, `file:`, relative paths, garbage) is refused.
/// The scheme comparison is case-insensitive because the parser lower-cases it.
///
/// # Examples
///
/// ```ignore
/// assert!(is_safe_url("https://example.com/a"));
/// assert!(is_safe_url("HTTP://EXAMPLE.COM"));
/// assert!(!is_safe_url("javascript:alert(1)"));
/// ```
pub fn is_safe_url(url: &str) -> bool {
    match Url::parse(url.trim()) {
        Ok(parsed) => SAFE_SCHEMES.contains(&parsed.scheme()),
        Err(_) => false,
    }
}
