//! Click entity representing a single recorded redirect.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A click persisted for a link with tracking enabled.
///
/// Never mutated after insertion; removed only by the retention sweep.
#[derive(Debug, Clone)]
pub struct Click {
    pub id: Uuid,
    pub link_id: Uuid,
    pub clicked_at: DateTime<Utc>,
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub referrer_domain: Option<String>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub country_code: Option<String>,
}

/// Enriched click data ready for persistence.
///
/// Built by [`crate::application::services::ClickService`] from the raw request
/// context; contains a one-way hash of the client IP, never the address itself.
#[derive(Debug, Clone, PartialEq)]
pub struct NewClick {
    pub link_id: Uuid,
    pub clicked_at: DateTime<Utc>,
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub referrer_domain: Option<String>,
    pub device_type: Option<String>,
    pub browser: Option<String>,
    pub os: Option<String>,
    pub country_code: Option<String>,
}

impl NewClick {
    /// A click with only the link and timestamp set.
    pub fn bare(link_id: Uuid, clicked_at: DateTime<Utc>) -> Self {
        Self {
            link_id,
            clicked_at,
            ip_hash: None,
            user_agent: None,
            referrer: None,
            referrer_domain: None,
            device_type: None,
            browser: None,
            os: None,
            country_code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_click() {
        let link_id = Uuid::new_v4();
        let now = Utc::now();
        let click = NewClick::bare(link_id, now);

        assert_eq!(click.link_id, link_id);
        assert_eq!(click.clicked_at, now);
        assert!(click.ip_hash.is_none());
        assert!(click.device_type.is_none());
    }
}
