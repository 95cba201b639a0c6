//! Repository trait for click events.

use crate::domain::entities::{Click, NewClick};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// Aggregated click analytics for one link over a period.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickSummary {
    /// Tracked click events in the period (untracked clicks only show in `Link::clicks`).
    pub total_in_period: i64,
    /// Referrer domains with counts, most frequent first.
    pub top_referrers: Vec<(String, i64)>,
    /// Device classes with counts, most frequent first.
    pub devices: Vec<(String, i64)>,
    /// Country codes with counts, most frequent first.
    pub countries: Vec<(String, i64)>,
    /// Browser families with counts, most frequent first.
    pub browsers: Vec<(String, i64)>,
    /// Tracked clicks per UTC day, oldest first. Days without clicks are omitted.
    pub daily: Vec<(NaiveDate, i64)>,
}

/// Repository interface for click event persistence and retention.
///
/// The click recorder is the only writer of click events.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgClickRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Persists a click event and bumps the owning link's counter in one transaction.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors; nothing is written in that case.
    async fn record_click(&self, new_click: NewClick) -> Result<(), AppError>;

    /// Most recent click events for a link.
    async fn recent_clicks(&self, link_id: Uuid, limit: i64) -> Result<Vec<Click>, AppError>;

    /// Aggregates tracked clicks for a link since `since`.
    async fn summary_for_link(
        &self,
        link_id: Uuid,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<ClickSummary, AppError>;

    /// Retention sweep: deletes click events older than `cutoff`.
    ///
    /// Returns the number of deleted rows.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError>;
}
