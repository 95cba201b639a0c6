//! Repository trait for link data access on the redirect path.

use crate::domain::entities::Link;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Read access to links plus the one mutation the redirect path is allowed to make:
/// the atomic click counter increment.
///
/// Link creation and editing belong to the surrounding application.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Finds a link by slug.
    ///
    /// When `only_shortened` is true, saved (non-shortened) links are ignored.
    /// If a soft-deleted link and a live link share the slug, the live one wins.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on database errors.
    async fn find_by_slug(&self, slug: &str, only_shortened: bool)
    -> Result<Option<Link>, AppError>;

    /// Finds a link by id, deleted or not.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Link>, AppError>;

    /// Resolves the id owning a slug without loading the full row.
    ///
    /// Used on cache hits, where the snapshot carries no durable id.
    async fn find_id_by_slug(&self, slug: &str) -> Result<Option<Uuid>, AppError>;

    /// Atomically increments the click counter and advances `last_clicked_at`.
    ///
    /// Implemented as a single `UPDATE ... SET clicks = clicks + 1` so concurrent
    /// clicks never lose updates.
    ///
    /// Returns `Ok(false)` when the link no longer exists.
    async fn increment_clicks(&self, id: Uuid, clicked_at: DateTime<Utc>)
    -> Result<bool, AppError>;

    /// Connectivity check used by the health endpoint.
    async fn ping(&self) -> Result<(), AppError>;
}
