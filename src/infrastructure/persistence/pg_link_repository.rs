//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Link, LinkType};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Column list shared by every link query. `link_type` is read as text so the enum
/// does not need a custom sqlx type.
const LINK_COLUMNS: &str = r#"
    id, owner_id, link_type::text AS link_type, slug, original_url,
    title, notes, og_title, og_description, og_image, favicon_url,
    is_active, is_deleted, deleted_at, clicks, last_clicked_at,
    click_tracking_enabled, expires_at, expired_redirect_url,
    created_at, updated_at
"#;

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: Uuid,
    owner_id: Uuid,
    link_type: String,
    slug: Option<String>,
    original_url: String,
    title: Option<String>,
    notes: Option<String>,
    og_title: Option<String>,
    og_description: Option<String>,
    og_image: Option<String>,
    favicon_url: Option<String>,
    is_active: bool,
    is_deleted: bool,
    deleted_at: Option<DateTime<Utc>>,
    clicks: i64,
    last_clicked_at: Option<DateTime<Utc>>,
    click_tracking_enabled: bool,
    expires_at: Option<DateTime<Utc>>,
    expired_redirect_url: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for Link {
    fn from(r: LinkRow) -> Self {
        Link {
            id: r.id,
            owner_id: r.owner_id,
            link_type: LinkType::from_db(&r.link_type),
            slug: r.slug,
            original_url: r.original_url,
            title: r.title,
            notes: r.notes,
            og_title: r.og_title,
            og_description: r.og_description,
            og_image: r.og_image,
            favicon_url: r.favicon_url,
            is_active: r.is_active,
            is_deleted: r.is_deleted,
            deleted_at: r.deleted_at,
            clicks: r.clicks,
            last_clicked_at: r.last_clicked_at,
            click_tracking_enabled: r.click_tracking_enabled,
            expires_at: r.expires_at,
            expired_redirect_url: r.expired_redirect_url,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// PostgreSQL repository for link lookups and the click counter.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_by_slug(
        &self,
        slug: &str,
        only_shortened: bool,
    ) -> Result<Option<Link>, AppError> {
        // A deleted row may still hold the slug next to its live replacement.
        let sql = format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE slug = $1
              AND ($2::boolean = FALSE OR link_type = 'shortened')
            ORDER BY is_deleted ASC, created_at DESC
            LIMIT 1
            "#
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(slug)
            .bind(only_shortened)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Link>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE id = $1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Link::from))
    }

    async fn find_id_by_slug(&self, slug: &str) -> Result<Option<Uuid>, AppError> {
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM links
            WHERE slug = $1 AND link_type = 'shortened' AND NOT is_deleted
            LIMIT 1
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(id)
    }

    async fn increment_clicks(
        &self,
        id: Uuid,
        clicked_at: DateTime<Utc>,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE links
            SET clicks = clicks + 1,
                last_clicked_at = GREATEST(last_clicked_at, $2)
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(clicked_at)
        .execute(self.pool.as_ref())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
