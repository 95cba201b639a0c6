//! PostgreSQL implementation of click repository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::entities::{Click, NewClick};
use crate::domain::repositories::{ClickRepository, ClickSummary};
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct ClickRow {
    id: Uuid,
    link_id: Uuid,
    clicked_at: DateTime<Utc>,
    ip_hash: Option<String>,
    user_agent: Option<String>,
    referrer: Option<String>,
    referrer_domain: Option<String>,
    device_type: Option<String>,
    browser: Option<String>,
    os: Option<String>,
    country_code: Option<String>,
}

impl From<ClickRow> for Click {
    fn from(r: ClickRow) -> Self {
        Click {
            id: r.id,
            link_id: r.link_id,
            clicked_at: r.clicked_at,
            ip_hash: r.ip_hash,
            user_agent: r.user_agent,
            referrer: r.referrer,
            referrer_domain: r.referrer_domain,
            device_type: r.device_type,
            browser: r.browser,
            os: r.os,
            country_code: r.country_code,
        }
    }
}

/// PostgreSQL repository for click events.
pub struct PgClickRepository {
    pool: Arc<PgPool>,
}

impl PgClickRepository {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Counts tracked clicks per value of `column`, most frequent first.
    ///
    /// `column` is always one of a fixed set of identifiers, never user input.
    async fn breakdown(
        &self,
        column: &'static str,
        link_id: Uuid,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<(String, i64)>, AppError> {
        let sql = format!(
            r#"
            SELECT {column} AS value, COUNT(*) AS total
            FROM link_clicks
            WHERE link_id = $1 AND clicked_at >= $2 AND {column} IS NOT NULL
            GROUP BY {column}
            ORDER BY total DESC, value ASC
            LIMIT $3
            "#
        );

        let rows = sqlx::query_as::<_, (String, i64)>(&sql)
            .bind(link_id)
            .bind(since)
            .bind(limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows)
    }

    async fn daily_timeline(
        &self,
        link_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<Vec<(NaiveDate, i64)>, AppError> {
        let rows = sqlx::query_as::<_, (NaiveDate, i64)>(
            r#"
            SELECT (clicked_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS total
            FROM link_clicks
            WHERE link_id = $1 AND clicked_at >= $2
            GROUP BY day
            ORDER BY day ASC
            "#,
        )
        .bind(link_id)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows)
    }
}

#[async_trait]
impl ClickRepository for PgClickRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO link_clicks (
                id, link_id, clicked_at, ip_hash, user_agent, referrer,
                referrer_domain, device_type, browser, os, country_code
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(new_click.link_id)
        .bind(new_click.clicked_at)
        .bind(&new_click.ip_hash)
        .bind(&new_click.user_agent)
        .bind(&new_click.referrer)
        .bind(&new_click.referrer_domain)
        .bind(&new_click.device_type)
        .bind(&new_click.browser)
        .bind(&new_click.os)
        .bind(&new_click.country_code)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            UPDATE links
            SET clicks = clicks + 1,
                last_clicked_at = GREATEST(last_clicked_at, $2)
            WHERE id = $1
            "#,
        )
        .bind(new_click.link_id)
        .bind(new_click.clicked_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn recent_clicks(&self, link_id: Uuid, limit: i64) -> Result<Vec<Click>, AppError> {
        let rows = sqlx::query_as::<_, ClickRow>(
            r#"
            SELECT id, link_id, clicked_at, ip_hash, user_agent, referrer,
                   referrer_domain, device_type, browser, os, TRIM(country_code) AS country_code
            FROM link_clicks
            WHERE link_id = $1
            ORDER BY clicked_at DESC
            LIMIT $2
            "#,
        )
        .bind(link_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Click::from).collect())
    }

    async fn summary_for_link(
        &self,
        link_id: Uuid,
        since: DateTime<Utc>,
        limit: i64,
    ) -> Result<ClickSummary, AppError> {
        let total_in_period = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM link_clicks WHERE link_id = $1 AND clicked_at >= $2",
        )
        .bind(link_id)
        .bind(since)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(ClickSummary {
            total_in_period,
            top_referrers: self.breakdown("referrer_domain", link_id, since, limit).await?,
            devices: self.breakdown("device_type", link_id, since, limit).await?,
            countries: self
                .breakdown("TRIM(country_code)", link_id, since, limit)
                .await?,
            browsers: self.breakdown("browser", link_id, since, limit).await?,
            daily: self.daily_timeline(link_id, since).await?,
        })
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM link_clicks WHERE clicked_at < $1")
            .bind(cutoff)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }
}
