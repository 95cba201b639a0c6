//! CLI administration tool for the Savlink redirect service.
//!
//! Operates directly on the database and cache, without going through HTTP.
//!
//! # Usage
//!
//! ```bash
//! # Evict or re-warm a cached slug
//! cargo run --bin admin -- cache invalidate abc123
//! cargo run --bin admin -- cache warm abc123
//!
//! # Delete click events older than 180 days
//! cargo run --bin admin -- clicks cleanup --days 180
//!
//! # Inspect a link and its recent traffic
//! cargo run --bin admin -- links show abc123 --days 7
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `DATABASE_URL` (or `DB_*`) is required, `REDIS_URL` is needed
//! for the cache commands.

use savlink::application::services::{RedirectService, RedirectSettings};
use savlink::config::{Config, load_from_env};
use savlink::domain::click_worker::ClickRecorder;
use savlink::domain::repositories::{ClickRepository, LinkRepository};
use savlink::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use savlink::server::{connect_cache, connect_database};

use anyhow::{Context, Result, bail};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for operating the Savlink redirect service.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Redirect cache maintenance
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Click event maintenance
    Clicks {
        #[command(subcommand)]
        action: ClicksAction,
    },

    /// Link inspection
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Remove a slug from the cache
    Invalidate { slug: String },

    /// Load a slug from the database into the cache
    Warm { slug: String },
}

#[derive(Subcommand)]
enum ClicksAction {
    /// Delete click events older than the retention window
    Cleanup {
        /// Retention window in days
        #[arg(short, long, default_value_t = 365)]
        days: u32,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum LinksAction {
    /// Show a link's state and click summary
    Show {
        slug: String,

        /// Summary window in days
        #[arg(short, long, default_value_t = 30)]
        days: u32,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_from_env()?;
    let pool = connect_database(&config).await?;

    match cli.command {
        Commands::Cache { action } => handle_cache_action(action, &config, &pool).await?,
        Commands::Clicks { action } => handle_clicks_action(action, &pool).await?,
        Commands::Links { action } => handle_links_action(action, &config, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Runs cache hooks through the same service the server uses.
async fn handle_cache_action(action: CacheAction, config: &Config, pool: &PgPool) -> Result<()> {
    if !config.is_cache_enabled() {
        bail!("REDIS_URL is not configured, nothing to do");
    }

    let cache = connect_cache(config).await;
    if !cache.is_enabled() {
        bail!("Redis is unreachable");
    }

    let links: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    // Cache maintenance never records clicks; the receiver is dropped on purpose.
    let (recorder, _) = ClickRecorder::channel(1);
    let service = RedirectService::new(
        links,
        cache,
        recorder,
        RedirectSettings::from_config(config),
    );

    match action {
        CacheAction::Invalidate { slug } => {
            service
                .invalidate_cache(&slug)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to invalidate {}: {}", slug, e))?;

            println!("{} {}", "✅ Evicted".green().bold(), slug.cyan());
        }
        CacheAction::Warm { slug } => {
            let cached = service
                .refresh_cache(&slug)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to warm {}: {}", slug, e))?;

            if cached {
                println!("{} {}", "✅ Cached".green().bold(), slug.cyan());
            } else {
                println!(
                    "{} {} {}",
                    "⚠️  No live link for".yellow(),
                    slug.cyan(),
                    "(cache entry evicted)".bright_black()
                );
            }
        }
    }

    Ok(())
}

/// Retention sweep with confirmation.
async fn handle_clicks_action(action: ClicksAction, pool: &PgPool) -> Result<()> {
    let repo = PgClickRepository::new(Arc::new(pool.clone()));

    match action {
        ClicksAction::Cleanup { days, yes } => {
            if days == 0 {
                bail!("--days must be at least 1");
            }

            let cutoff = Utc::now() - Duration::days(i64::from(days));

            println!("{}", "🧹 Click retention sweep".bright_blue().bold());
            println!(
                "  Deleting click events before {}",
                cutoff.format("%Y-%m-%d %H:%M UTC").to_string().cyan()
            );
            println!();

            if !yes {
                let confirmed = Confirm::new()
                    .with_prompt("Delete these click events?")
                    .default(false)
                    .interact()?;

                if !confirmed {
                    println!("{}", "❌ Cancelled".red());
                    return Ok(());
                }
            }

            let deleted = repo
                .delete_older_than(cutoff)
                .await
                .map_err(|e| anyhow::anyhow!("Cleanup failed: {}", e))?;

            println!(
                "{} {} click events",
                "✅ Deleted".green().bold(),
                deleted.to_string().bright_white().bold()
            );
        }
    }

    Ok(())
}

/// Prints link state, counters and a click breakdown.
async fn handle_links_action(action: LinksAction, config: &Config, pool: &PgPool) -> Result<()> {
    let pool = Arc::new(pool.clone());
    let links = PgLinkRepository::new(pool.clone());
    let clicks = PgClickRepository::new(pool);

    match action {
        LinksAction::Show { slug, days } => {
            let slug = slug.trim().to_lowercase();

            let link = links
                .find_by_slug(&slug, false)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {}", e))?
                .context("Link not found")?;

            let status = if link.is_deleted {
                "DELETED".red()
            } else if !link.is_active {
                "DISABLED".yellow()
            } else if link.is_expired() {
                "EXPIRED".yellow()
            } else {
                "LIVE".green()
            };

            println!("{}", "🔗 Link".bright_blue().bold());
            println!();
            println!("  Slug:        {}", slug.cyan());
            println!("  Type:        {}", link.link_type.as_str());
            println!("  Status:      {}", status);
            println!("  Destination: {}", link.original_url);
            if let Some(short_url) = link.short_url(&config.public_base_url) {
                println!("  Short URL:   {}", short_url.bright_white());
            }
            if let Some(expires_at) = link.expires_at {
                println!("  Expires:     {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
            }
            if let Some(fallback) = &link.expired_redirect_url {
                println!("  Fallback:    {}", fallback);
            }
            println!(
                "  Tracking:    {}",
                if link.click_tracking_enabled {
                    "enabled".green()
                } else {
                    "disabled".bright_black()
                }
            );
            println!(
                "  Clicks:      {}",
                link.clicks.to_string().bright_green().bold()
            );
            if let Some(last) = link.last_clicked_at {
                println!("  Last click:  {}", last.format("%Y-%m-%d %H:%M UTC"));
            }
            println!();

            let since = Utc::now() - Duration::days(i64::from(days));
            let summary = clicks
                .summary_for_link(link.id, since, 5)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

            println!(
                "{} {}",
                "📊 Tracked clicks, last".bright_blue().bold(),
                format!("{} days: {}", days, summary.total_in_period).bright_white()
            );
            print_breakdown("Referrers", &summary.top_referrers);
            print_breakdown("Devices", &summary.devices);
            print_breakdown("Countries", &summary.countries);
            print_breakdown("Browsers", &summary.browsers);

            if !summary.daily.is_empty() {
                println!();
                println!("  {}", "Per day".bright_white().bold());
                for (day, count) in &summary.daily {
                    println!("    {}  {}", day.format("%Y-%m-%d"), count.to_string().bright_green());
                }
            }

            let recent = clicks
                .recent_clicks(link.id, 5)
                .await
                .map_err(|e| anyhow::anyhow!("Database error: {}", e))?;

            if !recent.is_empty() {
                println!();
                println!("  {}", "Recent".bright_white().bold());
                for click in recent {
                    println!(
                        "    {}  {:<8} {:<12} {}",
                        click.clicked_at.format("%Y-%m-%d %H:%M").to_string().bright_black(),
                        click.device_type.unwrap_or_else(|| "-".to_string()),
                        click.browser.unwrap_or_else(|| "-".to_string()),
                        click.referrer_domain.unwrap_or_default()
                    );
                }
            }
            println!();
        }
    }

    Ok(())
}

fn print_breakdown(label: &str, rows: &[(String, i64)]) {
    if rows.is_empty() {
        return;
    }

    println!();
    println!("  {}", label.bright_white().bold());
    for (value, count) in rows {
        println!("    {:<30} {}", value, count.to_string().bright_green());
    }
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
                .fetch_one(pool)
                .await
                .context("links table missing, has the server run its migrations?")?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());
            println!("  Links:      {}", links.to_string().bright_green());
        }
    }

    Ok(())
}
