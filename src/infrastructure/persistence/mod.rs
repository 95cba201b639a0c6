//! PostgreSQL repository implementations.
//!
//! Concrete implementations of domain repository traits using SQLx runtime-checked
//! queries with `FromRow` row types.
//!
//! # Repositories
//!
//! - [`PgLinkRepository`] - Slug lookups and the atomic click counter
//! - [`PgClickRepository`] - Click events, analytics and retention

pub mod pg_click_repository;
pub mod pg_link_repository;

pub use pg_click_repository::PgClickRepository;
pub use pg_link_repository::PgLinkRepository;
