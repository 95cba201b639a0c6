//! Application layer services implementing business logic.
//!
//! Services consume repository and cache traits and give HTTP handlers and the
//! click worker a narrow API.
//!
//! # Available Services
//!
//! - [`services::redirect_service::RedirectService`] - Slug resolution, preview and cache hooks
//! - [`services::click_service::ClickService`] - Click enrichment and persistence

pub mod services;
