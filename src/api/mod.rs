//! HTTP layer: handlers, response DTOs and middleware.
//!
//! # Modules
//!
//! - [`dto`] - JSON response shapes
//! - [`handlers`] - Redirect, preview and health handlers
//! - [`middleware`] - Tracing and rate limiting layers

pub mod dto;
pub mod handlers;
pub mod middleware;
