//! Top-level router configuration.
//!
//! # Route Structure
//!
//! - `GET /health`         - Health check: DB, cache, click queue
//! - `GET /{slug}`         - Short link redirect (302)
//! - `GET /{slug}/preview` - Public link metadata (rate limited)
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Rate limiting** - Per-IP token bucket on the preview route
//! - **Path normalization** - Trailing slash trimming

use crate::api::handlers::{health_handler, preview_handler, redirect_handler};
use crate::api::middleware::{rate_limit, tracing};
use crate::state::AppState;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Routes and middleware without path normalization.
///
/// `behind_proxy` selects the rate-limit key: forwarding headers when `true`, the
/// socket peer address otherwise.
pub fn router(state: AppState, behind_proxy: bool) -> Router {
    let preview = Router::new().route("/{slug}/preview", get(preview_handler));
    let preview = if behind_proxy {
        preview.layer(rate_limit::proxied_layer())
    } else {
        preview.layer(rate_limit::layer())
    };

    Router::new()
        .route("/health", get(health_handler))
        .route("/{slug}", get(redirect_handler))
        .merge(preview)
        .with_state(state)
        .layer(tracing::layer())
}

/// Constructs the application router with all routes and middleware.
///
/// Normalization wraps the router so `/abc123/` reaches the `/{slug}` route.
pub fn app_router(state: AppState, behind_proxy: bool) -> NormalizePath<Router> {
    NormalizePathLayer::trim_trailing_slash().layer(router(state, behind_proxy))
}
