//! Handler for short link redirects.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::net::SocketAddr;
use url::Url;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_info::capture_request_context;

/// Redirects a slug to its destination.
///
/// # Endpoint
///
/// `GET /{slug}`
///
/// # Request Flow
///
/// 1. Capture client metadata (IP, user agent, referrer, edge country)
/// 2. Resolve the slug through the cache, falling back to the store
/// 3. Queue the click for the background worker (never awaited)
/// 4. Return 302 Found
///
/// # Errors
///
/// - 400 for malformed slugs and unsafe stored destinations
/// - 404 for unknown, reserved and deleted slugs
/// - 410 for disabled links and expired links without a fallback
/// - 503 when the store does not answer in time
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<Response, AppError> {
    let context = capture_request_context(&headers, Some(addr), state.behind_proxy);

    let destination = state.redirect_service.resolve(&slug, context).await?;

    found(&destination)
}

/// 302 with the destination as `Location`.
///
/// ASCII destinations are passed through verbatim. Anything else is re-serialized
/// through the URL parser, which percent-encodes it: `Location` must stay ASCII.
fn found(destination: &str) -> Result<Response, AppError> {
    let location = if destination.is_ascii() {
        HeaderValue::from_str(destination).ok()
    } else {
        Url::parse(destination)
            .ok()
            .and_then(|url| HeaderValue::from_str(url.as_str()).ok())
    }
    .ok_or_else(|| AppError::bad_request("Invalid destination"))?;

    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
