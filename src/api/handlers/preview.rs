//! Handler for the public link preview.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::ApiResponse;
use crate::api::dto::preview::PreviewData;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the public metadata of a live short link without redirecting.
///
/// # Endpoint
///
/// `GET /{slug}/preview`
///
/// Reads the store directly, so it never serves stale cache state. Expired links are
/// 410 here even when they have a fallback destination. Does not record a click.
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "data": {
///     "slug": "abc123",
///     "short_url": "https://sav.link/abc123",
///     "original_url": "https://example.com",
///     "title": "Example",
///     "description": null,
///     "og_title": null,
///     "og_description": null,
///     "og_image": null,
///     "favicon_url": null,
///     "clicks": 42,
///     "created_at": "2026-01-01T12:00:00Z"
///   }
/// }
/// ```
pub async fn preview_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<PreviewData>>, AppError> {
    let link = state.redirect_service.preview(&slug).await?;

    Ok(Json(ApiResponse::ok(PreviewData::from_link(
        link,
        &state.public_base_url,
    ))))
}
