//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};
use std::time::Duration;
use tokio::time::timeout;

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

const CHECK_TIMEOUT: Duration = Duration::from_secs(2);

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: `healthy`, or `degraded` when only the cache is down (redirects
///   still work from the store)
/// - **503 Service Unavailable**: `unhealthy`, the database or the click queue failed
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "database": { "status": "ok", "message": "Connected" },
///     "click_queue": { "status": "ok", "message": "Queued: 0/10000" },
///     "cache": { "status": "ok", "message": "Redis connected" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let db_check = check_database(&state).await;

    let queue_check = check_click_queue(&state);

    let cache_check = check_cache(&state).await;

    let unhealthy = db_check.is_error() || queue_check.is_error();
    let status = if unhealthy {
        "unhealthy"
    } else if cache_check.is_error() {
        "degraded"
    } else {
        "healthy"
    };

    let response = HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database: db_check,
            click_queue: queue_check,
            cache: cache_check,
        },
    };

    if unhealthy {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    } else {
        Ok(Json(response))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match timeout(CHECK_TIMEOUT, state.link_repository.ping()).await {
        Ok(Ok(())) => CheckStatus::ok("Connected"),
        Ok(Err(e)) => CheckStatus::error(format!("Database error: {}", e)),
        Err(_) => CheckStatus::error("Database ping timed out"),
    }
}

fn check_click_queue(state: &AppState) -> CheckStatus {
    let recorder = &state.click_recorder;

    if recorder.is_closed() {
        CheckStatus::error("Click queue is closed")
    } else {
        let max = recorder.max_capacity();
        CheckStatus::ok(format!(
            "Queued: {}/{}",
            max - recorder.capacity(),
            max
        ))
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    if !state.cache.is_enabled() {
        return CheckStatus::disabled("Caching disabled");
    }

    match timeout(CHECK_TIMEOUT, state.cache.health_check()).await {
        Ok(true) => CheckStatus::ok("Redis connected"),
        Ok(false) => CheckStatus::error("Redis connection failed"),
        Err(_) => CheckStatus::error("Redis ping timed out"),
    }
}
