//! Application error type and its HTTP mapping.
//!
//! Every non-redirect response uses the `{ "success": false, "error": { ... } }` envelope.
//! Not-found outcomes (unknown, reserved or soft-deleted slugs) share a single variant so
//! callers cannot tell them apart.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    success: bool,
    error: ErrorInfo,
}

#[derive(Serialize)]
struct ErrorInfo {
    code: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Value::is_null")]
    details: Value,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Gone { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Unavailable { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn gone(message: impl Into<String>) -> Self {
        Self::Gone {
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
            details: Value::Null,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            details: Value::Null,
        }
    }

    /// Machine-readable error code, also used as the metrics outcome label.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Gone { .. } => "gone",
            AppError::Conflict { .. } => "conflict",
            AppError::Unavailable { .. } => "unavailable",
            AppError::Internal { .. } => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Gone { .. } => StatusCode::GONE,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::Unavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns true for dependency failures that may succeed on a later attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, AppError::Unavailable { .. })
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match self {
            AppError::Validation { message, details }
            | AppError::NotFound { message, details }
            | AppError::Gone { message, details }
            | AppError::Conflict { message, details }
            | AppError::Unavailable { message, details }
            | AppError::Internal { message, details } => (message, details),
        };

        let body = ErrorBody {
            success: false,
            error: ErrorInfo {
                code,
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        map_sqlx_error(e)
    }
}

/// SQLSTATE codes for serialization failure and deadlock; both clear on retry.
const RETRYABLE_SQLSTATES: [&str; 2] = ["40001", "40P01"];

pub fn map_sqlx_error(e: sqlx::Error) -> AppError {
    if let Some(db) = e.as_database_error() {
        if db.is_unique_violation() {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }
        // The referenced row was deleted between lookup and write.
        if db.is_foreign_key_violation() {
            return AppError::not_found("Referenced row no longer exists");
        }
        if db
            .code()
            .is_some_and(|code| RETRYABLE_SQLSTATES.contains(&&*code))
        {
            tracing::warn!("Database conflict, retryable: {}", db);
            return AppError::unavailable("Service temporarily unavailable");
        }
    }

    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            tracing::error!("Database unavailable: {}", e);
            AppError::unavailable("Service temporarily unavailable")
        }
        other => {
            tracing::error!("Database error: {}", other);
            AppError::internal("Database error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(error: AppError) -> (StatusCode, Value) {
        let response = error.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_not_found_envelope() {
        let (status, json) = body_json(AppError::not_found("Link not found")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"]["code"], "not_found");
        assert_eq!(json["error"]["message"], "Link not found");
        assert!(json["error"].get("details").is_none());
    }

    #[tokio::test]
    async fn test_gone_maps_to_410() {
        let (status, json) = body_json(AppError::gone("This link has expired")).await;

        assert_eq!(status, StatusCode::GONE);
        assert_eq!(json["error"]["code"], "gone");
    }

    #[tokio::test]
    async fn test_conflict_keeps_details() {
        let error = AppError::conflict("Unique constraint violation", json!({ "constraint": "x" }));
        let (status, json) = body_json(error).await;

        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["error"]["details"]["constraint"], "x");
    }

    #[test]
    fn test_transient_classification() {
        assert!(AppError::unavailable("down").is_transient());
        assert!(!AppError::internal("boom").is_transient());
        assert!(!AppError::not_found("nope").is_transient());
        assert!(!AppError::bad_request("bad").is_transient());
    }

    #[test]
    fn test_pool_timeout_is_unavailable() {
        let error = map_sqlx_error(sqlx::Error::PoolTimedOut);
        assert_eq!(error.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
