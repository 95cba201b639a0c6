//! Success envelope shared by JSON endpoints.

use serde::Serialize;

/// `{ "success": true, "data": ... }`
///
/// Errors use the matching `{ "success": false, "error": ... }` envelope produced by
/// [`crate::error::AppError`].
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
