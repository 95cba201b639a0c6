//! Data Transfer Objects for JSON responses.

pub mod health;
pub mod preview;
pub mod response;

pub use response::ApiResponse;
