//! HTTP request handlers.

pub mod health;
pub mod preview;
pub mod redirect;

pub use health::health_handler;
pub use preview::preview_handler;
pub use redirect::redirect_handler;
