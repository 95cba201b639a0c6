//! Business logic services for the application layer.

pub mod click_service;
pub mod redirect_service;

pub use click_service::{ClickOutcome, ClickService};
pub use redirect_service::{RedirectService, RedirectSettings};
