//! Utility functions for slug handling, URL safety and request metadata.
//!
//! - [`slug`] - Slug normalization, validation and the reserved set
//! - [`url_safety`] - Redirect target scheme allow-list
//! - [`client_info`] - Client IP, country and referrer extraction, IP hashing
//! - [`user_agent`] - Device, browser and OS classification

pub mod client_info;
pub mod slug;
pub mod url_safety;
pub mod user_agent;
