//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated via
//! `mockall` for unit tests.
//!
//! - [`LinkRepository`] - Slug lookups and the atomic click counter
//! - [`ClickRepository`] - Click event persistence, analytics and retention

pub mod click_repository;
pub mod link_repository;

pub use click_repository::{ClickRepository, ClickSummary};
pub use link_repository::LinkRepository;

#[cfg(test)]
pub use click_repository::MockClickRepository;
#[cfg(test)]
pub use link_repository::MockLinkRepository;
