//! Core domain entities.
//!
//! - [`Link`] - A saved or shortened URL owned by a user
//! - [`CachedLink`] - The redirect-relevant snapshot of a link kept in the cache
//! - [`Click`] / [`NewClick`] - A recorded redirect and its insert form

pub mod cached_link;
pub mod click;
pub mod link;

pub use cached_link::CachedLink;
pub use click::{Click, NewClick};
pub use link::{Link, LinkType};
