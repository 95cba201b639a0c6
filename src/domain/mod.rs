//! Domain layer containing business entities and logic.
//!
//! Entities, repository interfaces and the click queue live here, independent of
//! infrastructure concerns.
//!
//! # Architecture
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`click_event`] - Click tracking event model
//! - [`click_worker`] - Bounded click queue and its dispatcher
//!
//! # Click Processing Flow
//!
//! 1. The redirect resolver serves a 302 and hands a [`click_event::ClickEvent`] to the
//!    [`click_worker::ClickRecorder`]
//! 2. [`click_worker::run_click_worker`] pulls events off the queue
//! 3. A [`click_worker::ClickProcessor`] enriches the event and persists it via
//!    [`repositories::ClickRepository`]

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
