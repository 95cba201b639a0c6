//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::RedirectService;
use crate::domain::click_worker::ClickRecorder;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::CacheService;

/// Cheap to clone: every field is reference-counted or small.
#[derive(Clone)]
pub struct AppState {
    pub redirect_service: Arc<RedirectService>,
    pub link_repository: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
    pub click_recorder: ClickRecorder,
    /// Base for `short_url` in previews, without trailing slash.
    pub public_base_url: Arc<str>,
    /// Trust forwarding and edge-country headers.
    pub behind_proxy: bool,
}
