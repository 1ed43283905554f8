//! Application state.
//!
//! Shared state for all request handlers.

use std::sync::Arc;

use folio_cache::PageCache;
use folio_renderer::Template;

use crate::dispatch::Dispatcher;

/// Application state shared across all handlers.
pub(crate) struct AppState {
    /// Seeded page cache.
    pub(crate) cache: Arc<PageCache>,
    /// Page template.
    pub(crate) template: Template,
    /// Request path resolver.
    pub(crate) dispatcher: Dispatcher,
    /// Application version (mixed into `ETag`s).
    pub(crate) version: String,
}
