//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::StorefrontConfig;
use crate::services::capture::CaptureRegistry;
use crate::services::preview::PreviewCache;
use crate::services::visitors::VisitorStore;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// catalog, visitor state, the preview cache and the capture registry.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    visitors: VisitorStore,
    previews: PreviewCache,
    captures: CaptureRegistry,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `catalog` - Product catalog to serve
    #[must_use]
    pub fn new(config: StorefrontConfig, catalog: Catalog) -> Self {
        let previews = PreviewCache::new(config.preview_cache_capacity);
        let visitors = VisitorStore::new(config.visitor_capacity);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                visitors,
                previews,
                captures: CaptureRegistry::new(),
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Carts and designs by visitor ID.
    #[must_use]
    pub fn visitors(&self) -> &VisitorStore {
        &self.inner.visitors
    }

    /// Rendered product preview cache.
    #[must_use]
    pub fn previews(&self) -> &PreviewCache {
        &self.inner.previews
    }

    /// Visitors with a design export in flight.
    #[must_use]
    pub fn captures(&self) -> &CaptureRegistry {
        &self.inner.captures
    }
}
