//! Rendered 3D product previews.
//!
//! Each product maps to one of the furniture models. Previews are rendered on
//! the blocking pool and cached by `(product, color)` with `moka` (10-minute
//! TTL), since the same few colors are requested over and over.

use std::sync::Arc;
use std::time::Duration;

use elegant_haven_core::canvas::scene::Scene;
use elegant_haven_core::{FurnitureKind, HexColor, ProductId};
use moka::future::Cache;
use tracing::{debug, instrument};

use super::render::{FRAME_HEIGHT, FRAME_WIDTH, RenderError, encode_png, render_scene};

/// How long a rendered preview stays cached.
const PREVIEW_TTL: Duration = Duration::from_secs(600);

type PreviewKey = (ProductId, HexColor);

/// Cache of rendered preview PNGs. Cheap to clone.
#[derive(Clone)]
pub struct PreviewCache {
    cache: Cache<PreviewKey, Arc<Vec<u8>>>,
}

impl PreviewCache {
    /// Create a cache holding at most `capacity` previews.
    #[must_use]
    pub fn new(capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(PREVIEW_TTL)
            .build();
        Self { cache }
    }

    /// Return the cached preview or render and cache it.
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or encoding fails.
    #[instrument(skip(self), fields(product = %product, color = %color))]
    pub async fn get_or_render(
        &self,
        product: &ProductId,
        kind: FurnitureKind,
        color: HexColor,
    ) -> Result<Arc<Vec<u8>>, RenderError> {
        let key = (product.clone(), color);
        if let Some(png) = self.cache.get(&key).await {
            debug!("Cache hit for preview");
            return Ok(png);
        }

        let png = tokio::task::spawn_blocking(move || render_preview(kind, color)).await??;
        let png = Arc::new(png);
        self.cache.insert(key, Arc::clone(&png)).await;
        Ok(png)
    }

    /// Number of cached previews (approximate until pending tasks run).
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }

    /// Drop every cached preview.
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}

/// Render one product model in the preview room.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn render_preview(kind: FurnitureKind, color: HexColor) -> Result<Vec<u8>, RenderError> {
    let scene = Scene::for_product(kind, color, FRAME_WIDTH as f32 / FRAME_HEIGHT as f32);
    encode_png(&render_scene(&scene, FRAME_WIDTH, FRAME_HEIGHT)?)
}
