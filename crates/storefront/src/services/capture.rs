//! Design capture and PNG export.
//!
//! A capture renders the visitor's design (plan or perspective view) on the
//! blocking pool and encodes it as PNG. Only one capture per visitor may be in
//! flight; [`CaptureRegistry::try_begin`] hands out a guard that releases the
//! slot when dropped, whether the render succeeded or not.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use elegant_haven_core::Design;
use elegant_haven_core::canvas::scene::Scene;
use serde::Deserialize;
use tracing::instrument;

use super::render::{
    FRAME_HEIGHT, FRAME_WIDTH, RenderError, encode_png, render_plan, render_scene,
};

/// Which view of the design to capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum CaptureView {
    /// Top-down 2D canvas.
    #[default]
    #[serde(rename = "2d")]
    Plan,
    /// 3D room from the design camera.
    #[serde(rename = "3d")]
    Perspective,
}

impl CaptureView {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Plan => "2d",
            Self::Perspective => "3d",
        }
    }
}

/// Download filename for an export taken at `unix_millis`.
#[must_use]
pub fn export_filename(view: CaptureView, unix_millis: i64) -> String {
    format!("furniture-design-{}-{unix_millis}.png", view.as_str())
}

/// Render a design to PNG bytes. CPU-bound; call from a blocking context.
///
/// # Errors
///
/// Returns an error if the background image is corrupt or encoding fails.
pub fn render_png(design: &Design, view: CaptureView) -> Result<Vec<u8>, RenderError> {
    let frame = match view {
        CaptureView::Plan => render_plan(design)?,
        CaptureView::Perspective => {
            let scene = Scene::for_design(design, FRAME_WIDTH as f32 / FRAME_HEIGHT as f32);
            render_scene(&scene, FRAME_WIDTH, FRAME_HEIGHT)?
        }
    };
    encode_png(&frame)
}

/// Render a design on the blocking pool.
///
/// # Errors
///
/// Returns an error if rendering fails or the blocking task panics.
#[instrument(skip(design), fields(items = design.items().len()))]
pub async fn capture(design: Design, view: CaptureView) -> Result<Vec<u8>, RenderError> {
    tokio::task::spawn_blocking(move || render_png(&design, view)).await?
}

/// Visitors with a capture in flight.
#[derive(Debug, Clone, Default)]
pub struct CaptureRegistry {
    in_flight: Arc<Mutex<HashSet<String>>>,
}

impl CaptureRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the capture slot for `visitor`. Returns `None` if a capture for
    /// the same visitor is already running.
    #[must_use]
    pub fn try_begin(&self, visitor: &str) -> Option<CaptureGuard> {
        let claimed = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(visitor.to_string());

        claimed.then(|| CaptureGuard {
            registry: self.clone(),
            visitor: visitor.to_string(),
        })
    }

    #[must_use]
    pub fn is_capturing(&self, visitor: &str) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(visitor)
    }
}

/// Holds a visitor's capture slot until dropped.
#[derive(Debug)]
pub struct CaptureGuard {
    registry: CaptureRegistry,
    visitor: String,
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        self.registry
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.visitor);
    }
}
