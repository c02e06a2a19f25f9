//! Business logic services for the storefront.
//!
//! # Services
//!
//! - [`render`] - Rasterizers for the 2D plan and 3D scenes, PNG encoding
//! - [`capture`] - Per-visitor design export with a single-flight guard
//! - [`preview`] - Cached 3D product preview images
//! - [`visitors`] - Per-visitor cart and design behind a per-visitor lock

pub mod capture;
pub mod preview;
pub mod render;
pub mod visitors;
