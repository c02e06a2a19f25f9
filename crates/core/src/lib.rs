//! ElegantHaven Core - Domain library for the storefront.
//!
//! This crate holds everything about the shop that does not touch the
//! network: catalog types, the shopping cart, and the room-design canvas
//! with its 3D scene model.
//!
//! # Architecture
//!
//! The core crate contains only types and pure logic - no I/O, no HTTP, no
//! sessions. The storefront crate wires it to axum and renders it.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, colors and catalog products
//! - [`cart`] - Cart lines and order totals
//! - [`canvas`] - Furniture layout, 2D/3D projection, scene graph and picking

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod canvas;
pub mod cart;
pub mod types;

pub use canvas::{CanvasError, CanvasType, Design, FurnitureItem, FurnitureKind};
pub use cart::{Cart, CartLine, CartTotals};
pub use types::*;
