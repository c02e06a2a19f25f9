//! Core types for ElegantHaven.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod color;
pub mod id;
pub mod price;
pub mod product;

pub use color::{ColorError, HexColor};
pub use id::*;
pub use price::Price;
pub use product::{Category, Dimensions, Product};
