//! Session-scoped models for the storefront.
//!
//! The session only identifies the visitor; see [`session`] for the key and
//! accessors. The cart and design are kept in
//! [`VisitorStore`](crate::services::visitors::VisitorStore).

pub mod session;

pub use session::{existing_visitor_id, visitor_id};
