//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use elegant_haven_core::FurnitureKind;
use tracing::instrument;

use super::products::ProductCard;
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    /// Products flagged as featured in the catalog.
    pub featured: Vec<ProductCard>,
    /// Furniture types the room designer offers.
    pub designer_kinds: Vec<&'static str>,
    pub nonce: String,
}

/// Display the home page.
#[instrument(skip(state, nonce))]
pub async fn home(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> impl IntoResponse {
    HomeTemplate {
        featured: state.catalog().featured().map(ProductCard::from).collect(),
        designer_kinds: FurnitureKind::ALL.iter().map(FurnitureKind::label).collect(),
        nonce,
    }
}
