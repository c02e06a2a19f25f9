//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use elegant_haven_core::{Dimensions, FurnitureKind, HexColor, Product, ProductId};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CspNonce;
use crate::state::AppState;

/// Colors offered for the 3D preview on the product page.
pub const PREVIEW_SWATCHES: [(&str, HexColor); 6] = [
    ("Slate", HexColor::FURNITURE_DEFAULT),
    ("Walnut", HexColor::WOOD),
    ("Brass", HexColor::GOLD),
    ("Sage", HexColor::from_rgb(0x8a, 0x9a, 0x7b)),
    ("Terracotta", HexColor::from_rgb(0xc2, 0x6a, 0x4a)),
    ("Ivory", HexColor::from_rgb(0xf1, 0xea, 0xdc)),
];

// =============================================================================
// Views
// =============================================================================

/// Product card data for listing grids.
#[derive(Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    pub category: &'static str,
    pub price: String,
    pub old_price: Option<String>,
    pub image: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            category: product.category.label(),
            price: product.price.to_string(),
            old_price: product
                .on_sale()
                .then(|| product.old_price.map(|p| p.to_string()))
                .flatten(),
            image: product.image.clone(),
        }
    }
}

/// A selectable preview color.
#[derive(Clone)]
pub struct SwatchView {
    pub name: &'static str,
    pub hex: String,
    pub url: String,
    pub active: bool,
}

/// Product detail data for templates.
#[derive(Clone)]
pub struct ProductDetail {
    pub card: ProductCard,
    pub description: String,
    pub dimensions: Option<Dimensions>,
    pub materials: Option<String>,
    pub details: Option<String>,
    pub model: &'static str,
    pub preview_url: String,
    pub download_url: String,
    pub swatches: Vec<SwatchView>,
}

impl ProductDetail {
    fn new(product: &Product, color: HexColor) -> Self {
        let kind = FurnitureKind::for_product(product.category, &product.name);
        let preview_url = preview_url(&product.id, color);

        Self {
            card: ProductCard::from(product),
            description: product.description.clone(),
            dimensions: product.dimensions.clone(),
            materials: product.materials.clone(),
            details: product.details.clone(),
            model: kind.label(),
            download_url: format!("{preview_url}&download=1"),
            preview_url,
            swatches: PREVIEW_SWATCHES
                .iter()
                .map(|&(name, swatch)| SwatchView {
                    name,
                    hex: swatch.to_string(),
                    url: format!("/products/{}?color={}", product.id, encode_color(swatch)),
                    active: swatch == color,
                })
                .collect(),
        }
    }
}

/// `#rrggbb` with the hash percent-encoded for use in a query string.
fn encode_color(color: HexColor) -> String {
    color.to_string().replacen('#', "%23", 1)
}

fn preview_url(id: &ProductId, color: HexColor) -> String {
    format!("/products/{id}/preview.png?color={}", encode_color(color))
}

// =============================================================================
// Templates
// =============================================================================

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub products: Vec<ProductCard>,
    pub nonce: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductDetail,
    pub related_products: Vec<ProductCard>,
    pub nonce: String,
}

/// Missing product page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub requested: String,
    pub nonce: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Preview color query parameter.
#[derive(Debug, Deserialize)]
pub struct ColorQuery {
    pub color: Option<String>,
}

/// Preview image query parameters.
#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub color: Option<String>,
    pub download: Option<String>,
}

/// Display product listing page.
#[instrument(skip(state, nonce))]
pub async fn index(State(state): State<AppState>, CspNonce(nonce): CspNonce) -> impl IntoResponse {
    ProductsIndexTemplate {
        products: state.catalog().all().iter().map(ProductCard::from).collect(),
        nonce,
    }
}

/// Display product detail page, or the not-found page with a 404.
///
/// An unparseable `?color=` falls back to the default preview color.
#[instrument(skip(state, nonce))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ColorQuery>,
    CspNonce(nonce): CspNonce,
) -> Response {
    let Some(product) = state.catalog().find(&ProductId::new(id.as_str())) else {
        tracing::debug!(product = %id, "Product not found");
        return (
            StatusCode::NOT_FOUND,
            ProductNotFoundTemplate {
                requested: id,
                nonce,
            },
        )
            .into_response();
    };

    let color = query
        .color
        .as_deref()
        .and_then(|c| HexColor::parse(c).ok())
        .unwrap_or(HexColor::FURNITURE_DEFAULT);

    ProductShowTemplate {
        product: ProductDetail::new(product, color),
        related_products: state
            .catalog()
            .related(product)
            .into_iter()
            .map(ProductCard::from)
            .collect(),
        nonce,
    }
    .into_response()
}

/// Rendered 3D preview of a product's furniture model.
///
/// `?color=#rrggbb` recolors the model; `?download=1` serves it as an
/// attachment.
#[instrument(skip(state))]
pub async fn preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<PreviewQuery>,
) -> Result<Response> {
    let product = state
        .catalog()
        .find(&ProductId::new(id.as_str()))
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let color = query
        .color
        .as_deref()
        .map(HexColor::parse)
        .transpose()?
        .unwrap_or(HexColor::FURNITURE_DEFAULT);
    let kind = FurnitureKind::for_product(product.category, &product.name);

    let png = state
        .previews()
        .get_or_render(&product.id, kind, color)
        .await
        .map_err(|e| AppError::Internal(format!("preview render failed: {e}")))?;

    let body = png.as_ref().clone();
    if query.download.as_deref() == Some("1") {
        let filename = format!(
            "{}-3d-view-{}.png",
            product.name.replace('"', ""),
            chrono::Utc::now().timestamp_millis()
        );
        return Ok((
            [
                (header::CONTENT_TYPE, "image/png".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            body,
        )
            .into_response());
    }

    Ok(([(header::CONTENT_TYPE, "image/png")], body).into_response())
}
