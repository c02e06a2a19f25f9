//! Cart route handlers.
//!
//! Cart operations use HTMX-style fragment swaps for dynamic updates without
//! full page reloads. Requests carrying `HX-Request` get a fragment and an
//! `HX-Trigger: cart-updated` header; plain form posts are redirected back to
//! the cart page. The cart is kept per visitor in
//! [`VisitorStore`](crate::services::visitors::VisitorStore); writes hold the
//! visitor's lock from read to update.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use elegant_haven_core::{Cart, CartLine, ProductId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::{existing_visitor_id, visitor_id};
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub product_id: String,
    pub name: String,
    pub category: &'static str,
    pub image: String,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.to_string(),
            name: line.name.clone(),
            category: line.category.label(),
            image: line.image.clone(),
            quantity: line.quantity,
            price: line.price.to_string(),
            line_price: line.line_total().to_string(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub item_count: u32,
    pub subtotal: String,
    pub shipping: String,
    pub free_shipping: bool,
    pub tax: String,
    pub total: String,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        let totals = cart.totals();
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            item_count: cart.item_count(),
            subtotal: totals.subtotal.to_string(),
            shipping: totals.shipping.to_string(),
            free_shipping: totals.free_shipping(),
            tax: totals.tax.to_string(),
            total: totals.total.to_string(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub product_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub product_id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub cart: CartView,
    pub nonce: String,
}

/// Cart items fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

fn is_fragment_request(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Fragment plus trigger for HTMX callers, redirect for plain forms.
fn cart_changed(headers: &HeaderMap, fragment: impl IntoResponse) -> Response {
    if is_fragment_request(headers) {
        (AppendHeaders([("HX-Trigger", "cart-updated")]), fragment).into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Apply `change` to the visitor's cart under its lock.
///
/// A visitor with no ID yet has an empty cart, so nothing is created for
/// them.
async fn change_cart(
    state: &AppState,
    session: &Session,
    change: impl FnOnce(&mut Cart),
) -> Result<CartView> {
    let Some(id) = existing_visitor_id(session).await? else {
        return Ok(CartView::from(&Cart::new()));
    };
    let mut visitor = state.visitors().lock(id).await;
    change(&mut visitor.cart);
    Ok(CartView::from(&visitor.cart))
}

/// Display cart page.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let visitor = existing_visitor_id(&session).await?;
    let cart = state
        .visitors()
        .read(visitor, |v| CartView::from(&v.cart))
        .await;
    Ok(CartShowTemplate { cart, nonce })
}

/// Add item to cart.
///
/// Adding a product already in the cart increases its quantity. Returns the
/// new cart count badge.
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product = state
        .catalog()
        .find(&ProductId::new(form.product_id.as_str()))
        .ok_or_else(|| AppError::NotFound(format!("product {}", form.product_id)))?;

    let id = visitor_id(&session).await?;
    let count = {
        let mut visitor = state.visitors().lock(id).await;
        visitor.cart.add(product, form.quantity.unwrap_or(1));
        visitor.cart.item_count()
    };

    add_breadcrumb("cart", "Added to cart", Some(&[("product", product.id.as_str())]));

    Ok(cart_changed(&headers, CartCountTemplate { count }))
}

/// Update cart item quantity. Quantities below 1 become 1; unknown products
/// are ignored.
#[instrument(skip(state, session, headers))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);
    let cart = change_cart(&state, &session, |cart| {
        cart.update_quantity(&product_id, form.quantity);
    })
    .await?;

    Ok(cart_changed(&headers, CartItemsTemplate { cart }))
}

/// Remove item from cart. Unknown products are ignored.
#[instrument(skip(state, session, headers))]
pub async fn remove(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);
    let cart = change_cart(&state, &session, |cart| {
        cart.remove(&product_id);
    })
    .await?;

    Ok(cart_changed(&headers, CartItemsTemplate { cart }))
}

/// Get cart count badge (HTMX).
#[instrument(skip(state, session))]
pub async fn count(State(state): State<AppState>, session: Session) -> Result<impl IntoResponse> {
    let visitor = existing_visitor_id(&session).await?;
    let count = state.visitors().read(visitor, |v| v.cart.item_count()).await;
    Ok(CartCountTemplate { count })
}

#[cfg(test)]
mod tests {
    use elegant_haven_core::{Category, Price, Product};

    use super::*;

    fn product(id: &str, cents: i64) -> Product {
        Product {
            id: ProductId::new(id),
            name: id.to_string(),
            description: String::new(),
            price: Price::from_cents(cents),
            old_price: None,
            category: Category::Decor,
            image: String::new(),
            featured: false,
            dimensions: None,
            materials: None,
            details: None,
        }
    }

    #[test]
    fn test_cart_view_formats_totals() {
        let mut cart = Cart::new();
        cart.add(&product("lamp", 4500), 2);

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.subtotal, "$90.00");
        assert_eq!(view.shipping, "$10.00");
        assert!(!view.free_shipping);
        assert_eq!(view.tax, "$6.30");
        assert_eq!(view.total, "$106.30");
        assert_eq!(view.items.first().map(|i| i.line_price.as_str()), Some("$90.00"));
    }

    #[test]
    fn test_fragment_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_fragment_request(&headers));
        headers.insert("hx-request", axum::http::HeaderValue::from_static("true"));
        assert!(is_fragment_request(&headers));
    }
}
