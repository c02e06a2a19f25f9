//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! GET  /health                 - Health check
//!
//! # Products
//! GET  /products               - Product listing
//! GET  /products/:id           - Product detail (?color=#rrggbb)
//! GET  /products/:id/preview.png - Rendered 3D preview (?color, ?download=1)
//!
//! # Cart (HTMX fragments)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart (returns count badge, triggers cart-updated)
//! POST /cart/update            - Update quantity (returns cart_items fragment)
//! POST /cart/remove            - Remove item (returns cart_items fragment)
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Room designer
//! GET  /design                 - Designer page
//! GET  /design/frame.png       - Current design rendered (?view=2d|3d)
//! GET  /design/export.png      - Download the design as PNG (?view=2d|3d)
//!
//! # Room designer API (JSON)
//! GET    /design/api                        - Current design
//! POST   /design/api/settings               - Canvas type and color
//! POST   /design/api/background             - Upload background (multipart)
//! GET    /design/api/background             - Background image bytes
//! DELETE /design/api/background             - Remove background
//! POST   /design/api/furniture              - Add furniture
//! DELETE /design/api/furniture/:id          - Remove furniture
//! POST   /design/api/furniture/:id/position - Move furniture
//! POST   /design/api/furniture/:id/color    - Recolor furniture
//! POST   /design/api/furniture/:id/rotation - Rotate furniture
//! POST   /design/api/select                 - Select or deselect
//! POST   /design/api/drag/start             - Begin a 2D drag
//! POST   /design/api/drag/move              - Continue a 2D drag
//! POST   /design/api/drag/end               - Finish a 2D drag
//! POST   /design/api/pick                   - Select from a 3D pointer
//! POST   /design/api/floor-drag             - Move along the floor from a 3D pointer
//! GET    /design/api/scene                  - 3D scene description
//! ```

pub mod cart;
pub mod design;
pub mod home;
pub mod products;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::middleware::{
    background_rate_limiter, export_rate_limiter, frame_rate_limiter, preview_rate_limiter,
};
use crate::services::render::MAX_BACKGROUND_BYTES;
use crate::state::AppState;

/// Room for multipart boundaries and headers around the image itself.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/{id}", get(products::show))
        .route(
            "/{id}/preview.png",
            get(products::preview).layer(preview_rate_limiter()),
        )
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/count", get(cart::count))
}

/// Create the designer JSON API router.
pub fn design_api_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(design::current))
        .route("/settings", post(design::update_settings))
        .route(
            "/background",
            get(design::background)
                .delete(design::clear_background)
                .merge(post(design::upload_background).layer(background_rate_limiter()))
                .layer(DefaultBodyLimit::max(MAX_BACKGROUND_BYTES + MULTIPART_OVERHEAD)),
        )
        .route("/furniture", post(design::add_furniture))
        .route("/furniture/{id}", axum::routing::delete(design::remove_furniture))
        .route("/furniture/{id}/position", post(design::update_position))
        .route("/furniture/{id}/color", post(design::update_color))
        .route("/furniture/{id}/rotation", post(design::update_rotation))
        .route("/select", post(design::select))
        .route("/drag/start", post(design::drag_start))
        .route("/drag/move", post(design::drag_move))
        .route("/drag/end", post(design::drag_end))
        .route("/pick", post(design::pick))
        .route("/floor-drag", post(design::floor_drag))
        .route("/scene", get(design::scene))
}

/// Create the designer routes router.
pub fn design_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(design::show))
        .route("/frame.png", get(design::frame).layer(frame_rate_limiter()))
        .route("/export.png", get(design::export).layer(export_rate_limiter()))
        .nest("/api", design_api_routes())
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Home page
        .route("/", get(home::home))
        // Product routes
        .nest("/products", product_routes())
        // Cart routes
        .nest("/cart", cart_routes())
        // Room designer
        .nest("/design", design_routes())
}
