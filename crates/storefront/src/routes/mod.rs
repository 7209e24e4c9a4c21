//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness check (database)
//!
//! # Catalog
//! GET  /api/products                    - Filtered product listing
//! GET  /api/products/{id}               - Product by ID
//! GET  /api/products/slug/{slug}        - Product by slug
//! GET  /api/categories                  - Category listing
//!
//! # Cart
//! GET    /api/cart                      - Cart view
//! DELETE /api/cart                      - Clear the cart
//! POST   /api/cart/items                - Add an item
//! PUT    /api/cart/items/{id}           - Set quantity
//! DELETE /api/cart/items/{id}           - Remove an item
//!
//! # Wishlist
//! GET    /api/wishlist                  - Wishlist view
//! POST   /api/wishlist/{id}/toggle      - Toggle membership
//! DELETE /api/wishlist/{id}             - Remove an item
//! POST   /api/wishlist/{id}/move-to-cart - Move into the cart
//!
//! # Checkout
//! GET  /api/checkout                    - Checkout state and totals
//! PUT  /api/checkout/form               - Replace form data
//! POST /api/checkout/next               - Advance a step
//! POST /api/checkout/previous           - Go back a step
//! POST /api/checkout/submit             - Place the order
//! POST /api/checkout/reset              - Start over
//! ```

pub mod cart;
pub mod checkout;
pub mod health;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(products::index))
        .route("/api/products/{id}", get(products::show))
        .route("/api/products/slug/{slug}", get(products::show_by_slug))
        .route("/api/categories", get(products::categories))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/items", post(cart::add))
        .route("/items/{id}", put(cart::update).delete(cart::remove))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/{id}", delete(wishlist::remove))
        .route("/{id}/toggle", post(wishlist::toggle))
        .route("/{id}/move-to-cart", post(wishlist::move_to_cart))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(checkout::show))
        .route("/form", put(checkout::update_form))
        .route("/next", post(checkout::next))
        .route("/previous", post(checkout::previous))
        .route("/submit", post(checkout::submit))
        .route("/reset", post(checkout::reset))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health checks
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Catalog proxy
        .merge(catalog_routes())
        // Shopper state
        .nest("/api/cart", cart_routes())
        .nest("/api/wishlist", wishlist_routes())
        .nest("/api/checkout", checkout_routes())
}
