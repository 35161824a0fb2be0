//! Route definitions for the storefront.

pub mod cart;
pub mod products;
pub mod wishlist;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::state::AppState;

/// Build the storefront router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Catalog
        .route("/products", get(products::list))
        .route("/products/{id}", get(products::show))
        // Cart
        .route("/cart", get(cart::show))
        .route("/cart/items", post(cart::add))
        .route("/cart/items/{id}", delete(cart::remove))
        // Wishlist
        .route("/wishlist", get(wishlist::show))
        .route("/wishlist/items", post(wishlist::add))
        .route("/wishlist/items/{id}", delete(wishlist::remove))
        .route("/wishlist/items/{id}/move-to-cart", post(wishlist::move_to_cart))
}
