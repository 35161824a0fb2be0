//! Wishlist route handlers.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use antenka_core::{LineItemId, ProductId};

use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::{CollectionKind, LineItem};
use crate::routes::cart::AddItemResponse;
use crate::state::AppState;

/// Wishlist display data.
#[derive(Debug, Serialize)]
pub struct WishlistView {
    pub items: Vec<LineItem>,
}

/// Add to wishlist request body.
#[derive(Debug, Deserialize)]
pub struct AddToWishlistRequest {
    pub product_id: String,
    pub selected_size: Option<String>,
}

/// Display the wishlist.
#[instrument(skip(state, user), fields(user = %user.0))]
pub async fn show(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<WishlistView>> {
    let items = state.cart().list(&user.0, CollectionKind::Wishlist).await?;
    Ok(Json(WishlistView { items }))
}

/// Add an item to the wishlist. Duplicates of the same `(product, size)`
/// identity are reported, not re-inserted.
#[instrument(skip(state, user), fields(user = %user.0))]
pub async fn add(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<AddToWishlistRequest>,
) -> Result<Json<AddItemResponse>> {
    let product = state
        .catalog()
        .get_product(&ProductId::new(body.product_id))
        .await?;

    let outcome = state
        .cart()
        .add_to_wishlist(&user.0, &product, body.selected_size.as_deref())
        .await?;

    Ok(Json(outcome.into()))
}

/// Remove an item from the wishlist. Removing an unknown id is a no-op.
#[instrument(skip(state, user), fields(user = %user.0))]
pub async fn remove(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state
        .cart()
        .remove_item(&user.0, CollectionKind::Wishlist, &LineItemId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Move a wishlist entry into the cart.
///
/// If the cart add succeeds but the wishlist delete fails, the resulting
/// duplicate is surfaced as a 409 rather than silently retried.
#[instrument(skip(state, user), fields(user = %user.0))]
pub async fn move_to_cart(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AddItemResponse>> {
    let outcome = state
        .cart()
        .move_to_cart(&user.0, &LineItemId::new(id))
        .await?;
    Ok(Json(outcome.into()))
}
