//! Cart route handlers.
//!
//! The SPA talks to these endpoints with JSON; the authenticated user
//! arrives via the gateway-injected `X-User-Id` header.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use antenka_core::{LineItemId, ProductId};

use crate::cart::AddOutcome;
use crate::error::Result;
use crate::middleware::CurrentUser;
use crate::models::{CollectionKind, LineItem};
use crate::state::AppState;

/// Cart display data.
#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<LineItem>,
    pub subtotal: Decimal,
    pub item_count: u32,
}

impl CartView {
    fn from_items(items: Vec<LineItem>) -> Self {
        let subtotal = items
            .iter()
            .map(|line| line.price * Decimal::from(line.quantity))
            .sum();
        let item_count = items.iter().map(|line| line.quantity).sum();
        Self {
            items,
            subtotal,
            item_count,
        }
    }
}

/// Add to cart request body.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: String,
    pub selected_size: Option<String>,
    pub quantity: Option<u32>,
}

/// Result of an add operation.
#[derive(Debug, Serialize)]
pub struct AddItemResponse {
    pub status: &'static str,
    pub line_item_id: LineItemId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
}

impl From<AddOutcome> for AddItemResponse {
    fn from(outcome: AddOutcome) -> Self {
        match outcome {
            AddOutcome::Added(line) => Self {
                status: "added",
                line_item_id: line.id,
                quantity: Some(line.quantity),
            },
            AddOutcome::Incremented { id, quantity } => Self {
                status: "incremented",
                line_item_id: id,
                quantity: Some(quantity),
            },
            AddOutcome::AlreadyPresent(id) => Self {
                status: "already_present",
                line_item_id: id,
                quantity: None,
            },
        }
    }
}

/// Display the cart.
#[instrument(skip(state, user), fields(user = %user.0))]
pub async fn show(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<CartView>> {
    let items = state.cart().list(&user.0, CollectionKind::Cart).await?;
    Ok(Json(CartView::from_items(items)))
}

/// Add an item to the cart, merging with an existing line when the
/// `(product, size)` identity already exists.
#[instrument(skip(state, user), fields(user = %user.0))]
pub async fn add(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(body): Json<AddToCartRequest>,
) -> Result<Json<AddItemResponse>> {
    let product = state
        .catalog()
        .get_product(&ProductId::new(body.product_id))
        .await?;

    let outcome = state
        .cart()
        .add_to_cart(
            &user.0,
            &product,
            body.selected_size.as_deref(),
            body.quantity.unwrap_or(1),
        )
        .await?;

    Ok(Json(outcome.into()))
}

/// Remove an item from the cart. Removing an unknown id is a no-op.
#[instrument(skip(state, user), fields(user = %user.0))]
pub async fn remove(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    state
        .cart()
        .remove_item(&user.0, CollectionKind::Cart, &LineItemId::new(id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
