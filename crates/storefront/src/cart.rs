//! Cart and wishlist operations.
//!
//! The store has no uniqueness constraint on line items, so this service is
//! the sole enforcer of the identity invariant: within one user's cart or
//! wishlist there is at most one line per `(product_id, selected_size)`.
//! Adding an existing identity merges into the existing line instead of
//! inserting a duplicate.

use std::sync::Arc;

use antenka_core::{LineItemId, UserId};
use antenka_store::{DocumentStore, Query, StoreError, fields};
use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::instrument;

use crate::models::{CollectionKind, LineItem, Product};

/// Errors from cart and wishlist operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The product declares sizes and the caller selected none.
    #[error("a size must be selected for this product")]
    SizeRequired,

    /// The referenced wishlist entry does not exist.
    #[error("wishlist item not found: {0}")]
    WishlistItemNotFound(LineItemId),

    /// The store rejected or failed the operation.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// A move-to-cart added the item to the cart but failed to remove it
    /// from the wishlist. The duplicate is left in place for the user to
    /// resolve; it is not retried.
    #[error("item {cart_item} was added to the cart but could not be removed from the wishlist")]
    ConsistencyGap {
        cart_item: LineItemId,
        wishlist_item: LineItemId,
        #[source]
        source: StoreError,
    },
}

/// What an add operation did.
#[derive(Debug, Clone, PartialEq)]
pub enum AddOutcome {
    /// A new line was inserted.
    Added(LineItem),
    /// An existing cart line absorbed the quantity delta.
    Incremented { id: LineItemId, quantity: u32 },
    /// The wishlist already held this identity; nothing was written.
    AlreadyPresent(LineItemId),
}

/// Cart and wishlist service over a user's line-item sub-collections.
#[derive(Clone)]
pub struct CartService {
    store: Arc<dyn DocumentStore>,
}

impl CartService {
    /// Create a new cart service.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Add a product to the user's cart, merging with any existing line of
    /// the same `(product, size)` identity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::SizeRequired`] (before any store access) when
    /// the product declares sizes and `selected_size` is empty.
    #[instrument(skip(self, product), fields(user = %user, product_id = %product.id))]
    pub async fn add_to_cart(
        &self,
        user: &UserId,
        product: &Product,
        selected_size: Option<&str>,
        quantity_delta: u32,
    ) -> Result<AddOutcome, CartError> {
        let selected_size = normalize_size(selected_size);
        if product.requires_size() && selected_size.is_none() {
            return Err(CartError::SizeRequired);
        }

        let line = LineItem::snapshot_of(product, selected_size, quantity_delta.max(1));
        self.merge_line(user, CollectionKind::Cart, line).await
    }

    /// Add a product to the user's wishlist. An existing identity is a
    /// no-op reported as [`AddOutcome::AlreadyPresent`].
    ///
    /// # Errors
    ///
    /// Returns [`CartError::SizeRequired`] when the product declares sizes
    /// and `selected_size` is empty.
    #[instrument(skip(self, product), fields(user = %user, product_id = %product.id))]
    pub async fn add_to_wishlist(
        &self,
        user: &UserId,
        product: &Product,
        selected_size: Option<&str>,
    ) -> Result<AddOutcome, CartError> {
        let selected_size = normalize_size(selected_size);
        if product.requires_size() && selected_size.is_none() {
            return Err(CartError::SizeRequired);
        }

        let line = LineItem::snapshot_of(product, selected_size, 1);
        self.merge_line(user, CollectionKind::Wishlist, line).await
    }

    /// List a user's collection, newest additions first.
    ///
    /// # Errors
    ///
    /// Returns a store error if the read fails.
    #[instrument(skip(self), fields(user = %user))]
    pub async fn list(
        &self,
        user: &UserId,
        kind: CollectionKind,
    ) -> Result<Vec<LineItem>, CartError> {
        let page = self.store.query(&kind.path(user), Query::all()).await?;
        let mut items: Vec<LineItem> = page.documents.iter().map(LineItem::from_document).collect();
        items.sort_by(|a, b| b.added_at.cmp(&a.added_at));
        Ok(items)
    }

    /// Remove a line item by id. Removing an unknown id is a no-op.
    ///
    /// # Errors
    ///
    /// Returns a store error if the delete fails.
    #[instrument(skip(self), fields(user = %user, item = %item))]
    pub async fn remove_item(
        &self,
        user: &UserId,
        kind: CollectionKind,
        item: &LineItemId,
    ) -> Result<(), CartError> {
        self.store.delete(&kind.path(user), item.as_str()).await?;
        Ok(())
    }

    /// Move a wishlist entry into the cart.
    ///
    /// Composes an add into the cart with a remove from the wishlist. If
    /// the add succeeds and the remove fails, the duplicate is surfaced as
    /// [`CartError::ConsistencyGap`] and left for manual resolution.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::WishlistItemNotFound`] if the entry is missing.
    #[instrument(skip(self), fields(user = %user, item = %item))]
    pub async fn move_to_cart(
        &self,
        user: &UserId,
        item: &LineItemId,
    ) -> Result<AddOutcome, CartError> {
        let wishlist_path = CollectionKind::Wishlist.path(user);
        let doc = self
            .store
            .get(&wishlist_path, item.as_str())
            .await?
            .ok_or_else(|| CartError::WishlistItemNotFound(item.clone()))?;

        let mut line = LineItem::from_document(&doc);
        line.quantity = 1;
        line.added_at = Utc::now();

        let outcome = self.merge_line(user, CollectionKind::Cart, line).await?;

        if let Err(source) = self.store.delete(&wishlist_path, item.as_str()).await {
            let cart_item = match &outcome {
                AddOutcome::Added(line) => line.id.clone(),
                AddOutcome::Incremented { id, .. } | AddOutcome::AlreadyPresent(id) => id.clone(),
            };
            return Err(CartError::ConsistencyGap {
                cart_item,
                wishlist_item: item.clone(),
                source,
            });
        }

        Ok(outcome)
    }

    /// Merge a candidate line into a collection, enforcing the identity
    /// invariant. Both the direct add paths and move-to-cart funnel through
    /// here so the merge rule exists exactly once.
    async fn merge_line(
        &self,
        user: &UserId,
        kind: CollectionKind,
        candidate: LineItem,
    ) -> Result<AddOutcome, CartError> {
        let path = kind.path(user);

        // Personal collections are small; read them whole rather than
        // relying on a store-side uniqueness check that does not exist
        let page = self.store.query(&path, Query::all()).await?;
        let existing = page
            .documents
            .iter()
            .map(LineItem::from_document)
            .find(|line| {
                line.identity_matches(&candidate.product_id, candidate.selected_size.as_deref())
            });

        match (kind, existing) {
            (CollectionKind::Cart, Some(line)) => {
                let quantity = line.quantity + candidate.quantity;
                self.store
                    .update(
                        &path,
                        line.id.as_str(),
                        fields(json!({
                            "quantity": quantity,
                            "addedAt": Utc::now().to_rfc3339(),
                        })),
                    )
                    .await?;
                Ok(AddOutcome::Incremented {
                    id: line.id,
                    quantity,
                })
            }
            (CollectionKind::Wishlist, Some(line)) => Ok(AddOutcome::AlreadyPresent(line.id)),
            (_, None) => {
                let doc = self
                    .store
                    .insert(&path, candidate.to_fields(kind))
                    .await?;
                Ok(AddOutcome::Added(LineItem::from_document(&doc)))
            }
        }
    }
}

/// Treat empty and whitespace-only sizes as unselected.
fn normalize_size(selected_size: Option<&str>) -> Option<&str> {
    selected_size
        .map(str::trim)
        .filter(|size| !size.is_empty())
}
