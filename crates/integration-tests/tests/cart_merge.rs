//! Integration tests for cart/wishlist merge semantics.
//!
//! These drive the storefront services end to end over the in-memory
//! store: identity merging, size validation, idempotent removes, and the
//! wishlist-to-cart move.

use std::sync::Arc;

use antenka_core::{LineItemId, ProductId, UserId};
use antenka_integration_tests::seed_catalog;
use antenka_store::DocumentStore;
use antenka_storefront::cart::{AddOutcome, CartError, CartService};
use antenka_storefront::catalog::CatalogService;
use antenka_storefront::models::CollectionKind;
use rust_decimal::Decimal;

async fn services() -> (Arc<antenka_store::MemoryStore>, CatalogService, CartService) {
    let store = seed_catalog().await;
    let catalog = CatalogService::new(store.clone());
    let cart = CartService::new(store.clone());
    (store, catalog, cart)
}

fn user() -> UserId {
    UserId::new("u-test")
}

// =============================================================================
// Identity Invariant
// =============================================================================

#[tokio::test]
async fn test_any_sequence_of_adds_keeps_one_line_per_identity() {
    let (_, catalog, cart) = services().await;
    let user = user();
    let shirt = catalog
        .get_product(&ProductId::new("p1"))
        .await
        .expect("product");

    // Quantity deltas in arbitrary order against the same identity
    let deltas = [1_u32, 3, 1, 2];
    for delta in deltas {
        cart.add_to_cart(&user, &shirt, Some("M"), delta)
            .await
            .expect("add");
    }

    let items = cart.list(&user, CollectionKind::Cart).await.expect("list");
    assert_eq!(items.len(), 1, "one line per (product, size)");
    assert_eq!(
        items[0].quantity,
        deltas.iter().sum::<u32>(),
        "quantity equals the sum of all deltas"
    );
}

#[tokio::test]
async fn test_different_sizes_do_not_merge() {
    let (_, catalog, cart) = services().await;
    let user = user();
    let shirt = catalog
        .get_product(&ProductId::new("p1"))
        .await
        .expect("product");

    cart.add_to_cart(&user, &shirt, Some("S"), 1).await.expect("add S");
    cart.add_to_cart(&user, &shirt, Some("M"), 1).await.expect("add M");
    cart.add_to_cart(&user, &shirt, Some("M"), 1).await.expect("add M again");

    let items = cart.list(&user, CollectionKind::Cart).await.expect("list");
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_users_do_not_share_collections() {
    let (_, catalog, cart) = services().await;
    let bag = catalog
        .get_product(&ProductId::new("p2"))
        .await
        .expect("product");

    let alice = UserId::new("u-alice");
    let bob = UserId::new("u-bob");
    cart.add_to_cart(&alice, &bag, None, 2).await.expect("add");
    cart.add_to_cart(&bob, &bag, None, 1).await.expect("add");

    let alice_items = cart.list(&alice, CollectionKind::Cart).await.expect("list");
    let bob_items = cart.list(&bob, CollectionKind::Cart).await.expect("list");
    assert_eq!(alice_items[0].quantity, 2);
    assert_eq!(bob_items[0].quantity, 1);
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_sized_product_requires_size_and_writes_nothing() {
    let (store, catalog, cart) = services().await;
    let user = user();
    let shirt = catalog
        .get_product(&ProductId::new("p1"))
        .await
        .expect("product");

    let ops = store.op_count();
    let err = cart
        .add_to_cart(&user, &shirt, None, 1)
        .await
        .expect_err("must reject");
    assert!(matches!(err, CartError::SizeRequired));
    assert_eq!(store.op_count(), ops, "rejected before any store access");

    let err = cart
        .add_to_wishlist(&user, &shirt, None)
        .await
        .expect_err("wishlist too");
    assert!(matches!(err, CartError::SizeRequired));

    assert!(cart.list(&user, CollectionKind::Cart).await.expect("list").is_empty());
}

// =============================================================================
// Removal
// =============================================================================

#[tokio::test]
async fn test_remove_is_idempotent() {
    let (_, catalog, cart) = services().await;
    let user = user();
    let bag = catalog
        .get_product(&ProductId::new("p2"))
        .await
        .expect("product");

    let outcome = cart.add_to_cart(&user, &bag, None, 1).await.expect("add");
    let AddOutcome::Added(line) = outcome else {
        panic!("expected insert");
    };

    cart.remove_item(&user, CollectionKind::Cart, &line.id)
        .await
        .expect("remove");
    // Second remove of the same id and a remove of a never-existing id
    cart.remove_item(&user, CollectionKind::Cart, &line.id)
        .await
        .expect("repeat remove");
    cart.remove_item(&user, CollectionKind::Cart, &LineItemId::new("never-existed"))
        .await
        .expect("unknown remove");

    assert!(cart.list(&user, CollectionKind::Cart).await.expect("list").is_empty());
}

// =============================================================================
// Move To Cart
// =============================================================================

#[tokio::test]
async fn test_wishlist_move_produces_numeric_price_and_empty_wishlist() {
    let (_, catalog, cart) = services().await;
    let user = user();

    // Product p1 carries the string price "1200"
    let shirt = catalog
        .get_product(&ProductId::new("p1"))
        .await
        .expect("product");
    let added = cart
        .add_to_wishlist(&user, &shirt, Some("M"))
        .await
        .expect("wishlist add");
    let AddOutcome::Added(wishlist_line) = added else {
        panic!("expected insert");
    };

    cart.move_to_cart(&user, &wishlist_line.id)
        .await
        .expect("move");

    let cart_items = cart.list(&user, CollectionKind::Cart).await.expect("cart");
    assert_eq!(cart_items.len(), 1);
    assert_eq!(cart_items[0].quantity, 1);
    assert_eq!(cart_items[0].price, Decimal::from(1200));
    assert_eq!(cart_items[0].selected_size.as_deref(), Some("M"));

    let wishlist = cart
        .list(&user, CollectionKind::Wishlist)
        .await
        .expect("wishlist");
    assert!(wishlist.is_empty(), "moved item is absent from the wishlist");
}

// =============================================================================
// Denormalized Snapshots
// =============================================================================

#[tokio::test]
async fn test_product_edits_do_not_rewrite_history() {
    let (store, catalog, cart) = services().await;
    let user = user();
    let bag = catalog
        .get_product(&ProductId::new("p2"))
        .await
        .expect("product");

    cart.add_to_cart(&user, &bag, None, 1).await.expect("add");

    // The product's price changes after the fact
    store
        .update("products", "p2", antenka_store::fields(serde_json::json!({"price": 999})))
        .await
        .expect("edit product");

    let items = cart.list(&user, CollectionKind::Cart).await.expect("list");
    assert_eq!(
        items[0].price,
        Decimal::from(400),
        "cart line keeps the add-time snapshot"
    );
}
