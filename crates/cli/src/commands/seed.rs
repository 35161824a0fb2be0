//! Seed the document store with sample shop data.
//!
//! Writes a small but representative data set: a sized and an unsized
//! product per category, a mix of active and dormant users, and orders in
//! every status so the dashboard has something to aggregate.

use antenka_core::{OrderStatus, UserRole};
use antenka_store::{DocumentStore, Query, fields};
use chrono::{Duration, Utc};
use serde_json::json;
use tracing::info;

use super::store_from_env;

const COLLECTIONS: &[&str] = &["products", "categories", "users", "orders"];

/// Seed sample data.
///
/// # Errors
///
/// Returns an error if environment variables are missing or writes fail.
pub async fn run(fresh: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store = store_from_env()?;
    let now = Utc::now();

    if fresh {
        info!("Clearing previously seeded documents");
        for collection in COLLECTIONS {
            let page = store.query(collection, Query::all()).await?;
            for doc in page.documents {
                store.delete(collection, &doc.id).await?;
            }
        }
    }

    // Categories
    for (id, name) in [
        ("clothing", "Clothing"),
        ("shoes", "Shoes"),
        ("accessories", "Accessories"),
    ] {
        store
            .put("categories", id, fields(json!({ "name": name })))
            .await?;
    }
    info!("Seeded 3 categories");

    // Products - sized and unsized
    let products = [
        json!({
            "name": "Linen Shirt", "price": 1200, "category": "clothing",
            "image": "https://img.antenka-yume.example/linen-shirt.jpg",
            "sizes": ["S", "M", "L", "XL"], "sizingType": "clothing",
            "createdAt": now.to_rfc3339(),
        }),
        json!({
            "name": "Canvas Sneaker", "price": 2400, "category": "shoes",
            "image": "https://img.antenka-yume.example/canvas-sneaker.jpg",
            "sizes": ["40", "41", "42", "43"], "sizingType": "shoes",
            "createdAt": (now - Duration::days(10)).to_rfc3339(),
        }),
        json!({
            "name": "Tote Bag", "price": 400, "category": "accessories",
            "image": "https://img.antenka-yume.example/tote-bag.jpg",
            "sizes": [], "sizingType": "none",
            "createdAt": (now - Duration::days(2)).to_rfc3339(),
        }),
        json!({
            "name": "Wool Scarf", "price": "850", "category": "accessories",
            "image": "https://img.antenka-yume.example/wool-scarf.jpg",
            "sizes": [], "sizingType": "none",
            "createdAt": (now - Duration::days(40)).to_rfc3339(),
        }),
    ];
    for (i, product) in products.iter().enumerate() {
        store
            .put("products", &format!("p{}", i + 1), fields(product.clone()))
            .await?;
    }
    info!("Seeded {} products", products.len());

    // Users - a few recent, a few dormant
    for i in 1..=8 {
        let created = if i <= 3 {
            now - Duration::days(i)
        } else {
            now - Duration::days(90 + i)
        };
        store
            .put(
                "users",
                &format!("u{i}"),
                fields(json!({
                    "email": format!("user{i}@example.com"),
                    "isActive": i % 2 == 0,
                    "role": UserRole::Customer,
                    "createdAt": created.to_rfc3339(),
                })),
            )
            .await?;
    }
    info!("Seeded 8 users");

    // Orders across statuses; delivered totals exercise both numeric forms
    let orders = [
        json!({"status": OrderStatus::Delivered, "total": 1000, "customerName": "Aya N.",
               "createdAt": (now - Duration::days(3)).to_rfc3339()}),
        json!({"status": OrderStatus::Delivered, "total": "500", "customerName": "Brook T.",
               "createdAt": (now - Duration::days(5)).to_rfc3339()}),
        json!({"status": OrderStatus::Pending, "total": 2400, "customerName": "Case L.",
               "createdAt": (now - Duration::days(1)).to_rfc3339()}),
        json!({"status": OrderStatus::Pending, "total": 850, "customerName": "Dana R.",
               "createdAt": now.to_rfc3339()}),
        json!({"status": OrderStatus::Cancelled, "total": 400, "customerName": "Em W.",
               "createdAt": (now - Duration::days(8)).to_rfc3339()}),
    ];
    for (i, order) in orders.iter().enumerate() {
        store
            .put("orders", &format!("o{}", i + 1), fields(order.clone()))
            .await?;
    }
    info!("Seeded {} orders", orders.len());

    info!("Seeding complete");
    Ok(())
}
