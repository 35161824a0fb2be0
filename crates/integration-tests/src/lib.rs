//! Integration tests for AntenkaYume Shop.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p antenka-integration-tests
//! ```
//!
//! Everything runs against the in-memory store; no hosted services are
//! needed. The helpers here build seeded stores and service instances the
//! test files share.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;
use std::sync::Arc;

use antenka_admin::assistant::AssistantConfig;
use antenka_admin::config::AdminConfig;
use antenka_store::{DocumentStore, MemoryStore, fields};
use secrecy::SecretString;
use serde_json::json;

/// Bearer token the test admin config accepts.
pub const TEST_ADMIN_TOKEN: &str = "kQ4vXz7Jm2Rw9Tb5";

/// An admin configuration wired for tests: unreachable assistant upstream,
/// throwaway cache path, fixed bearer token.
#[must_use]
pub fn test_admin_config() -> AdminConfig {
    AdminConfig {
        host: "127.0.0.1".parse().expect("valid host"),
        port: 0,
        doc_api: antenka_store::RestStoreConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            project_id: "antenka-test".to_string(),
            api_key: SecretString::from("kQ4vXz7Jm2Rw9Tb5"),
        },
        admin_token: SecretString::from(TEST_ADMIN_TOKEN),
        assistant: AssistantConfig {
            // Nothing listens here; tests exercising the upstream failure
            // path rely on the refused connection
            endpoint: "http://127.0.0.1:1/v1/messages".to_string(),
            api_key: SecretString::from("kQ4vXz7Jm2Rw9Tb5"),
            model: "generator-large".to_string(),
        },
        // Unused: tests construct state via `with_parts` with a MemoryCache
        stats_cache_path: PathBuf::from("unused-dashboard-cache.json"),
        sentry_dsn: None,
    }
}

/// Seed the worked dashboard example: 10 products, 25 users (5 active),
/// 4 orders (2 delivered totalling 1500, 2 pending).
pub async fn seed_dashboard_example(store: &MemoryStore) {
    for i in 0..10 {
        store
            .put(
                "products",
                &format!("p{i}"),
                fields(json!({"name": format!("Product {i}"), "price": 100})),
            )
            .await
            .expect("seed product");
    }
    for i in 0..25 {
        store
            .put("users", &format!("u{i}"), fields(json!({"isActive": i < 5})))
            .await
            .expect("seed user");
    }
    store
        .put("orders", "o1", fields(json!({"status": "delivered", "total": 1000})))
        .await
        .expect("seed order");
    store
        .put("orders", "o2", fields(json!({"status": "delivered", "total": "500"})))
        .await
        .expect("seed order");
    store
        .put("orders", "o3", fields(json!({"status": "pending", "total": 300})))
        .await
        .expect("seed order");
    store
        .put("orders", "o4", fields(json!({"status": "pending", "total": 200})))
        .await
        .expect("seed order");
}

/// Seed a small catalog for cart tests and return the store.
pub async fn seed_catalog() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .put(
            "products",
            "p1",
            fields(json!({
                "name": "Linen Shirt",
                "price": "1200",
                "image": "https://img.antenka-yume.example/linen-shirt.jpg",
                "sizes": ["S", "M", "L"],
                "sizingType": "clothing",
                "createdAt": "2026-08-01T00:00:00Z",
            })),
        )
        .await
        .expect("seed p1");
    store
        .put(
            "products",
            "p2",
            fields(json!({
                "name": "Tote Bag",
                "price": 400,
                "image": "https://img.antenka-yume.example/tote-bag.jpg",
                "sizes": [],
                "sizingType": "none",
                "createdAt": "2026-08-02T00:00:00Z",
            })),
        )
        .await
        .expect("seed p2");
    store
}
