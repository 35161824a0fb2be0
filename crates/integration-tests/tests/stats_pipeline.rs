//! Integration tests for the stats aggregation/cache/retry pipeline.

use std::sync::Arc;
use std::time::Duration;

use antenka_admin::stats::{
    INITIAL_RETRY_DELAY_MS, STATS_CACHE_KEY, StatsAggregator,
};
use antenka_integration_tests::seed_dashboard_example;
use antenka_store::{
    DocumentStore, FaultKind, FileCache, LocalCache, MemoryCache, MemoryStore,
};
use rust_decimal::Decimal;

fn as_store(store: &Arc<MemoryStore>) -> Arc<dyn DocumentStore> {
    store.clone()
}

// =============================================================================
// Aggregation
// =============================================================================

#[tokio::test]
async fn test_worked_example_snapshot() {
    let store = Arc::new(MemoryStore::new());
    seed_dashboard_example(&store).await;
    let stats = StatsAggregator::new(as_store(&store), Arc::new(MemoryCache::new()));

    let snapshot = stats.get_stats(false).await;

    assert_eq!(snapshot.total_products, 10);
    assert_eq!(snapshot.total_users, 25);
    assert_eq!(snapshot.active_users, 5);
    assert_eq!(snapshot.total_orders, 4);
    assert_eq!(snapshot.pending_orders, 2);
    assert_eq!(snapshot.completed_orders, 2);
    // 1000 (number) + "500" (numeric string)
    assert_eq!(snapshot.total_revenue, Decimal::from(1500));
}

#[tokio::test]
async fn test_malformed_totals_contribute_zero() {
    let store = Arc::new(MemoryStore::new());
    store
        .put(
            "orders",
            "good",
            antenka_store::fields(serde_json::json!({"status": "delivered", "total": "750"})),
        )
        .await
        .expect("seed");
    store
        .put(
            "orders",
            "bad",
            antenka_store::fields(serde_json::json!({"status": "delivered", "total": "1,000"})),
        )
        .await
        .expect("seed");
    store
        .put(
            "orders",
            "absent",
            antenka_store::fields(serde_json::json!({"status": "delivered"})),
        )
        .await
        .expect("seed");

    let stats = StatsAggregator::new(as_store(&store), Arc::new(MemoryCache::new()));
    let snapshot = stats.get_stats(false).await;
    assert_eq!(snapshot.total_revenue, Decimal::from(750));
}

// =============================================================================
// Caching
// =============================================================================

#[tokio::test]
async fn test_second_call_within_ttl_hits_cache() {
    let store = Arc::new(MemoryStore::new());
    seed_dashboard_example(&store).await;
    let stats = StatsAggregator::new(as_store(&store), Arc::new(MemoryCache::new()));

    let first = stats.get_stats(false).await;
    // Let the detached recent-counts fetch drain before counting ops
    tokio::time::sleep(Duration::from_millis(50)).await;
    let ops = store.op_count();

    let second = stats.get_stats(false).await;
    assert_eq!(store.op_count(), ops, "no store operations on a fresh hit");
    assert_eq!(first, second, "identical data from cache");
}

#[tokio::test]
async fn test_persisted_cache_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cache_path = dir.path().join("dashboard-cache.json");

    let store = Arc::new(MemoryStore::new());
    seed_dashboard_example(&store).await;

    // First "process": aggregate and persist
    {
        let cache: Arc<dyn LocalCache> = Arc::new(FileCache::open(&cache_path));
        let stats = StatsAggregator::new(as_store(&store), cache);
        let snapshot = stats.get_stats(false).await;
        assert_eq!(snapshot.total_users, 25);
        tokio::time::sleep(Duration::from_millis(50)).await;
        stats.shutdown();
    }

    // The blob on disk is the flat snapshot plus its timestamp
    let cache = FileCache::open(&cache_path);
    let raw = cache.get(STATS_CACHE_KEY).expect("persisted entry");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
    assert_eq!(value["totalUsers"], 25);
    assert!(value["_ts"].is_u64());

    // Second "process": a fresh aggregator answers from the persisted entry
    let ops = store.op_count();
    let stats = StatsAggregator::new(as_store(&store), Arc::new(FileCache::open(&cache_path)));
    let snapshot = stats.get_stats(false).await;
    assert_eq!(snapshot.total_users, 25);
    assert_eq!(store.op_count(), ops, "restart served from the persisted cache");
}

#[tokio::test]
async fn test_expired_entry_requeries_and_restamps() {
    let store = Arc::new(MemoryStore::new());
    seed_dashboard_example(&store).await;
    let cache = Arc::new(MemoryCache::new());
    let stats = StatsAggregator::with_ttl(
        as_store(&store),
        cache.clone() as Arc<dyn LocalCache>,
        Duration::from_millis(40),
    );

    stats.get_stats(false).await;
    let first_raw = cache.get(STATS_CACHE_KEY).expect("entry");
    let first_ts = serde_json::from_str::<serde_json::Value>(&first_raw).expect("json")["_ts"]
        .as_u64()
        .expect("ts");

    tokio::time::sleep(Duration::from_millis(60)).await;
    let ops = store.op_count();
    stats.get_stats(false).await;
    assert!(store.op_count() > ops, "expired entry re-queries the store");

    let second_raw = cache.get(STATS_CACHE_KEY).expect("entry");
    let second_ts = serde_json::from_str::<serde_json::Value>(&second_raw).expect("json")["_ts"]
        .as_u64()
        .expect("ts");
    assert!(second_ts > first_ts, "cache timestamp is updated");
}

// =============================================================================
// Quota Backoff
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_backoff_delays_then_surface() {
    let store = Arc::new(MemoryStore::new());
    seed_dashboard_example(&store).await;
    let stats = StatsAggregator::with_ttl(
        as_store(&store),
        Arc::new(MemoryCache::new()),
        Duration::ZERO,
    );

    let baseline = stats.get_stats(false).await;
    tokio::task::yield_now().await;
    store.set_fault("orders", FaultKind::Quota).await;

    // Failure 1: retry scheduled at 2000ms, caller keeps the snapshot
    let kept = stats.get_stats(true).await;
    assert_eq!(kept, baseline);
    assert_eq!(stats.retry().attempts(), 1);
    assert_eq!(stats.retry().next_delay_ms(), 2 * INITIAL_RETRY_DELAY_MS);

    // Failures 2 and 3 fire from the scheduled retries at 2s and 4s
    for (advance_ms, expected_attempts) in [(2_001, 2), (4_001, 3)] {
        tokio::time::advance(Duration::from_millis(advance_ms)).await;
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        assert_eq!(stats.retry().attempts(), expected_attempts);
    }
    assert_eq!(stats.last_error(), None, "still inside the retry budget");

    // Failure 4 (after the 8s retry) exhausts the budget
    tokio::time::advance(Duration::from_millis(8_001)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(stats.retry().attempts(), 4);
    assert!(stats.last_error().is_some(), "error surfaced for display");

    // And nothing more is scheduled
    tokio::time::advance(Duration::from_secs(300)).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(stats.retry().attempts(), 4);

    // Data was preserved throughout
    let after = stats.get_stats(true).await;
    assert_eq!(after.total_users, baseline.total_users);
}
