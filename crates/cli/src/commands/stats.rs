//! One-shot dashboard statistics fetch.
//!
//! Runs the same aggregation pipeline the admin panel uses, against a
//! throwaway in-memory cache, and logs the result. Handy for checking
//! collection counts and quota health without opening the dashboard.

use std::sync::Arc;

use antenka_admin::stats::StatsAggregator;
use antenka_store::{DocumentStore, MemoryCache};
use tracing::{info, warn};

use super::store_from_env;

/// Fetch and print the stats snapshot.
///
/// # Errors
///
/// Returns an error if environment variables are missing.
pub async fn run(force: bool) -> Result<(), Box<dyn std::error::Error>> {
    let store: Arc<dyn DocumentStore> = Arc::new(store_from_env()?);
    let stats = StatsAggregator::new(store, Arc::new(MemoryCache::new()));

    let snapshot = stats.get_stats(force).await;

    info!("Dashboard Statistics");
    info!("====================");
    info!("Users:       {} total, {} active", snapshot.total_users, snapshot.active_users);
    info!("Products:    {}", snapshot.total_products);
    info!("Categories:  {}", snapshot.total_categories);
    info!(
        "Orders:      {} total, {} pending, {} completed",
        snapshot.total_orders, snapshot.pending_orders, snapshot.completed_orders
    );
    info!("Revenue:     {}", snapshot.total_revenue);

    if let Some(error) = stats.last_error() {
        warn!("Reported error: {error}");
    }

    stats.shutdown();
    Ok(())
}
