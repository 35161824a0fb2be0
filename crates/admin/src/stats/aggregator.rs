//! Snapshot aggregation over the document store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use antenka_core::{OrderStatus, coerce_decimal_or_zero};
use antenka_store::{DocumentStore, Filter, LocalCache, Query, StoreError};
use chrono::Utc;
use rust_decimal::Decimal;
use tokio::task::JoinHandle;
use tracing::instrument;

use super::retry::RetryState;
use super::snapshot::{CachedSnapshot, StatsSnapshot};

/// Key of the persisted snapshot in the local cache.
pub const STATS_CACHE_KEY: &str = "dashboard_stats";

/// How long a cached snapshot stays fresh.
const DEFAULT_TTL: Duration = Duration::from_secs(300); // 5 minutes

/// Window for the "recent" counters.
const RECENT_WINDOW_DAYS: i64 = 7;

const USERS: &str = "users";
const PRODUCTS: &str = "products";
const CATEGORIES: &str = "categories";
const ORDERS: &str = "orders";

/// Computes and caches the dashboard statistics.
///
/// One aggregator is owned by the dashboard session and injected where
/// needed; cache and retry state live inside it, never in module-level
/// statics, so tests can run isolated instances.
///
/// Counting against the hosted store is billed per read, so the cache check
/// is the primary cost control: a fresh hit answers without touching the
/// store at all. Failures never panic and never clear the last good
/// snapshot; they surface through [`Self::last_error`].
pub struct StatsAggregator {
    store: Arc<dyn DocumentStore>,
    cache: Arc<dyn LocalCache>,
    ttl_ms: u64,
    snapshot: Mutex<Option<CachedSnapshot>>,
    retry: RetryState,
    last_error: Mutex<Option<String>>,
    in_flight: AtomicBool,
    visible: AtomicBool,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl StatsAggregator {
    /// Create an aggregator with the production 5-minute TTL.
    #[must_use]
    pub fn new(store: Arc<dyn DocumentStore>, cache: Arc<dyn LocalCache>) -> Arc<Self> {
        Self::with_ttl(store, cache, DEFAULT_TTL)
    }

    /// Create an aggregator with an explicit TTL (tests shrink it).
    #[must_use]
    pub fn with_ttl(
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn LocalCache>,
        ttl: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            store,
            cache,
            ttl_ms: u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX),
            snapshot: Mutex::new(None),
            retry: RetryState::new(),
            last_error: Mutex::new(None),
            in_flight: AtomicBool::new(false),
            visible: AtomicBool::new(true),
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// Produce a snapshot for display.
    ///
    /// Unless `force_refresh`, a cache entry younger than the TTL answers
    /// immediately with zero store operations. A refresh that hits the
    /// store's quota limit schedules its own retry and returns the last
    /// good snapshot; this method never fails.
    #[instrument(skip(self))]
    pub async fn get_stats(self: &Arc<Self>, force_refresh: bool) -> StatsSnapshot {
        if !force_refresh
            && let Some(fresh) = self.fresh_snapshot()
        {
            return fresh;
        }
        self.refresh().await
    }

    /// The error side-channel: set when retries are exhausted or a partial
    /// failure left stale fields, cleared by the next clean refresh.
    #[must_use]
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().ok().and_then(|e| e.clone())
    }

    /// Retry bookkeeping (exposed for the dashboard and for tests).
    #[must_use]
    pub const fn retry(&self) -> &RetryState {
        &self.retry
    }

    /// Mark the dashboard visible or backgrounded. The poller skips ticks
    /// while hidden.
    pub fn set_visible(&self, visible: bool) {
        self.visible.store(visible, Ordering::Release);
    }

    /// Whether the dashboard is currently visible.
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::Acquire)
    }

    /// Cancel the poller and any scheduled retry or background fetch.
    pub fn shutdown(&self) {
        if let Ok(mut tasks) = self.tasks.lock() {
            for task in tasks.drain(..) {
                task.abort();
            }
        }
    }

    // =========================================================================
    // Cache handling
    // =========================================================================

    fn fresh_snapshot(&self) -> Option<StatsSnapshot> {
        if let Ok(guard) = self.snapshot.lock()
            && let Some(cached) = guard.as_ref()
            && cached.is_fresh(self.ttl_ms)
        {
            return Some(cached.data.clone());
        }

        // Fall back to the persisted cache (survives restarts)
        let cached = self.load_persisted()?;
        if !cached.is_fresh(self.ttl_ms) {
            return None;
        }
        let data = cached.data.clone();
        if let Ok(mut guard) = self.snapshot.lock() {
            *guard = Some(cached);
        }
        Some(data)
    }

    fn load_persisted(&self) -> Option<CachedSnapshot> {
        let raw = self.cache.get(STATS_CACHE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(cached) => Some(cached),
            Err(e) => {
                tracing::warn!(error = %e, "discarding malformed persisted stats entry");
                None
            }
        }
    }

    /// Last known snapshot regardless of freshness, defaulting to zeros.
    fn last_snapshot(&self) -> StatsSnapshot {
        if let Ok(guard) = self.snapshot.lock()
            && let Some(cached) = guard.as_ref()
        {
            return cached.data.clone();
        }
        self.load_persisted().map(|c| c.data).unwrap_or_default()
    }

    fn store_snapshot(&self, cached: CachedSnapshot) {
        if let Ok(raw) = serde_json::to_string(&cached) {
            self.cache.set(STATS_CACHE_KEY, &raw);
        }
        if let Ok(mut guard) = self.snapshot.lock() {
            *guard = Some(cached);
        }
    }

    fn set_error(&self, error: Option<String>) {
        if let Ok(mut guard) = self.last_error.lock() {
            *guard = error;
        }
    }

    pub(super) fn track_task(&self, task: JoinHandle<()>) {
        if let Ok(mut tasks) = self.tasks.lock() {
            tasks.retain(|t| !t.is_finished());
            tasks.push(task);
        }
    }

    // =========================================================================
    // Refresh pipeline
    // =========================================================================

    async fn refresh(self: &Arc<Self>) -> StatsSnapshot {
        // One full refresh at a time; a concurrent caller gets the last
        // known snapshot instead of queueing a second fan-out
        if self.in_flight.swap(true, Ordering::AcqRel) {
            tracing::debug!("stats refresh already in flight");
            return self.last_snapshot();
        }
        let snapshot = self.refresh_inner().await;
        self.in_flight.store(false, Ordering::Release);
        snapshot
    }

    async fn refresh_inner(self: &Arc<Self>) -> StatsSnapshot {
        let previous = self.last_snapshot();

        // Count-only queries, issued concurrently. Each writes a disjoint
        // field, so they merge without coordination.
        let active_filter = [Filter::eq("isActive", true)];
        let pending_filter = [Filter::eq("status", OrderStatus::Pending.as_str())];
        let delivered_filter = [Filter::eq("status", OrderStatus::Delivered.as_str())];
        let (users, products, categories, active, orders, pending, delivered) = tokio::join!(
            self.store.count(USERS, &[]),
            self.store.count(PRODUCTS, &[]),
            self.store.count(CATEGORIES, &[]),
            self.store.count(USERS, &active_filter),
            self.store.count(ORDERS, &[]),
            self.store.count(ORDERS, &pending_filter),
            self.store.count(ORDERS, &delivered_filter),
        );

        let mut quota_hit = false;
        let mut partial_failure = false;
        let mut merge = |result: Result<u64, StoreError>, prev: u64, field: &str| match result {
            Ok(count) => count,
            Err(e) if e.is_quota_exhausted() => {
                quota_hit = true;
                prev
            }
            Err(e) => {
                partial_failure = true;
                tracing::warn!(field, error = %e, "count failed; keeping previous value");
                prev
            }
        };

        let mut next = StatsSnapshot {
            total_users: merge(users, previous.total_users, "totalUsers"),
            total_products: merge(products, previous.total_products, "totalProducts"),
            total_categories: merge(categories, previous.total_categories, "totalCategories"),
            active_users: merge(active, previous.active_users, "activeUsers"),
            total_orders: merge(orders, previous.total_orders, "totalOrders"),
            pending_orders: merge(pending, previous.pending_orders, "pendingOrders"),
            completed_orders: merge(delivered, previous.completed_orders, "completedOrders"),
            // Carried until their own fetches complete below
            total_revenue: previous.total_revenue,
            recent_users: previous.recent_users,
            recent_products: previous.recent_products,
        };

        if quota_hit {
            return self.handle_quota(previous);
        }

        // Revenue needs the delivered-order documents; this is the one
        // deliberate full fetch (bounded by status) because the store
        // offers no server-side sum
        match self.fetch_revenue().await {
            Ok(revenue) => next.total_revenue = revenue,
            Err(e) if e.is_quota_exhausted() => {
                return self.handle_quota(previous);
            }
            Err(e) => {
                partial_failure = true;
                tracing::warn!(error = %e, "revenue fetch failed; keeping previous value");
            }
        }

        // Aggregation completed: reset the backoff and publish
        self.retry.reset();
        if partial_failure {
            self.set_error(Some(
                "some statistics failed to refresh; previous values shown".to_owned(),
            ));
        } else {
            self.set_error(None);
        }
        self.store_snapshot(CachedSnapshot::now(next.clone()));

        // Recent counters arrive later; the caller is not kept waiting
        let this = Arc::clone(self);
        let task = tokio::spawn(async move {
            this.refresh_recent().await;
        });
        self.track_task(task);

        next
    }

    /// Quota exhaustion: schedule a full retry with doubling delay, or give
    /// up after the attempt budget and surface the error. The last good
    /// snapshot is returned either way; no fallback to unbounded scans.
    fn handle_quota(self: &Arc<Self>, previous: StatsSnapshot) -> StatsSnapshot {
        if let Some(delay_ms) = self.retry.register_failure() {
            tracing::warn!(
                delay_ms,
                attempt = self.retry.attempts(),
                "store quota exhausted; scheduling stats retry"
            );
            let this = Arc::clone(self);
            let task = tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                let _ = this.get_stats(true).await;
            });
            self.track_task(task);
        } else {
            tracing::error!("store quota exhausted and retries spent; keeping last good snapshot");
            self.set_error(Some(
                "store quota exhausted; showing cached statistics".to_owned(),
            ));
        }
        previous
    }

    async fn fetch_revenue(&self) -> Result<Decimal, StoreError> {
        let page = self
            .store
            .query(
                ORDERS,
                Query::all().filter(Filter::eq("status", OrderStatus::Delivered.as_str())),
            )
            .await?;

        // `total` may be a number or a numeric string; anything else
        // contributes zero rather than poisoning the sum
        let revenue = page
            .documents
            .iter()
            .filter_map(|doc| doc.field("total"))
            .map(coerce_decimal_or_zero)
            .sum();
        Ok(revenue)
    }

    /// Fetch the 7-day counters and merge them into the published snapshot.
    ///
    /// Used by both the post-refresh background task and the poller, so the
    /// merge logic exists exactly once.
    pub async fn refresh_recent(&self) {
        let cutoff = (Utc::now() - chrono::Duration::days(RECENT_WINDOW_DAYS)).to_rfc3339();

        let users_filter = [Filter::gte("createdAt", cutoff.clone())];
        let products_filter = [Filter::gte("createdAt", cutoff)];
        let (recent_users, recent_products) = tokio::join!(
            self.store.count(USERS, &users_filter),
            self.store.count(PRODUCTS, &products_filter),
        );

        let recent_users = match recent_users {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!(error = %e, "recent users count failed");
                None
            }
        };
        let recent_products = match recent_products {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!(error = %e, "recent products count failed");
                None
            }
        };

        self.apply_recent(recent_users, recent_products);
    }

    /// Merge late-arriving recent counters into the cached snapshot without
    /// extending its freshness window.
    fn apply_recent(&self, recent_users: Option<u64>, recent_products: Option<u64>) {
        if recent_users.is_none() && recent_products.is_none() {
            return;
        }

        let updated = {
            let Ok(mut guard) = self.snapshot.lock() else {
                return;
            };
            let Some(cached) = guard.as_mut() else {
                return;
            };
            if let Some(count) = recent_users {
                cached.data.recent_users = count;
            }
            if let Some(count) = recent_products {
                cached.data.recent_products = count;
            }
            cached.clone()
        };

        if let Ok(raw) = serde_json::to_string(&updated) {
            self.cache.set(STATS_CACHE_KEY, &raw);
        }
    }
}

impl Drop for StatsAggregator {
    fn drop(&mut self) {
        self.shutdown();
    }
}
