//! Dashboard statistics pipeline.
//!
//! [`StatsAggregator`] computes the dashboard counters from the document
//! store, caches them (in memory and in the persisted local cache, 5-minute
//! TTL), tolerates partial failures, and backs off under store quota
//! pressure instead of compounding it.

mod aggregator;
mod poller;
mod retry;
mod snapshot;

pub use aggregator::{STATS_CACHE_KEY, StatsAggregator};
pub use poller::POLL_INTERVAL;
pub use retry::{
    INITIAL_RETRY_DELAY_MS, MAX_RETRY_ATTEMPTS, MAX_RETRY_DELAY_MS, RetryState,
};
pub use snapshot::{CachedSnapshot, StatsSnapshot, epoch_ms};
