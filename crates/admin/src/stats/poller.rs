//! Periodic lightweight metrics refresh.
//!
//! While the dashboard is open its recent-activity counters are kept warm
//! by a 30-second interval task. Ticks are skipped while the dashboard is
//! backgrounded - the store bills per read, and nobody is looking.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use super::aggregator::StatsAggregator;

/// Interval between refresh ticks.
pub const POLL_INTERVAL: Duration = Duration::from_secs(30);

impl StatsAggregator {
    /// Start the background poller. The task is cancelled by
    /// [`StatsAggregator::shutdown`].
    pub fn start_polling(self: &Arc<Self>) {
        let this = Arc::clone(self);
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(POLL_INTERVAL);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick fires immediately; skip it, the dashboard's
            // initial load already fetched
            interval.tick().await;

            loop {
                interval.tick().await;
                if !this.is_visible() {
                    continue;
                }
                this.refresh_recent().await;
            }
        });
        self.track_task(task);
    }
}
