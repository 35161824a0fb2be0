//! Quota-retry bookkeeping for the stats pipeline.
//!
//! # Backoff Schedule
//!
//! | Failure | Scheduled delay | Next delay |
//! |---------|-----------------|------------|
//! | 1       | 2000ms          | 4000ms     |
//! | 2       | 4000ms          | 8000ms     |
//! | 3       | 8000ms          | 16000ms    |
//! | 4       | gives up        | -          |
//!
//! Delays double up to a 60s cap; after three scheduled retries the pipeline
//! surfaces the quota error and keeps the last good snapshot. A successful
//! aggregation resets the state.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Delay before the first retry.
pub const INITIAL_RETRY_DELAY_MS: u64 = 2_000;
/// Upper bound on the doubling delay.
pub const MAX_RETRY_DELAY_MS: u64 = 60_000;
/// Retries scheduled before giving up.
pub const MAX_RETRY_ATTEMPTS: u32 = 3;

/// Thread-safe retry state.
///
/// Uses atomics for lock-free reads of state.
#[derive(Debug)]
pub struct RetryState {
    /// Quota failures absorbed since the last success.
    attempts: AtomicU32,
    /// Delay the next scheduled retry will wait.
    next_delay_ms: AtomicU64,
}

impl Default for RetryState {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryState {
    /// Fresh state: no failures, first retry would wait 2s.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            attempts: AtomicU32::new(0),
            next_delay_ms: AtomicU64::new(INITIAL_RETRY_DELAY_MS),
        }
    }

    /// Number of quota failures since the last success.
    #[must_use]
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::Acquire)
    }

    /// Delay the next scheduled retry would wait.
    #[must_use]
    pub fn next_delay_ms(&self) -> u64 {
        self.next_delay_ms.load(Ordering::Acquire)
    }

    /// Record a quota failure.
    ///
    /// Returns `Some(delay_ms)` when a retry should be scheduled after that
    /// delay, or `None` when the attempt budget is spent and the error must
    /// be surfaced instead.
    pub fn register_failure(&self) -> Option<u64> {
        let prior = self.attempts.fetch_add(1, Ordering::AcqRel);
        if prior >= MAX_RETRY_ATTEMPTS {
            return None;
        }
        let delay = self.next_delay_ms.load(Ordering::Acquire);
        self.next_delay_ms
            .store((delay * 2).min(MAX_RETRY_DELAY_MS), Ordering::Release);
        Some(delay)
    }

    /// Reset after a successful aggregation.
    pub fn reset(&self) {
        self.attempts.store(0, Ordering::Release);
        self.next_delay_ms
            .store(INITIAL_RETRY_DELAY_MS, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_sequence() {
        let state = RetryState::new();

        assert_eq!(state.register_failure(), Some(2_000));
        assert_eq!(state.register_failure(), Some(4_000));
        assert_eq!(state.register_failure(), Some(8_000));
        // Fourth consecutive failure exhausts the budget
        assert_eq!(state.register_failure(), None);
        assert_eq!(state.attempts(), 4);
    }

    #[test]
    fn test_delay_caps_at_sixty_seconds() {
        let state = RetryState::new();
        for _ in 0..MAX_RETRY_ATTEMPTS {
            let _ = state.register_failure();
        }
        state.reset();

        // Walk the doubling far enough to hit the cap
        let mut last = 0;
        for _ in 0..3 {
            if let Some(delay) = state.register_failure() {
                last = delay;
            }
        }
        assert_eq!(last, 8_000);
        assert!(state.next_delay_ms() <= MAX_RETRY_DELAY_MS);
    }

    #[test]
    fn test_reset_restores_initial_schedule() {
        let state = RetryState::new();
        let _ = state.register_failure();
        let _ = state.register_failure();

        state.reset();
        assert_eq!(state.attempts(), 0);
        assert_eq!(state.next_delay_ms(), INITIAL_RETRY_DELAY_MS);
        assert_eq!(state.register_failure(), Some(INITIAL_RETRY_DELAY_MS));
    }
}
