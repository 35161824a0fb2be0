//! Dashboard statistics snapshot and its cached form.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Dashboard-level counters computed from the store.
///
/// Every field defaults to zero and stays at its previous value when the
/// corresponding sub-fetch fails; the dashboard never sees an absent field.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsSnapshot {
    pub total_users: u64,
    pub total_products: u64,
    pub total_categories: u64,
    pub active_users: u64,
    pub total_orders: u64,
    pub pending_orders: u64,
    pub completed_orders: u64,
    pub total_revenue: Decimal,
    pub recent_users: u64,
    pub recent_products: u64,
}

/// A snapshot with its fetch timestamp, as persisted in the local cache.
///
/// Serialized flat: the snapshot's own fields plus a `_ts` epoch-millisecond
/// stamp, so the cache blob stays readable and versionless.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSnapshot {
    #[serde(flatten)]
    pub data: StatsSnapshot,
    #[serde(rename = "_ts")]
    pub fetched_at_ms: u64,
}

impl CachedSnapshot {
    /// Stamp a snapshot with the current wall clock.
    #[must_use]
    pub fn now(data: StatsSnapshot) -> Self {
        Self {
            data,
            fetched_at_ms: epoch_ms(),
        }
    }

    /// Whether this entry is younger than `ttl_ms`.
    #[must_use]
    pub fn is_fresh(&self, ttl_ms: u64) -> bool {
        epoch_ms().saturating_sub(self.fetched_at_ms) < ttl_ms
    }
}

/// Current wall clock as epoch milliseconds.
#[must_use]
pub fn epoch_ms() -> u64 {
    let ms = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    u64::try_from(ms).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_defaults_to_zero() {
        let snapshot = StatsSnapshot::default();
        assert_eq!(snapshot.total_users, 0);
        assert_eq!(snapshot.total_revenue, Decimal::ZERO);
    }

    #[test]
    fn test_cached_snapshot_persists_flat_with_ts() {
        let cached = CachedSnapshot {
            data: StatsSnapshot {
                total_users: 25,
                ..Default::default()
            },
            fetched_at_ms: 1_700_000_000_000,
        };

        let json = serde_json::to_value(&cached).expect("serialize");
        assert_eq!(json["totalUsers"], 25);
        assert_eq!(json["_ts"], 1_700_000_000_000_u64);
        // Flattened, not nested under a data key
        assert!(json.get("data").is_none());

        let back: CachedSnapshot = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, cached);
    }

    #[test]
    fn test_freshness_window() {
        let fresh = CachedSnapshot::now(StatsSnapshot::default());
        assert!(fresh.is_fresh(300_000));
        assert!(!fresh.is_fresh(0));

        let stale = CachedSnapshot {
            data: StatsSnapshot::default(),
            fetched_at_ms: 0,
        };
        assert!(!stale.is_fresh(300_000));
    }

    #[test]
    fn test_missing_fields_deserialize_to_zero() {
        // Older cache blobs may predate newer counters
        let cached: CachedSnapshot =
            serde_json::from_str(r#"{"totalUsers": 3, "_ts": 5}"#).expect("deserialize");
        assert_eq!(cached.data.total_users, 3);
        assert_eq!(cached.data.recent_products, 0);
    }
}
