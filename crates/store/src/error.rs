//! Store error taxonomy.

use thiserror::Error;

/// Errors from the hosted document store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's read/write quota is exhausted. Transient; callers with a
    /// retry policy key off this variant.
    #[error("store quota exhausted (retry after {retry_after_secs}s)")]
    QuotaExhausted { retry_after_secs: u64 },

    /// A point operation targeted a document that does not exist.
    #[error("document not found: {0}")]
    NotFound(String),

    /// Transport-level failure (connect, timeout, TLS).
    #[error("store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("failed to decode store response: {0}")]
    Decode(String),

    /// The store is unreachable or refusing work for a non-quota reason.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Whether this error is the distinguished quota/rate-limit condition.
    #[must_use]
    pub const fn is_quota_exhausted(&self) -> bool {
        matches!(self, Self::QuotaExhausted { .. })
    }
}
