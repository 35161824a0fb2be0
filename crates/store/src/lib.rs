//! Hosted document store client for AntenkaYume Shop.
//!
//! The shop's backend of record is a hosted document database reached over
//! HTTP. This crate is the seam between the services and that database:
//!
//! - [`DocumentStore`] - the async trait every service talks through
//! - [`RestStore`] - the production client (reqwest against the hosted API)
//! - [`MemoryStore`] - in-process implementation for tests, seeding, and
//!   local runs, with fault injection
//! - [`LocalCache`] - small persisted key/value store used by the admin
//!   dashboard to survive restarts ([`MemoryCache`], [`FileCache`])
//!
//! All remote operations may fail with a distinguished
//! [`StoreError::QuotaExhausted`] condition; callers that care about read
//! cost (the stats pipeline) treat that signal specially.

#![cfg_attr(not(test), forbid(unsafe_code))]

mod document;
mod error;
pub mod http;
pub mod local;
pub mod memory;
mod query;

use async_trait::async_trait;

pub use document::{Document, Fields, fields};
pub use error::StoreError;
pub use http::{RestStore, RestStoreConfig};
pub use local::{FileCache, LocalCache, MemoryCache};
pub use memory::{FaultKind, FaultScope, MemoryStore};
pub use query::{Filter, FilterOp, Page, Query, SortDirection};

/// Asynchronous access to the hosted document database.
///
/// Collections are addressed by slash-separated paths; a document may own a
/// nested collection (`users/{id}/cart`). Counts are server-side and never
/// transfer documents; `query` transfers full documents with optional
/// filters, ordering, limit, and cursor-based pagination.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Count documents matching the filters without fetching them.
    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<u64, StoreError>;

    /// Fetch documents matching a query.
    async fn query(&self, collection: &str, query: Query) -> Result<Page, StoreError>;

    /// Point-read a document by id. Missing documents are `Ok(None)`.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Insert a document with a store-generated id, returning it.
    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document, StoreError>;

    /// Create or replace a document at a known id.
    async fn put(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Merge fields into an existing document, leaving other fields intact.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the document does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError>;

    /// Delete a document by id. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}
