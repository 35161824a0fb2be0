//! In-process document store.
//!
//! Backs tests, the seed CLI, and local development. Collections live in a
//! `tokio::sync::RwLock`-guarded map keyed by collection path; documents are
//! kept in insertion-stable `BTreeMap`s so unordered queries are
//! deterministic.
//!
//! Two test hooks exist on top of the [`DocumentStore`] contract:
//!
//! - per-collection fault injection ([`MemoryStore::set_fault`]) to drive
//!   partial-failure and quota-retry paths
//! - an operation counter ([`MemoryStore::op_count`]) so cache tests can
//!   assert that a fresh cache hit issues zero store operations

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::document::{Document, Fields};
use crate::error::StoreError;
use crate::query::{Filter, FilterOp, Page, Query, SortDirection};
use crate::DocumentStore;

/// Kind of fault to inject for a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// Operations fail with [`StoreError::QuotaExhausted`].
    Quota,
    /// Operations fail with [`StoreError::Unavailable`].
    Unavailable,
}

impl FaultKind {
    fn to_error(self, collection: &str) -> StoreError {
        match self {
            Self::Quota => StoreError::QuotaExhausted {
                retry_after_secs: 1,
            },
            Self::Unavailable => {
                StoreError::Unavailable(format!("injected fault on {collection}"))
            }
        }
    }
}

/// Which operations an injected fault applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultScope {
    /// Every operation on the collection fails.
    All,
    /// Only deletes fail; reads and other writes pass through.
    Deletes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Read,
    Write,
    Delete,
}

/// In-memory [`DocumentStore`] implementation.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
    faults: RwLock<HashMap<String, (FaultKind, FaultScope)>>,
    ops: AtomicU64,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a fault: all subsequent operations on `collection` fail with
    /// the given kind until [`Self::clear_fault`].
    pub async fn set_fault(&self, collection: &str, kind: FaultKind) {
        self.faults
            .write()
            .await
            .insert(collection.to_owned(), (kind, FaultScope::All));
    }

    /// Inject a fault limited to a subset of operations.
    pub async fn set_scoped_fault(&self, collection: &str, kind: FaultKind, scope: FaultScope) {
        self.faults
            .write()
            .await
            .insert(collection.to_owned(), (kind, scope));
    }

    /// Remove an injected fault.
    pub async fn clear_fault(&self, collection: &str) {
        self.faults.write().await.remove(collection);
    }

    /// Total number of store operations issued so far.
    #[must_use]
    pub fn op_count(&self) -> u64 {
        self.ops.load(AtomicOrdering::Relaxed)
    }

    async fn check(&self, collection: &str, op: Op) -> Result<(), StoreError> {
        self.ops.fetch_add(1, AtomicOrdering::Relaxed);
        if let Some((kind, scope)) = self.faults.read().await.get(collection) {
            let applies = match scope {
                FaultScope::All => true,
                FaultScope::Deletes => op == Op::Delete,
            };
            if applies {
                return Err(kind.to_error(collection));
            }
        }
        Ok(())
    }
}

/// Order two JSON values for sorting and range filters.
///
/// Numbers compare numerically, strings lexically (RFC 3339 timestamps sort
/// correctly this way). Mixed or non-comparable types yield `None`.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64().partial_cmp(&y.as_f64()),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn matches_filter(fields: &Fields, filter: &Filter) -> bool {
    let Some(actual) = fields.get(&filter.field) else {
        return false;
    };
    match filter.op {
        FilterOp::Eq => actual == &filter.value,
        FilterOp::Gt => compare_values(actual, &filter.value) == Some(Ordering::Greater),
        FilterOp::Gte => matches!(
            compare_values(actual, &filter.value),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        FilterOp::Lt => compare_values(actual, &filter.value) == Some(Ordering::Less),
        FilterOp::Lte => matches!(
            compare_values(actual, &filter.value),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

fn matches_all(fields: &Fields, filters: &[Filter]) -> bool {
    filters.iter().all(|f| matches_filter(fields, f))
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn count(&self, collection: &str, filters: &[Filter]) -> Result<u64, StoreError> {
        self.check(collection, Op::Read).await?;
        let collections = self.collections.read().await;
        let count = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|fields| matches_all(fields, filters))
                    .count()
            })
            .unwrap_or_default();
        Ok(count as u64)
    }

    async fn query(&self, collection: &str, query: Query) -> Result<Page, StoreError> {
        self.check(collection, Op::Read).await?;
        let collections = self.collections.read().await;

        let mut documents: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|(_, fields)| matches_all(fields, &query.filters))
                    .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order_field) = &query.order_by {
            documents.sort_by(|a, b| {
                let ordering = match (a.field(order_field), b.field(order_field)) {
                    (Some(x), Some(y)) => compare_values(x, y).unwrap_or(Ordering::Equal),
                    (Some(_), None) => Ordering::Greater,
                    (None, Some(_)) => Ordering::Less,
                    (None, None) => Ordering::Equal,
                };
                match query.direction {
                    SortDirection::Asc => ordering,
                    SortDirection::Desc => ordering.reverse(),
                }
            });
        }

        // Cursor is the id of the last document of the previous page
        if let Some(cursor) = &query.cursor {
            if let Some(pos) = documents.iter().position(|d| &d.id == cursor) {
                documents.drain(..=pos);
            } else {
                documents.clear();
            }
        }

        let next_cursor = match query.limit {
            Some(limit) if documents.len() > limit as usize => {
                documents.truncate(limit as usize);
                documents.last().map(|d| d.id.clone())
            }
            _ => None,
        };

        Ok(Page {
            documents,
            next_cursor,
        })
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        self.check(collection, Op::Read).await?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        self.check(collection, Op::Write).await?;
        let id = Uuid::new_v4().simple().to_string();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id.clone(), fields.clone());
        Ok(Document::new(id, fields))
    }

    async fn put(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.check(collection, Op::Write).await?;
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_owned())
            .or_default()
            .insert(id.to_owned(), fields);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), StoreError> {
        self.check(collection, Op::Write).await?;
        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound(format!("{collection}/{id}")))?;
        for (key, value) in fields {
            existing.insert(key, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        self.check(collection, Op::Delete).await?;
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
