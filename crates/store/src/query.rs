//! Query model for the document store.
//!
//! Filters support equality and range comparisons against a single field;
//! queries add ordering, a limit, and cursor-based pagination. The wire
//! shapes use camelCase to match the hosted API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::document::Document;

/// Comparison operator for a filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

/// A single field comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl Filter {
    /// Equality filter.
    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    /// Greater-or-equal filter.
    #[must_use]
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Gte,
            value: value.into(),
        }
    }

    /// Less-or-equal filter.
    #[must_use]
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: FilterOp::Lte,
            value: value.into(),
        }
    }
}

/// Sort direction for ordered queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// A document query: filters plus ordering, limit, and cursor.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,
    #[serde(default, skip_serializing_if = "is_default_direction")]
    pub direction: SortDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

#[allow(clippy::trivially_copy_pass_by_ref)] // serde skip_serializing_if signature
fn is_default_direction(direction: &SortDirection) -> bool {
    *direction == SortDirection::Asc
}

impl Query {
    /// A query returning everything in the collection.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a filter.
    #[must_use]
    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Order by a field.
    #[must_use]
    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by = Some(field.into());
        self.direction = direction;
        self
    }

    /// Cap the number of returned documents.
    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resume after a previously returned cursor.
    #[must_use]
    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.cursor = Some(cursor.into());
        self
    }
}

/// One page of query results.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub documents: Vec<Document>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_builder_composes() {
        let query = Query::all()
            .filter(Filter::eq("status", "delivered"))
            .order_by("createdAt", SortDirection::Desc)
            .limit(10);

        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.order_by.as_deref(), Some("createdAt"));
        assert_eq!(query.direction, SortDirection::Desc);
        assert_eq!(query.limit, Some(10));
        assert!(query.cursor.is_none());
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let query = Query::all()
            .filter(Filter::gte("createdAt", json!("2026-08-01T00:00:00Z")))
            .order_by("createdAt", SortDirection::Desc)
            .limit(5);

        let wire = serde_json::to_value(&query).expect("serialize");
        assert_eq!(wire["orderBy"], json!("createdAt"));
        assert_eq!(wire["direction"], json!("DESC"));
        assert_eq!(wire["filters"][0]["op"], json!("GTE"));
    }

    #[test]
    fn test_default_fields_are_omitted() {
        let wire = serde_json::to_value(Query::all()).expect("serialize");
        assert_eq!(wire, json!({}));
    }
}
