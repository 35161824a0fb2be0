//! Document representation and field access helpers.
//!
//! Documents are loosely-typed JSON maps. Typed models live in the service
//! crates; the helpers here do the defensive coercion at the boundary
//! (default-on-missing, numeric-string amounts) so the services never see
//! nulls where the data model promises values.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The field map of a document.
pub type Fields = serde_json::Map<String, Value>;

/// Build a [`Fields`] map from a `serde_json::json!` object literal.
///
/// Non-object values yield an empty map; callers constructing documents
/// always pass object literals.
#[must_use]
pub fn fields(value: Value) -> Fields {
    match value {
        Value::Object(map) => map,
        _ => Fields::new(),
    }
}

/// A stored document: its id plus the field map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// Create a document from an id and a field map.
    #[must_use]
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }

    /// A raw field value, if present.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// A string field; missing or non-string yields `None`.
    #[must_use]
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// A string field, defaulting to empty.
    #[must_use]
    pub fn str_field_or_empty(&self, name: &str) -> String {
        self.str_field(name).unwrap_or_default().to_owned()
    }

    /// A boolean field, defaulting to `false`.
    #[must_use]
    pub fn bool_field(&self, name: &str) -> bool {
        self.fields
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// A non-negative integer field, defaulting to 0.
    #[must_use]
    pub fn u64_field(&self, name: &str) -> u64 {
        self.fields
            .get(name)
            .and_then(Value::as_u64)
            .unwrap_or_default()
    }

    /// A money field coerced through the strict decimal rules.
    ///
    /// Accepts numbers and plain numeric strings; anything else is zero.
    #[must_use]
    pub fn decimal_field(&self, name: &str) -> Decimal {
        self.fields
            .get(name)
            .map(antenka_core::coerce_decimal_or_zero)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Document {
        Document::new(
            "o-1",
            fields(json!({
                "name": "Linen Shirt",
                "total": "1200",
                "quantity": 3,
                "isActive": true,
            })),
        )
    }

    #[test]
    fn test_typed_field_access() {
        let doc = sample();
        assert_eq!(doc.str_field("name"), Some("Linen Shirt"));
        assert_eq!(doc.u64_field("quantity"), 3);
        assert!(doc.bool_field("isActive"));
        assert_eq!(doc.decimal_field("total"), Decimal::from(1200));
    }

    #[test]
    fn test_missing_fields_default() {
        let doc = sample();
        assert_eq!(doc.str_field("missing"), None);
        assert_eq!(doc.str_field_or_empty("missing"), "");
        assert_eq!(doc.u64_field("missing"), 0);
        assert!(!doc.bool_field("missing"));
        assert_eq!(doc.decimal_field("missing"), Decimal::ZERO);
    }

    #[test]
    fn test_fields_from_non_object_is_empty() {
        assert!(fields(json!([1, 2, 3])).is_empty());
    }
}
