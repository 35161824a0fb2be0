//! Typed models over loosely-typed store documents.
//!
//! Documents arrive as JSON maps; these conversions do the defensive
//! coercion once, at the boundary (missing fields default, numeric-string
//! prices parse through the strict decimal rules), so handlers and services
//! work with honest types.

use antenka_core::{CategoryId, GroupId, LineItemId, ProductId, SizingType};
use antenka_store::{Document, Fields, fields};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Render a money amount as a JSON number.
///
/// Documents written by this service always carry numeric prices; amounts
/// that do not fit an f64 fall back to their string form rather than
/// losing digits.
fn money_to_json(amount: Decimal) -> Value {
    amount
        .to_f64()
        .and_then(serde_json::Number::from_f64)
        .map_or_else(|| Value::String(amount.to_string()), Value::Number)
}

/// Parse an RFC 3339 timestamp field, defaulting to the epoch.
fn timestamp_field(doc: &Document, name: &str) -> DateTime<Utc> {
    doc.str_field(name)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map_or(DateTime::<Utc>::UNIX_EPOCH, |dt| dt.with_timezone(&Utc))
}

// =============================================================================
// Product
// =============================================================================

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<CategoryId>,
    pub sizes: Vec<String>,
    pub sizing_type: SizingType,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Whether adding this product requires a size selection.
    #[must_use]
    pub fn requires_size(&self) -> bool {
        !self.sizes.is_empty()
    }

    /// Coerce a store document into a product.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let sizes = doc
            .field("sizes")
            .and_then(Value::as_array)
            .map(|values| {
                values
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        let sizing_type = doc
            .field("sizingType")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();

        Self {
            id: ProductId::new(doc.id.clone()),
            group_id: doc.str_field("groupId").map(GroupId::new),
            name: doc.str_field_or_empty("name"),
            price: doc.decimal_field("price"),
            image: doc.str_field_or_empty("image"),
            category: doc.str_field("category").map(CategoryId::new),
            sizes,
            sizing_type,
            created_at: timestamp_field(doc, "createdAt"),
        }
    }

    /// Field map for writing this product to the store.
    #[must_use]
    pub fn to_fields(&self) -> Fields {
        let mut map = fields(json!({
            "name": self.name,
            "price": money_to_json(self.price),
            "image": self.image,
            "sizes": self.sizes,
            "sizingType": self.sizing_type,
            "createdAt": self.created_at.to_rfc3339(),
        }));
        if let Some(group_id) = &self.group_id {
            map.insert("groupId".to_owned(), json!(group_id));
        }
        if let Some(category) = &self.category {
            map.insert("category".to_owned(), json!(category));
        }
        map
    }
}

// =============================================================================
// LineItem
// =============================================================================

/// Which per-user collection a line item lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Cart,
    Wishlist,
}

impl CollectionKind {
    /// Sub-collection path for a user.
    #[must_use]
    pub fn path(self, user: &antenka_core::UserId) -> String {
        match self {
            Self::Cart => format!("users/{user}/cart"),
            Self::Wishlist => format!("users/{user}/wishlist"),
        }
    }
}

/// One cart or wishlist entry.
///
/// Carries a denormalized snapshot of the product taken at add time, so
/// later product edits do not retroactively change existing entries.
/// Identity within a collection is `(product_id, selected_size)`; the merge
/// rule in the cart service keeps at most one line per identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_id: Option<GroupId>,
    pub name: String,
    pub price: Decimal,
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_size: Option<String>,
    pub sizing_type: SizingType,
    pub quantity: u32,
    pub added_at: DateTime<Utc>,
}

impl LineItem {
    /// Build the line item inserted when a product is first added.
    #[must_use]
    pub fn snapshot_of(product: &Product, selected_size: Option<&str>, quantity: u32) -> Self {
        Self {
            id: LineItemId::new(""),
            product_id: product.id.clone(),
            group_id: product.group_id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            selected_size: selected_size.map(str::to_owned),
            sizing_type: product.sizing_type,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Whether this line matches the given identity key.
    #[must_use]
    pub fn identity_matches(&self, product_id: &ProductId, selected_size: Option<&str>) -> bool {
        &self.product_id == product_id && self.selected_size.as_deref() == selected_size
    }

    /// Coerce a store document into a line item.
    ///
    /// Wishlist documents carry no `quantity`; the field defaults to 1.
    #[must_use]
    pub fn from_document(doc: &Document) -> Self {
        let quantity = doc
            .field("quantity")
            .and_then(Value::as_u64)
            .and_then(|q| u32::try_from(q).ok())
            .unwrap_or(1);

        let sizing_type = doc
            .field("sizingType")
            .cloned()
            .and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default();

        Self {
            id: LineItemId::new(doc.id.clone()),
            product_id: ProductId::new(doc.str_field_or_empty("productId")),
            group_id: doc.str_field("groupId").map(GroupId::new),
            name: doc.str_field_or_empty("name"),
            price: doc.decimal_field("price"),
            image: doc.str_field_or_empty("image"),
            selected_size: doc.str_field("selectedSize").map(str::to_owned),
            sizing_type,
            quantity,
            added_at: timestamp_field(doc, "addedAt"),
        }
    }

    /// Field map for writing this line item to the store.
    ///
    /// Cart entries carry `quantity`; wishlist entries do not.
    #[must_use]
    pub fn to_fields(&self, kind: CollectionKind) -> Fields {
        let mut map = fields(json!({
            "productId": self.product_id,
            "name": self.name,
            "price": money_to_json(self.price),
            "image": self.image,
            "sizingType": self.sizing_type,
            "addedAt": self.added_at.to_rfc3339(),
        }));
        if let Some(group_id) = &self.group_id {
            map.insert("groupId".to_owned(), json!(group_id));
        }
        if let Some(size) = &self.selected_size {
            map.insert("selectedSize".to_owned(), json!(size));
        }
        if kind == CollectionKind::Cart {
            map.insert("quantity".to_owned(), json!(self.quantity));
        }
        map
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use antenka_core::UserId;

    fn product_doc() -> Document {
        Document::new(
            "p1",
            fields(json!({
                "name": "Linen Shirt",
                "price": "1200",
                "image": "https://img.example.com/p1.jpg",
                "sizes": ["S", "M", "L"],
                "sizingType": "clothing",
                "createdAt": "2026-08-01T12:00:00Z",
            })),
        )
    }

    #[test]
    fn test_product_coercion() {
        let product = Product::from_document(&product_doc());
        assert_eq!(product.id, ProductId::new("p1"));
        assert_eq!(product.price, Decimal::from(1200));
        assert_eq!(product.sizes, ["S", "M", "L"]);
        assert_eq!(product.sizing_type, SizingType::Clothing);
        assert!(product.requires_size());
    }

    #[test]
    fn test_product_defaults_on_missing() {
        let product = Product::from_document(&Document::new("p2", Fields::new()));
        assert_eq!(product.name, "");
        assert_eq!(product.price, Decimal::ZERO);
        assert!(product.sizes.is_empty());
        assert!(!product.requires_size());
        assert_eq!(product.sizing_type, SizingType::None);
    }

    #[test]
    fn test_line_item_snapshot_written_as_numbers() {
        let product = Product::from_document(&product_doc());
        let line = LineItem::snapshot_of(&product, Some("M"), 1);
        let map = line.to_fields(CollectionKind::Cart);

        // Price entered the system as the string "1200" but is persisted numeric
        assert!(map["price"].is_number());
        assert_eq!(map["quantity"], json!(1));
        assert_eq!(map["selectedSize"], json!("M"));
    }

    #[test]
    fn test_wishlist_fields_omit_quantity() {
        let product = Product::from_document(&product_doc());
        let line = LineItem::snapshot_of(&product, Some("M"), 1);
        let map = line.to_fields(CollectionKind::Wishlist);
        assert!(!map.contains_key("quantity"));
    }

    #[test]
    fn test_identity_key_includes_size() {
        let product = Product::from_document(&product_doc());
        let line = LineItem::snapshot_of(&product, Some("M"), 1);

        assert!(line.identity_matches(&ProductId::new("p1"), Some("M")));
        assert!(!line.identity_matches(&ProductId::new("p1"), Some("L")));
        assert!(!line.identity_matches(&ProductId::new("p1"), None));
        assert!(!line.identity_matches(&ProductId::new("p2"), Some("M")));
    }

    #[test]
    fn test_collection_paths() {
        let user = UserId::new("u-9");
        assert_eq!(CollectionKind::Cart.path(&user), "users/u-9/cart");
        assert_eq!(CollectionKind::Wishlist.path(&user), "users/u-9/wishlist");
    }
}
