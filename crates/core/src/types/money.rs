//! Money coercion at the store boundary.
//!
//! Documents coming back from the hosted store are loosely typed: an order
//! `total` or a product `price` may arrive as a JSON number or as a numeric
//! string ("1200"). Aggregations must accept both without letting malformed
//! strings poison a sum, so coercion is strict: a string must match a plain
//! decimal pattern or it contributes nothing.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::Value;

/// Strict decimal pattern for numeric strings. Rejects signs, exponents,
/// grouping separators, and leading/trailing garbage.
static DECIMAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)] // pattern is a compile-time constant
    Regex::new(r"^[0-9]+(\.[0-9]+)?$").expect("valid decimal pattern")
});

/// Coerce a JSON value into a `Decimal` amount.
///
/// Accepts JSON numbers and strings matching the strict decimal pattern.
/// Everything else (null, malformed strings, objects) yields `None`.
#[must_use]
pub fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Decimal::from(i));
            }
            n.as_f64().and_then(Decimal::from_f64_retain)
        }
        Value::String(s) if DECIMAL_PATTERN.is_match(s) => s.parse().ok(),
        _ => None,
    }
}

/// Coerce a JSON value into a `Decimal`, defaulting to zero.
///
/// This is the summing form: non-numeric values contribute 0 rather than
/// failing the aggregation.
#[must_use]
pub fn coerce_decimal_or_zero(value: &Value) -> Decimal {
    coerce_decimal(value).unwrap_or_default()
}
