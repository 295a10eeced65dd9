//! Comparisons and lengths over JSON values

use std::cmp::Ordering;

use serde_json::Value;

use super::message::display_value;

/// Order two values of the same kind.
///
/// Numbers compare numerically, strings lexically and booleans false
/// before true. Anything else is incomparable.
pub fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Length of a value: null is empty, strings count characters, arrays count
/// items, objects count keys, anything else counts its rendered characters.
pub fn value_length(value: &Value) -> usize {
    match value {
        Value::Null => 0,
        Value::String(text) => text.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => display_value(other).chars().count(),
    }
}
