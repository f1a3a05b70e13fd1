//! Coerces the parsed upstream payload into an ordered list of records.
//!
//! The upstream shape is undocumented and has been seen as a bare array, an
//! object wrapping an array, and an object keyed by item. Precedence:
//! 1. an array is used as-is;
//! 2. an object with an array under `data`, `items` or `products` (in that order);
//! 3. any other object: its values that are records with both `id` and `name`;
//! 4. anything else yields nothing.

use serde_json::{Map, Value};

use crate::model::StockItem;

/// Wrapper keys checked, in order, for an embedded item array.
pub const WRAPPER_KEYS: [&str; 3] = ["data", "items", "products"];

/// The observed payload shapes, resolved once per payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PayloadShape<'a> {
    /// Already a list of records.
    Sequence(&'a [Value]),
    /// An object carrying the list under one of [`WRAPPER_KEYS`].
    KeyedWithSequence {
        /// The wrapper key that matched.
        key: &'static str,
        /// The wrapped list.
        items: &'a [Value],
    },
    /// An object whose values are the records themselves.
    KeyedRecordMap(&'a Map<String, Value>),
    /// Null or a primitive.
    Empty,
}

impl<'a> PayloadShape<'a> {
    /// Classifies `payload` following the precedence above.
    pub fn classify(payload: &'a Value) -> Self {
        match payload {
            Value::Array(items) => PayloadShape::Sequence(items),
            Value::Object(map) => WRAPPER_KEYS
                .iter()
                .copied()
                .find_map(|key| match map.get(key) {
                    Some(Value::Array(items)) => {
                        Some(PayloadShape::KeyedWithSequence { key, items })
                    }
                    _ => None,
                })
                .unwrap_or(PayloadShape::KeyedRecordMap(map)),
            _ => PayloadShape::Empty,
        }
    }

    /// The records this shape yields, untouched.
    pub fn records(&self) -> Vec<Value> {
        match self {
            PayloadShape::Sequence(items) => items.to_vec(),
            PayloadShape::KeyedWithSequence { items, .. } => items.to_vec(),
            PayloadShape::KeyedRecordMap(map) => {
                map.values().filter(|v| is_record(v)).cloned().collect()
            }
            PayloadShape::Empty => Vec::new(),
        }
    }
}

fn is_record(v: &Value) -> bool {
    v.as_object()
        .is_some_and(|o| o.contains_key("id") && o.contains_key("name"))
}

/// Raw records in payload order, never failing.
pub fn normalize_records(payload: &Value) -> Vec<Value> {
    PayloadShape::classify(payload).records()
}

/// Records viewed as [`StockItem`]s.
pub fn normalize(payload: &Value) -> Vec<StockItem> {
    normalize_records(payload)
        .iter()
        .map(StockItem::from_record)
        .collect()
}
