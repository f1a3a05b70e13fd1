use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Lenient view over one upstream stock record.
///
/// Only `id`, `name` and `inStock` drive the watcher; every other field is
/// kept in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    /// Identity key. `Null` when the record has no `id`.
    #[serde(default)]
    pub id: Value,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Availability flag.
    #[serde(rename = "inStock", default)]
    pub in_stock: bool,
    /// Passthrough fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl StockItem {
    /// Builds the view from an arbitrary record without failing.
    ///
    /// A missing name renders as `undefined`, a non-string name as its JSON
    /// text, and `inStock` follows JSON truthiness.
    pub fn from_record(record: &Value) -> Self {
        let Some(obj) = record.as_object() else {
            return Self {
                id: Value::Null,
                name: "undefined".to_string(),
                in_stock: false,
                extra: Map::new(),
            };
        };

        let name = match obj.get("name") {
            None => "undefined".to_string(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        };

        let extra = obj
            .iter()
            .filter(|(k, _)| !matches!(k.as_str(), "id" | "name" | "inStock"))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Self {
            id: obj.get("id").cloned().unwrap_or(Value::Null),
            name,
            in_stock: obj.get("inStock").is_some_and(truthy),
            extra,
        }
    }

    /// Listing line used by the current-stock report.
    pub fn status_line(&self) -> String {
        let status = if self.in_stock { "In Stock" } else { "Out of Stock" };
        format!("{}: {}", self.name, status)
    }
}

/// JSON truthiness: `false`, `null`, `0`, and `""` are false.
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Classification of a single detected change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// First run, item currently in stock.
    NewItemInStock,
    /// Id not present in the previous snapshot (reported regardless of availability).
    ItemAdded,
    /// Previously out of stock, now in stock.
    ItemRestocked,
}

/// One detected change; renders as the human-readable notification line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Change {
    /// What happened.
    pub kind: ChangeKind,
    /// Display name of the item it happened to.
    pub name: String,
}

impl Change {
    /// Creates a change record for the named item.
    pub fn new(kind: ChangeKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
        }
    }
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ChangeKind::NewItemInStock => write!(f, "{} is in stock (New Item)", self.name),
            ChangeKind::ItemAdded => write!(f, "{} was added to stock", self.name),
            ChangeKind::ItemRestocked => write!(f, "{} is back in stock", self.name),
        }
    }
}
