//! A single configuration layer.

use std::collections::BTreeMap;

use crate::error::HatchError;

use super::value::Value;

/// One immutable source of configuration values.
///
/// The origin names where the layer came from (usually a file path) and is
/// quoted in every error raised about the layer's contents.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLayer {
    origin: String,
    root: Value,
}

impl ConfigLayer {
    /// Creates a layer from a table of top-level entries.
    pub fn new(origin: impl Into<String>, entries: BTreeMap<String, Value>) -> Self {
        Self {
            origin: origin.into(),
            root: Value::Table(entries),
        }
    }

    /// Creates an empty layer.
    pub fn empty(origin: impl Into<String>) -> Self {
        Self::new(origin, BTreeMap::new())
    }

    /// Creates a layer from a JSON document whose root must be an object.
    pub fn from_json(origin: impl Into<String>, json: serde_json::Value) -> Result<Self, HatchError> {
        let origin = origin.into();
        match Value::from(json) {
            root @ Value::Table(_) => Ok(Self { origin, root }),
            other => Err(HatchError::invalid_layer(
                &origin,
                format!("root must be a table, got {}", other.type_name()),
            )),
        }
    }

    /// Returns a copy of this layer with `value` stored at the dotted `path`,
    /// creating intermediate tables as needed.
    pub fn with(mut self, path: &str, value: impl Into<Value>) -> Self {
        let segments: Vec<&str> = path.split('.').collect();
        if let Value::Table(table) = &mut self.root {
            insert_path(table, &segments, value.into());
        }
        self
    }

    /// Where this layer came from.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Reads the value at `path` followed by the dotted `key`.
    ///
    /// `None` means absent; an explicit null is `Some(&Value::Null)`.
    pub fn get(&self, path: &[String], key: &str) -> Option<&Value> {
        self.root
            .lookup(path.iter().map(String::as_str).chain(key.split('.')))
    }
}

fn insert_path(table: &mut BTreeMap<String, Value>, segments: &[&str], value: Value) {
    match segments {
        [] => {}
        [last] => {
            table.insert(last.to_string(), value);
        }
        [head, rest @ ..] => {
            let child = table
                .entry(head.to_string())
                .or_insert_with(|| Value::Table(BTreeMap::new()));
            // Scalars on the way are replaced by tables.
            if !matches!(child, Value::Table(_)) {
                *child = Value::Table(BTreeMap::new());
            }
            if let Value::Table(inner) = child {
                insert_path(inner, rest, value);
            }
        }
    }
}
