//! Key-value document form of a markup tree

use serde_json::{Map, Value};

/// Reserved mapping key holding an element's attributes
pub const ATTRIBUTES_KEY: &str = "@attributes";

/// Reserved mapping key holding an element's text when it cannot be a bare scalar
pub const TEXT_KEY: &str = "#text";

/// Recursive key-value value: a scalar, a mapping or a sequence.
///
/// Sequences appear whenever two or more sibling elements share a tag. A
/// single child stays a bare value, so a consumer cannot tell "one child"
/// from "a list of one" by looking at the document alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentValue {
    Scalar(String),
    Mapping(Vec<(String, DocumentValue)>),
    Sequence(Vec<DocumentValue>),
}

impl DocumentValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        DocumentValue::Scalar(value.into())
    }

    pub fn empty_mapping() -> Self {
        DocumentValue::Mapping(Vec::new())
    }

    /// Look up a key in a mapping
    pub fn get(&self, key: &str) -> Option<&DocumentValue> {
        match self {
            DocumentValue::Mapping(entries) => {
                entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
            }
            _ => None,
        }
    }

    /// Insert into a mapping, replacing an existing key. No-op on other variants.
    pub fn insert(&mut self, key: impl Into<String>, value: DocumentValue) {
        if let DocumentValue::Mapping(entries) = self {
            let key = key.into();
            match entries.iter_mut().find(|(k, _)| *k == key) {
                Some(entry) => entry.1 = value,
                None => entries.push((key, value)),
            }
        }
    }

    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            DocumentValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[DocumentValue]> {
        match self {
            DocumentValue::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, DocumentValue::Mapping(_))
    }

    /// Build from parsed JSON. Non-string scalars keep their JSON text; `null` becomes "".
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => DocumentValue::Scalar(String::new()),
            Value::Bool(b) => DocumentValue::Scalar(b.to_string()),
            Value::Number(n) => DocumentValue::Scalar(n.to_string()),
            Value::String(s) => DocumentValue::Scalar(s.clone()),
            Value::Array(items) => {
                DocumentValue::Sequence(items.iter().map(DocumentValue::from_json).collect())
            }
            Value::Object(map) => DocumentValue::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), DocumentValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Convert to a JSON value; scalars are always JSON strings
    pub fn to_json(&self) -> Value {
        match self {
            DocumentValue::Scalar(s) => Value::String(s.clone()),
            DocumentValue::Sequence(items) => {
                Value::Array(items.iter().map(DocumentValue::to_json).collect())
            }
            DocumentValue::Mapping(entries) => {
                let mut map = Map::with_capacity(entries.len());
                for (k, v) in entries {
                    map.insert(k.clone(), v.to_json());
                }
                Value::Object(map)
            }
        }
    }
}
