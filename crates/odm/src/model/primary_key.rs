//! Document identifiers
//!
//! Key-value stores address documents by opaque string keys, so ids are kept
//! as strings. Numeric ids coming back from raw attributes are accepted and
//! normalized to their decimal form.

use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifier of a persisted document
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Raw attribute representation of this id
    pub fn to_value(&self) -> Value {
        Value::String(self.0.clone())
    }

    /// Read an id out of a raw attribute value.
    ///
    /// Strings and numbers are ids; `null`, empty strings and anything else
    /// mean "no id".
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.is_empty() => Some(Self(s.clone())),
            Value::Number(n) => Some(Self(n.to_string())),
            _ => None,
        }
    }

    /// Read an ordered id list out of a raw attribute value, skipping entries
    /// that are not ids
    pub fn list_from_value(value: &Value) -> Vec<Self> {
        match value {
            Value::Array(items) => items.iter().filter_map(Self::from_value).collect(),
            _ => Vec::new(),
        }
    }

    /// Raw attribute representation of an ordered id list
    pub fn list_to_value(ids: &[DocumentId]) -> Value {
        Value::Array(ids.iter().map(DocumentId::to_value).collect())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for DocumentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for DocumentId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<DocumentId> for Value {
    fn from(id: DocumentId) -> Self {
        Value::String(id.0)
    }
}
