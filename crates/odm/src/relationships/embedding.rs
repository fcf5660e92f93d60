//! Embedding Store - inline storage for embedded documents
//!
//! Embedded documents are not persisted on their own. Their raw attribute
//! mappings live inside the parent, keyed by the embed name, and travel with
//! the parent's record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::model::primary_key::DocumentId;
use crate::model::Attributes;

/// One embedding entry: a single mapping (`embed`) or a sequence of mappings
/// (`embed_collection`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Embedding {
    One(Attributes),
    Many(Vec<Attributes>),
}

impl Embedding {
    /// Interpret a raw value as an embedding entry
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Embedding::One(map.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Object(map) => Some(map.clone()),
                    _ => None,
                })
                .collect::<Option<Vec<_>>>()
                .map(Embedding::Many),
            _ => None,
        }
    }

    /// Raw value representation of this entry
    pub fn to_value(&self) -> Value {
        match self {
            Embedding::One(attributes) => Value::Object(attributes.clone()),
            Embedding::Many(items) => {
                Value::Array(items.iter().cloned().map(Value::Object).collect())
            }
        }
    }
}

/// Per-document map of embed name to embedded raw mappings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmbeddingStore {
    entries: BTreeMap<String, Embedding>,
}

impl EmbeddingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Embedding> {
        self.entries.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Single embedded mapping stored under `name`
    pub fn one(&self, name: &str) -> Option<&Attributes> {
        match self.entries.get(name)? {
            Embedding::One(attributes) => Some(attributes),
            Embedding::Many(_) => None,
        }
    }

    /// Embedded mapping sequence stored under `name`
    pub fn many(&self, name: &str) -> Option<&[Attributes]> {
        match self.entries.get(name)? {
            Embedding::Many(items) => Some(items.as_slice()),
            Embedding::One(_) => None,
        }
    }

    /// Replace the single mapping stored under `name`
    pub fn put(&mut self, name: &str, attributes: Attributes) {
        self.entries
            .insert(name.to_string(), Embedding::One(attributes));
    }

    /// Append a mapping to the sequence stored under `name`
    pub fn push(&mut self, name: &str, attributes: Attributes) {
        match self.entries.get_mut(name) {
            Some(Embedding::Many(items)) => items.push(attributes),
            _ => {
                self.entries
                    .insert(name.to_string(), Embedding::Many(vec![attributes]));
            }
        }
    }

    /// Insert a raw entry, as read back from a persisted record
    pub fn insert(&mut self, name: &str, embedding: Embedding) {
        self.entries.insert(name.to_string(), embedding);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Embedding)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Non-owning back-reference from an embedded document to its parent
///
/// Identifies the parent by model name and id; it never keeps the parent
/// alive and never forms a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ParentHandle {
    pub model: String,
    pub id: Option<DocumentId>,
    pub association: String,
}

impl ParentHandle {
    pub fn new(model: impl Into<String>, id: Option<DocumentId>, association: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            id,
            association: association.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping(value: Value) -> Attributes {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_entries_exist_only_when_assigned() {
        let mut store = EmbeddingStore::new();
        assert!(store.is_empty());
        assert!(store.one("address").is_none());
        assert!(store.many("authors").is_none());

        store.put("address", mapping(json!({"city": "Lisbon"})));
        assert!(store.contains("address"));
        assert!(!store.contains("authors"));
    }

    #[test]
    fn test_push_grows_in_order() {
        let mut store = EmbeddingStore::new();
        store.push("authors", mapping(json!({"name": "Ann"})));
        store.push("authors", mapping(json!({"name": "Bob"})));

        let names: Vec<&Value> = store
            .many("authors")
            .unwrap()
            .iter()
            .map(|author| &author["name"])
            .collect();
        assert_eq!(names, vec![&json!("Ann"), &json!("Bob")]);
        assert!(store.one("authors").is_none());
    }

    #[test]
    fn test_put_replaces() {
        let mut store = EmbeddingStore::new();
        store.put("address", mapping(json!({"city": "Lisbon"})));
        store.put("address", mapping(json!({"city": "Porto"})));
        assert_eq!(store.one("address").unwrap()["city"], json!("Porto"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_embedding_value_round_trip() {
        let one = json!({"city": "Lisbon", "zip": 1000});
        let many = json!([{"name": "Ann"}, {"name": "Bob"}]);

        assert_eq!(Embedding::from_value(&one).unwrap().to_value(), one);
        assert_eq!(Embedding::from_value(&many).unwrap().to_value(), many);
        assert!(Embedding::from_value(&json!("plain")).is_none());
        assert!(Embedding::from_value(&json!([1, 2])).is_none());
    }

    #[test]
    fn test_store_serializes_as_plain_map() {
        let mut store = EmbeddingStore::new();
        store.put("address", mapping(json!({"city": "Lisbon"})));
        store.push("authors", mapping(json!({"name": "Ann"})));

        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(
            value,
            json!({"address": {"city": "Lisbon"}, "authors": [{"name": "Ann"}]})
        );

        let back: EmbeddingStore = serde_json::from_value(value).unwrap();
        assert_eq!(back, store);
    }
}
