//! In-memory document store

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use serde_json::Value;
use uuid::Uuid;

use crate::backends::core::{DocumentStore, Record, StoreStats};
use crate::config::{IdStrategy, OdmConfig};
use crate::error::ModelResult;
use crate::model::primary_key::DocumentId;

/// Records of one model, kept in insertion order
#[derive(Debug, Default)]
struct Collection {
    order: Vec<DocumentId>,
    records: HashMap<DocumentId, Record>,
    next_id: u64,
}

impl Collection {
    /// Next free id; sequential ids skip any key already taken
    fn allocate(&mut self, strategy: IdStrategy) -> DocumentId {
        match strategy {
            IdStrategy::Sequential => loop {
                self.next_id += 1;
                let id = DocumentId::from(self.next_id);
                if !self.records.contains_key(&id) {
                    break id;
                }
            },
            IdStrategy::Uuid => DocumentId::new(Uuid::new_v4().to_string()),
        }
    }

    /// Keep the counter ahead of numeric ids supplied by callers
    fn observe(&mut self, id: &DocumentId) {
        if let Ok(n) = id.as_str().parse::<u64>() {
            self.next_id = self.next_id.max(n);
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    gets: AtomicU64,
    finds: AtomicU64,
    alls: AtomicU64,
    saves: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// In-memory store backed by a concurrent map of per-model collections
#[derive(Debug)]
pub struct MemoryStore {
    collections: DashMap<String, Collection>,
    config: OdmConfig,
    counters: Counters,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_config(OdmConfig::default())
    }

    pub fn with_config(config: OdmConfig) -> Self {
        Self {
            collections: DashMap::new(),
            config,
            counters: Counters::default(),
        }
    }

    pub fn config(&self) -> &OdmConfig {
        &self.config
    }

    /// Number of records stored for `model`
    pub fn count(&self, model: &str) -> usize {
        self.collections
            .get(model)
            .map(|collection| collection.order.len())
            .unwrap_or(0)
    }

    /// Reset lookup counters
    pub fn reset_stats(&self) {
        self.counters.gets.store(0, Ordering::Relaxed);
        self.counters.finds.store(0, Ordering::Relaxed);
        self.counters.alls.store(0, Ordering::Relaxed);
        self.counters.saves.store(0, Ordering::Relaxed);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, model: &str, id: &DocumentId) -> ModelResult<Option<Record>> {
        Counters::bump(&self.counters.gets);
        tracing::debug!(model, id = %id, "store get");

        Ok(self
            .collections
            .get(model)
            .and_then(|collection| collection.records.get(id).cloned()))
    }

    fn find(&self, model: &str, attribute: &str, value: &Value) -> ModelResult<Vec<Record>> {
        Counters::bump(&self.counters.finds);
        tracing::debug!(model, attribute, %value, "store find");

        let Some(collection) = self.collections.get(model) else {
            return Ok(Vec::new());
        };

        Ok(collection
            .order
            .iter()
            .filter_map(|id| collection.records.get(id))
            .filter(|record| record.get(attribute) == Some(value))
            .cloned()
            .collect())
    }

    fn all(&self, model: &str, ids: Option<&[DocumentId]>) -> ModelResult<Vec<Record>> {
        Counters::bump(&self.counters.alls);
        tracing::debug!(model, requested = ?ids.map(<[DocumentId]>::len), "store all");

        let Some(collection) = self.collections.get(model) else {
            return Ok(Vec::new());
        };

        let order = ids.unwrap_or(collection.order.as_slice());
        Ok(order
            .iter()
            .filter_map(|id| collection.records.get(id).cloned())
            .collect())
    }

    fn save(&self, model: &str, mut record: Record) -> ModelResult<DocumentId> {
        Counters::bump(&self.counters.saves);

        let mut collection = self.collections.entry(model.to_string()).or_default();
        let id = match record.id.clone() {
            Some(id) => {
                collection.observe(&id);
                id
            }
            None => collection.allocate(self.config.id_strategy),
        };
        record.id = Some(id.clone());

        if collection.records.insert(id.clone(), record).is_none() {
            collection.order.push(id.clone());
        }

        tracing::debug!(model, id = %id, "store save");
        Ok(id)
    }

    fn stats(&self) -> StoreStats {
        StoreStats {
            gets: self.counters.gets.load(Ordering::Relaxed),
            finds: self.counters.finds.load(Ordering::Relaxed),
            alls: self.counters.alls.load(Ordering::Relaxed),
            saves: self.counters.saves.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(attributes) => Record::new(None, attributes),
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_sequential_ids_per_model() {
        let store = MemoryStore::new();
        let first = store.save("Post", record(json!({"title": "a"}))).unwrap();
        let second = store.save("Post", record(json!({"title": "b"}))).unwrap();
        let comment = store.save("Comment", record(json!({}))).unwrap();

        assert_eq!(first.as_str(), "1");
        assert_eq!(second.as_str(), "2");
        assert_eq!(comment.as_str(), "1");
        assert_eq!(store.count("Post"), 2);
    }

    #[test]
    fn test_uuid_ids() {
        let store = MemoryStore::with_config(OdmConfig::new().with_id_strategy(IdStrategy::Uuid));
        let id = store.save("Post", record(json!({}))).unwrap();
        assert!(Uuid::parse_str(id.as_str()).is_ok());
    }

    #[test]
    fn test_save_with_id_updates_in_place() {
        let store = MemoryStore::new();
        let id = store.save("Post", record(json!({"title": "a"}))).unwrap();

        let mut updated = record(json!({"title": "b"}));
        updated.id = Some(id.clone());
        store.save("Post", updated).unwrap();

        assert_eq!(store.count("Post"), 1);
        let loaded = store.get("Post", &id).unwrap().unwrap();
        assert_eq!(loaded.get("title"), Some(&json!("b")));
        assert_eq!(loaded.id, Some(id));
    }

    #[test]
    fn test_allocation_skips_explicit_ids() {
        let store = MemoryStore::new();

        let mut explicit = record(json!({"title": "explicit"}));
        explicit.id = Some(DocumentId::from("1"));
        store.save("Post", explicit).unwrap();

        let fresh = store.save("Post", record(json!({"title": "fresh"}))).unwrap();
        assert_eq!(fresh.as_str(), "2");
        assert_eq!(store.count("Post"), 2);

        let first = store.get("Post", &DocumentId::from("1")).unwrap().unwrap();
        assert_eq!(first.get("title"), Some(&json!("explicit")));

        let mut far = record(json!({}));
        far.id = Some(DocumentId::from("10"));
        store.save("Post", far).unwrap();
        let mut named = record(json!({}));
        named.id = Some(DocumentId::from("draft"));
        store.save("Post", named).unwrap();

        let next = store.save("Post", record(json!({}))).unwrap();
        assert_eq!(next.as_str(), "11");
        assert_eq!(store.count("Post"), 5);
    }

    #[test]
    fn test_find_by_equality_in_insertion_order() {
        let store = MemoryStore::new();
        store.save("Comment", record(json!({"post_id": "1", "body": "x"}))).unwrap();
        store.save("Comment", record(json!({"post_id": "2", "body": "y"}))).unwrap();
        store.save("Comment", record(json!({"post_id": "1", "body": "z"}))).unwrap();

        let found = store.find("Comment", "post_id", &json!("1")).unwrap();
        let bodies: Vec<&Value> = found.iter().filter_map(|r| r.get("body")).collect();
        assert_eq!(bodies, vec![&json!("x"), &json!("z")]);

        assert!(store.find("Missing", "post_id", &json!("1")).unwrap().is_empty());
    }

    #[test]
    fn test_all_with_ids_keeps_order_and_duplicates() {
        let store = MemoryStore::new();
        let a = store.save("Comment", record(json!({"body": "a"}))).unwrap();
        let b = store.save("Comment", record(json!({"body": "b"}))).unwrap();
        let missing = DocumentId::from("99");

        let ids = vec![b.clone(), missing, a.clone(), b.clone()];
        let found = store.all("Comment", Some(&ids)).unwrap();
        let found_ids: Vec<DocumentId> = found.into_iter().filter_map(|r| r.id).collect();
        assert_eq!(found_ids, vec![b.clone(), a.clone(), b]);

        assert_eq!(store.all("Comment", None).unwrap().len(), 2);
    }

    #[test]
    fn test_stats() {
        let store = MemoryStore::new();
        let id = store.save("Post", record(json!({}))).unwrap();
        store.get("Post", &id).unwrap();
        store.find("Post", "title", &json!("a")).unwrap();
        store.all("Post", None).unwrap();

        let stats = store.stats();
        assert_eq!(stats.saves, 1);
        assert_eq!(stats.lookups(), 3);

        store.reset_stats();
        assert_eq!(store.stats(), StoreStats::default());
    }
}
