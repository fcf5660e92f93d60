//! Core Store Traits
//!
//! The persistence collaborator seen by the mapping layer: a key-value store
//! keyed by model name and document id, with equality lookups on indexed
//! attributes. Errors raised by an implementation reach callers unchanged.

use std::fmt::Debug;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ModelResult;
use crate::model::primary_key::DocumentId;
use crate::model::Attributes;

/// Persisted form of a document: id plus raw attribute mapping, with
/// embeddings folded in under their embed names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: Option<DocumentId>,
    pub attributes: Attributes,
}

impl Record {
    pub fn new(id: Option<DocumentId>, attributes: Attributes) -> Self {
        Self { id, attributes }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }
}

/// Abstract document store
pub trait DocumentStore: Send + Sync + Debug {
    /// Fetch one record by id
    fn get(&self, model: &str, id: &DocumentId) -> ModelResult<Option<Record>>;

    /// Records whose `attribute` equals `value`, in insertion order
    fn find(&self, model: &str, attribute: &str, value: &Value) -> ModelResult<Vec<Record>>;

    /// All records of a model, or exactly the records named by `ids` in the
    /// given order. Ids that match nothing are skipped.
    fn all(&self, model: &str, ids: Option<&[DocumentId]>) -> ModelResult<Vec<Record>>;

    /// Insert or update a record, allocating an id when it has none
    fn save(&self, model: &str, record: Record) -> ModelResult<DocumentId>;

    /// Lookup counters
    fn stats(&self) -> StoreStats;
}

/// Store statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub gets: u64,
    pub finds: u64,
    pub alls: u64,
    pub saves: u64,
}

impl StoreStats {
    /// Read operations issued against the store
    pub fn lookups(&self) -> u64 {
        self.gets + self.finds + self.alls
    }
}
