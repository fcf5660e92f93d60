//! Document State - the raw, persistable half of a document
//!
//! Holds the id, the attribute store and the embedding store, plus the
//! parent handle when the document lives embedded in another one. Typed memo
//! slots live next to it on the model struct.

use serde_json::Value;

use crate::backends::Record;
use crate::model::descriptor::ModelDescriptor;
use crate::model::primary_key::DocumentId;
use crate::model::Attributes;
use crate::relationships::embedding::{Embedding, EmbeddingStore, ParentHandle};

/// Raw state owned by every document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentState {
    id: Option<DocumentId>,
    attributes: Attributes,
    embedded: EmbeddingStore,
    parent: Option<ParentHandle>,
}

impl DocumentState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build state from a raw mapping, moving entries whose key is a
    /// declared embed name into the embedding store
    pub fn from_attributes(attributes: Attributes, descriptor: &ModelDescriptor) -> Self {
        let mut state = Self::new();
        state.load(attributes, descriptor);
        state
    }

    /// Build state from a persisted record
    pub fn from_record(record: Record, descriptor: &ModelDescriptor) -> Self {
        let mut state = Self::from_attributes(record.attributes, descriptor);
        state.id = record.id;
        state
    }

    /// Persistable form of this state
    pub fn to_record(&self) -> Record {
        Record {
            id: self.id.clone(),
            attributes: self.snapshot(),
        }
    }

    /// Replace id, attributes and embeddings with a freshly loaded record.
    /// The parent handle is kept.
    pub fn replace(&mut self, record: Record, descriptor: &ModelDescriptor) {
        self.attributes = Attributes::new();
        self.embedded = EmbeddingStore::new();
        self.load(record.attributes, descriptor);
        self.id = record.id;
    }

    fn load(&mut self, attributes: Attributes, descriptor: &ModelDescriptor) {
        for (name, value) in attributes {
            if descriptor.is_embedded_name(&name) {
                if let Some(embedding) = Embedding::from_value(&value) {
                    self.embedded.insert(&name, embedding);
                    continue;
                }
            }
            self.attributes.insert(name, value);
        }
    }

    /// Raw mapping with embeddings folded back under their names
    pub fn snapshot(&self) -> Attributes {
        let mut snapshot = self.attributes.clone();
        for (name, embedding) in self.embedded.iter() {
            snapshot.insert(name.to_string(), embedding.to_value());
        }
        snapshot
    }

    pub fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    pub fn set_id(&mut self, id: Option<DocumentId>) {
        self.id = id;
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.attributes.insert(name.into(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.attributes.remove(name)
    }

    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    pub fn embedded(&self) -> &EmbeddingStore {
        &self.embedded
    }

    pub fn embedded_mut(&mut self) -> &mut EmbeddingStore {
        &mut self.embedded
    }

    pub fn parent(&self) -> Option<&ParentHandle> {
        self.parent.as_ref()
    }

    pub fn set_parent(&mut self, parent: ParentHandle) {
        self.parent = Some(parent);
    }
}
