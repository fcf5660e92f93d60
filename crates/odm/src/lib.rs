//! # elif-odm: Document Mapping for elif.rs
//!
//! Association and embedding engine for documents kept in a schema-less
//! key-value store. Five association kinds are supported: singular
//! references, reverse lookups, ordered id-list collections, embedded
//! documents and embedded document collections.
//!
//! Models are plain structs deriving `Document`; each association gets a
//! memo slot and typed accessors. Targets are named, not linked, and are
//! resolved lazily through a `ModelRegistry` populated at startup.

extern crate self as elif_odm;

pub mod backends;
pub mod config;
pub mod error;
pub mod model;
pub mod naming;
pub mod relationships;

// Re-export core traits and types
pub use backends::{DocumentStore, MemoryStore, Record, StoreStats};
pub use config::{ConfigError, IdStrategy, OdmConfig};
pub use error::{ModelError, ModelResult};
pub use model::{
    AttributeOptions, Attributes, CrudOperations, Document, DocumentId, DocumentState, Model,
    ModelDescriptor, ModelDescriptorBuilder, ModelExtensions,
};
pub use relationships::{
    Association, AssociationKind, Embedding, EmbeddingStore, Memo, ModelHandle, ModelRegistry,
    ParentHandle,
};

pub use elif_odm_derive::Document;
