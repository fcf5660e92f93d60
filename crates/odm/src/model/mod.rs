//! Model System - document types and their raw state
//!
//! - `core_trait`: `Model` and the object-safe `Document` view
//! - `descriptor`: per-model declaration table and its builder
//! - `state`: id, attribute store, embedding store and parent handle
//! - `primary_key`: document identifiers
//! - `crud_operations`: create, save, reload and lookups
//! - `extensions`: generic attribute access

pub mod core_trait;
pub mod crud_operations;
pub mod descriptor;
pub mod extensions;
pub mod primary_key;
pub mod state;

/// Raw attribute mapping of a document
pub type Attributes = serde_json::Map<String, serde_json::Value>;

pub use core_trait::{Document, Model};
pub use crud_operations::CrudOperations;
pub use descriptor::{AttributeDeclaration, AttributeOptions, ModelDescriptor, ModelDescriptorBuilder};
pub use extensions::ModelExtensions;
pub use primary_key::DocumentId;
pub use state::DocumentState;
