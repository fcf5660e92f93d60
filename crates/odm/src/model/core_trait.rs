//! Core Model Trait - base definition for mapped documents
//!
//! `Model` is the typed side implemented (normally derived) by each document
//! struct. `Document` is the object-safe view the association engine works
//! with when an assigned object's concrete type is not yet known.

use std::any::Any;
use std::fmt::Debug;

use crate::backends::Record;
use crate::model::descriptor::ModelDescriptor;
use crate::model::primary_key::DocumentId;
use crate::model::state::DocumentState;
use crate::model::Attributes;
use crate::relationships::embedding::ParentHandle;

/// Object-safe view of any mapped document
pub trait Document: Any + Debug {
    /// Qualified name of the document's model
    fn model_name(&self) -> &str;

    fn id(&self) -> Option<&DocumentId>;

    /// Raw attribute snapshot, embeddings folded in
    fn attributes(&self) -> Attributes;

    /// Whether the document may be stored inside another one
    fn is_embeddable(&self) -> bool;

    /// Record the parent this document is embedded in
    fn set_parent(&mut self, parent: ParentHandle);

    fn as_any(&self) -> &dyn Any;
}

/// Core trait for mapped document types
pub trait Model: Clone + Debug + Send + Sync + 'static {
    /// Declaration table for this model, built once
    fn descriptor() -> &'static ModelDescriptor;

    fn state(&self) -> &DocumentState;

    fn state_mut(&mut self) -> &mut DocumentState;

    /// Build a document around existing state, all memo slots unresolved
    fn from_state(state: DocumentState) -> Self;

    /// Drop every resolved association value
    fn reset_associations(&mut self);

    /// Create a document from a persisted record
    fn from_record(record: Record) -> Self {
        Self::from_state(DocumentState::from_record(record, Self::descriptor()))
    }

    /// Create an unsaved document from a raw attribute mapping
    fn from_attributes(attributes: Attributes) -> Self {
        Self::from_state(DocumentState::from_attributes(attributes, Self::descriptor()))
    }
}

impl<M: Model> Document for M {
    fn model_name(&self) -> &str {
        M::descriptor().qualified_name()
    }

    fn id(&self) -> Option<&DocumentId> {
        self.state().id()
    }

    fn attributes(&self) -> Attributes {
        self.state().snapshot()
    }

    fn is_embeddable(&self) -> bool {
        M::descriptor().is_embeddable()
    }

    fn set_parent(&mut self, parent: ParentHandle) {
        self.state_mut().set_parent(parent);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
