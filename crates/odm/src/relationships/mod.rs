//! Relationships Module - association declarations, resolution and caching
//!
//! Each association kind has its own engine module exposing free functions
//! over `(association, state, memo)`. The derive macro wires them into
//! typed accessors on the model.

pub mod collection;
pub mod embed;
pub mod embedding;
pub mod memo;
pub mod metadata;
pub mod reference;
pub mod referenced;
pub mod registry;


use crate::error::{ModelError, ModelResult};
use crate::model::core_trait::{Document, Model};

pub use embedding::{Embedding, EmbeddingStore, ParentHandle};
pub use memo::Memo;
pub use metadata::{Association, AssociationKind};
pub use registry::{ModelHandle, ModelRegistry};

/// View `document` as the association's target type, or fail with
/// `InvalidClass`
pub(crate) fn downcast<'a, T: Model>(
    association: &Association,
    document: &'a dyn Document,
) -> ModelResult<&'a T> {
    document
        .as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| ModelError::InvalidClass {
            association: association.name.clone(),
            expected: association.target.clone(),
            actual: document.model_name().to_string(),
        })
}
