//! Embed / Embed Collection - documents stored inline in their parent
//!
//! The parent's embedding store holds the raw mappings; memo slots hold the
//! typed documents built from them. Every materialized or assigned child
//! carries a `ParentHandle` back to the parent.

use crate::error::{ModelError, ModelResult};
use crate::model::core_trait::{Document, Model};
use crate::model::state::DocumentState;
use crate::model::Attributes;
use super::embedding::ParentHandle;
use super::memo::Memo;
use super::metadata::Association;
use super::downcast;

fn parent_handle(association: &Association, state: &DocumentState) -> ParentHandle {
    ParentHandle::new(
        association.declared_in.clone(),
        state.id().cloned(),
        association.name.clone(),
    )
}

/// Embeddable capability check, then type check
fn embeddable<'a, T: Model>(
    association: &Association,
    document: &'a dyn Document,
) -> ModelResult<&'a T> {
    if !document.is_embeddable() {
        return Err(ModelError::NotEmbeddable {
            association: association.name.clone(),
            model: document.model_name().to_string(),
        });
    }

    downcast::<T>(association, document)
}

fn materialize<T: Model>(
    association: &Association,
    state: &DocumentState,
    attributes: &Attributes,
) -> T {
    let mut child = T::from_attributes(attributes.clone());
    child.set_parent(parent_handle(association, state));
    child
}

/// Embedded document, built from the stored mapping on first read.
/// `None` when nothing was ever assigned.
pub fn read<'m, T: Model>(
    association: &Association,
    state: &DocumentState,
    memo: &'m mut Memo<Option<T>>,
) -> Option<&'m T> {
    if !memo.is_resolved() && !state.embedded().contains(&association.name) {
        return None;
    }

    let child = memo.get_or_resolve(&association.name, || {
        tracing::trace!(association = %association.name, "materializing embedded document");
        state
            .embedded()
            .one(&association.name)
            .map(|attributes| materialize(association, state, attributes))
    });

    // the parent may have been saved since the child was cached
    if let Some(document) = child.as_mut() {
        document.set_parent(parent_handle(association, state));
    }
    child.as_ref()
}

/// Store a copy of `document` inline and memoize it. The memoized copy
/// carries the parent handle; `document` itself is left untouched.
pub fn assign<T: Model>(
    association: &Association,
    state: &mut DocumentState,
    memo: &mut Memo<Option<T>>,
    document: &dyn Document,
) -> ModelResult<()> {
    let mut child = embeddable::<T>(association, document)?.clone();
    child.set_parent(parent_handle(association, state));

    state.embedded_mut().put(&association.name, child.attributes());
    memo.set(Some(child));
    Ok(())
}

/// Embedded documents in stored order; empty when nothing was ever added
pub fn read_many<'m, T: Model>(
    association: &Association,
    state: &DocumentState,
    memo: &'m mut Memo<Vec<T>>,
) -> &'m [T] {
    if !memo.is_resolved() && !state.embedded().contains(&association.name) {
        return &[];
    }

    let children = memo.get_or_resolve(&association.name, || {
        tracing::trace!(association = %association.name, "materializing embedded documents");
        state
            .embedded()
            .many(&association.name)
            .unwrap_or_default()
            .iter()
            .map(|attributes| materialize(association, state, attributes))
            .collect()
    });

    for child in children.iter_mut() {
        child.set_parent(parent_handle(association, state));
    }
    children.as_slice()
}

/// Append a copy of `document`. It joins the memoized members only when
/// they were already materialized; the raw mapping is always appended.
/// Only the copy carries the parent handle.
pub fn push<T: Model>(
    association: &Association,
    state: &mut DocumentState,
    memo: &mut Memo<Vec<T>>,
    document: &dyn Document,
) -> ModelResult<()> {
    let mut child = embeddable::<T>(association, document)?.clone();
    child.set_parent(parent_handle(association, state));

    state.embedded_mut().push(&association.name, child.attributes());
    if let Some(members) = memo.get_mut() {
        members.push(child);
    }
    Ok(())
}
