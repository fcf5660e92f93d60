//! Reference - singular foreign key stored as `<name>_id`

use crate::error::ModelResult;
use crate::model::core_trait::{Document, Model};
use crate::model::primary_key::DocumentId;
use crate::model::state::DocumentState;
use super::memo::Memo;
use super::metadata::Association;
use super::registry::ModelRegistry;
use super::downcast;

/// Current raw id stored under `<name>_id`
pub fn id(association: &Association, state: &DocumentState) -> Option<DocumentId> {
    let attribute = association.storage_attribute()?;
    state.get(&attribute).and_then(DocumentId::from_value)
}

/// Resolve the referenced document, memoizing the result.
///
/// An absent id resolves to `None` without a lookup.
pub fn read<'m, T: Model>(
    association: &Association,
    state: &DocumentState,
    memo: &'m mut Memo<Option<T>>,
    models: &ModelRegistry,
) -> ModelResult<Option<&'m T>> {
    let value = memo.get_or_try_resolve(&association.name, || -> ModelResult<Option<T>> {
        let Some(id) = id(association, state) else {
            return Ok(None);
        };

        let handle = models.resolve_as::<T>(association)?;
        tracing::debug!(
            association = %association.name,
            model = handle.name(),
            id = %id,
            "resolving reference"
        );
        Ok(handle.get(&id)?.map(T::from_record))
    })?;

    Ok(value.as_ref())
}

/// Overwrite the stored id; `None` removes it
pub fn set_id<T>(
    association: &Association,
    state: &mut DocumentState,
    memo: &mut Memo<Option<T>>,
    id: Option<DocumentId>,
) {
    memo.invalidate();
    write_id(association, state, id);
}

/// Assign a document (or nothing). The stored id follows the document's
/// id and the document itself is memoized, so the next read needs no lookup.
pub fn assign<T: Model>(
    association: &Association,
    state: &mut DocumentState,
    memo: &mut Memo<Option<T>>,
    document: Option<&dyn Document>,
) -> ModelResult<()> {
    let target = match document {
        Some(document) => Some(downcast::<T>(association, document)?.clone()),
        None => None,
    };

    write_id(association, state, target.as_ref().and_then(|target| target.state().id().cloned()));
    memo.set(target);
    Ok(())
}

fn write_id(association: &Association, state: &mut DocumentState, id: Option<DocumentId>) {
    let Some(attribute) = association.storage_attribute() else {
        return;
    };

    match id {
        Some(id) => state.set(attribute, id.to_value()),
        None => {
            state.remove(&attribute);
        }
    }
}
