//! Collection - ordered id list stored as `<name>_ids`
//!
//! Membership is exactly the locally stored list. The declared reverse
//! attribute is never consulted.

use crate::error::{ModelError, ModelResult};
use crate::model::core_trait::{Document, Model};
use crate::model::primary_key::DocumentId;
use crate::model::state::DocumentState;
use super::memo::Memo;
use super::metadata::Association;
use super::registry::ModelRegistry;
use super::downcast;

/// Current ordered id list
pub fn ids(association: &Association, state: &DocumentState) -> Vec<DocumentId> {
    association
        .storage_attribute()
        .and_then(|attribute| state.get(&attribute).map(DocumentId::list_from_value))
        .unwrap_or_default()
}

/// Replace the id list and drop the memoized members
pub fn set_ids<T>(
    association: &Association,
    state: &mut DocumentState,
    memo: &mut Memo<Vec<T>>,
    ids: Vec<DocumentId>,
) {
    write_ids(association, state, &ids);
    memo.invalidate();
}

/// Members in stored order. Unsaved documents have no members; ids the
/// store cannot find are skipped.
pub fn read<'m, T: Model>(
    association: &Association,
    state: &DocumentState,
    memo: &'m mut Memo<Vec<T>>,
    models: &ModelRegistry,
) -> ModelResult<&'m [T]> {
    if !state.is_persisted() {
        return Ok(&[]);
    }

    let members = memo.get_or_try_resolve(&association.name, || -> ModelResult<Vec<T>> {
        let ids = ids(association, state);
        let handle = models.resolve_as::<T>(association)?;
        tracing::debug!(
            association = %association.name,
            model = handle.name(),
            count = ids.len(),
            "resolving collection"
        );

        Ok(handle
            .all(Some(&ids))?
            .into_iter()
            .map(T::from_record)
            .collect())
    })?;

    Ok(members.as_slice())
}

/// Append a saved document; `MissingPrimaryKey` when it has no id. Its id
/// joins the stored list; the document joins the memoized members only when
/// they were already resolved.
pub fn add<T: Model>(
    association: &Association,
    state: &mut DocumentState,
    memo: &mut Memo<Vec<T>>,
    document: &dyn Document,
) -> ModelResult<()> {
    let item = downcast::<T>(association, document)?;
    let id = item.state().id().cloned().ok_or(ModelError::MissingPrimaryKey)?;

    let mut ids = ids(association, state);
    ids.push(id);
    write_ids(association, state, &ids);

    if let Some(members) = memo.get_mut() {
        members.push(item.clone());
    }
    Ok(())
}

fn write_ids(association: &Association, state: &mut DocumentState, ids: &[DocumentId]) {
    if let Some(attribute) = association.storage_attribute() {
        state.set(attribute, DocumentId::list_to_value(ids));
    }
}
