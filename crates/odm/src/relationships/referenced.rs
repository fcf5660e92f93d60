//! Referenced - read-only reverse lookup through the target's index on
//! `<reverse>_id`

use crate::error::{ModelError, ModelResult};
use crate::model::core_trait::Model;
use crate::model::state::DocumentState;
use super::memo::Memo;
use super::metadata::Association;
use super::registry::ModelRegistry;

/// First target document whose `<reverse>_id` equals this document's id.
///
/// An unsaved document answers `None` without querying and without
/// memoizing anything.
pub fn read<'m, T: Model>(
    association: &Association,
    state: &DocumentState,
    memo: &'m mut Memo<Option<T>>,
    models: &ModelRegistry,
) -> ModelResult<Option<&'m T>> {
    let Some(id) = state.id() else {
        return Ok(None);
    };

    let value = memo.get_or_try_resolve(&association.name, || -> ModelResult<Option<T>> {
        let reverse_key = association.reverse_key().ok_or_else(|| {
            ModelError::Configuration(format!(
                "Referenced association '{}' in model '{}' has no reverse attribute",
                association.name, association.declared_in
            ))
        })?;

        let handle = models.resolve_as::<T>(association)?;
        tracing::debug!(
            association = %association.name,
            model = handle.name(),
            attribute = %reverse_key,
            id = %id,
            "resolving referenced"
        );

        let found = handle.find(&reverse_key, &id.to_value())?;
        Ok(found.into_iter().next().map(T::from_record))
    })?;

    Ok(value.as_ref())
}
