//! CRUD Operations - persistence lifecycle for documents
//!
//! Thin typed layer over the registered `DocumentStore`: create, save,
//! reload and the three lookups the association engine relies on.

use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::model::core_trait::Model;
use crate::model::primary_key::DocumentId;
use crate::model::Attributes;
use crate::relationships::registry::ModelRegistry;

/// Trait providing persistence operations for models
pub trait CrudOperations: Model {
    /// Build a document from raw attributes and save it
    fn create(models: &ModelRegistry, attributes: Attributes) -> ModelResult<Self> {
        let mut document = Self::from_attributes(attributes);
        document.save(models)?;
        Ok(document)
    }

    /// Persist the document, allocating an id on first save
    fn save(&mut self, models: &ModelRegistry) -> ModelResult<DocumentId> {
        let handle = models.handle_of::<Self>()?;
        let id = handle.save(self.state().to_record())?;
        self.state_mut().set_id(Some(id.clone()));
        Ok(id)
    }

    /// Reload id, attributes and embeddings from the store and drop every
    /// memoized association value
    fn reload(&mut self, models: &ModelRegistry) -> ModelResult<()> {
        let id = self.state().id().cloned().ok_or(ModelError::MissingPrimaryKey)?;
        let handle = models.handle_of::<Self>()?;

        let record = handle
            .get(&id)?
            .ok_or_else(|| ModelError::NotFound(format!("{}({})", handle.name(), id)))?;

        self.state_mut().replace(record, Self::descriptor());
        self.reset_associations();
        Ok(())
    }

    /// Fetch a document by id
    fn get(models: &ModelRegistry, id: &DocumentId) -> ModelResult<Option<Self>> {
        let handle = models.handle_of::<Self>()?;
        Ok(handle.get(id)?.map(Self::from_record))
    }

    /// Documents whose `attribute` equals `value`
    fn find(models: &ModelRegistry, attribute: &str, value: &Value) -> ModelResult<Vec<Self>> {
        let handle = models.handle_of::<Self>()?;
        Ok(handle
            .find(attribute, value)?
            .into_iter()
            .map(Self::from_record)
            .collect())
    }

    /// Every document, or the documents named by `ids` in that order
    fn all(models: &ModelRegistry, ids: Option<&[DocumentId]>) -> ModelResult<Vec<Self>> {
        let handle = models.handle_of::<Self>()?;
        Ok(handle
            .all(ids)?
            .into_iter()
            .map(Self::from_record)
            .collect())
    }
}

impl<T: Model> CrudOperations for T {}
