//! Model Extensions - generic attribute access for documents

use serde_json::Value;

use crate::error::{ModelError, ModelResult};
use crate::model::core_trait::Model;
use crate::relationships::embedding::ParentHandle;

/// Extension trait for models with additional utility methods
pub trait ModelExtensions: Model {
    /// Read a raw attribute
    fn attribute(&self, name: &str) -> Option<&Value> {
        self.state().get(name)
    }

    /// Write a raw attribute. Attributes owned by an association are
    /// refused; use the association's writer instead.
    fn set_attribute(&mut self, name: &str, value: Value) -> ModelResult<()> {
        let descriptor = Self::descriptor();
        if descriptor.is_reader_only(name) || descriptor.is_embedded_name(name) {
            return Err(ModelError::ReadOnlyAttribute {
                model: descriptor.qualified_name().to_string(),
                attribute: name.to_string(),
            });
        }

        self.state_mut().set(name, value);
        Ok(())
    }

    fn is_persisted(&self) -> bool {
        self.state().is_persisted()
    }

    /// Parent this document is embedded in, if any
    fn parent(&self) -> Option<&ParentHandle> {
        self.state().parent()
    }
}

impl<T: Model> ModelExtensions for T {}
