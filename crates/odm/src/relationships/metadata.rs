//! Association Metadata - immutable declarations describing each association

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};

/// The five association kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssociationKind {
    /// Singular foreign key stored as `<name>_id`
    Reference,
    /// Read-only reverse lookup through the target's index
    Referenced,
    /// Ordered id list stored as `<name>_ids`
    Collection,
    /// Single embedded document stored inline
    Embed,
    /// Sequence of embedded documents stored inline
    EmbedCollection,
}

impl AssociationKind {
    /// Returns true if this association resolves to a sequence
    pub fn is_plural(self) -> bool {
        matches!(self, Self::Collection | Self::EmbedCollection)
    }

    /// Returns true if the child state lives inside the parent
    pub fn is_embedded(self) -> bool {
        matches!(self, Self::Embed | Self::EmbedCollection)
    }

    /// Returns true if resolving this association goes through a store
    pub fn is_store_backed(self) -> bool {
        !self.is_embedded()
    }

    /// Raw attribute written by this association, if any
    pub fn storage_attribute(self, name: &str) -> Option<String> {
        match self {
            Self::Reference => Some(format!("{}_id", name)),
            Self::Collection => Some(format!("{}_ids", name)),
            Self::Referenced | Self::Embed | Self::EmbedCollection => None,
        }
    }
}

/// Declaration of one association on one model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Association {
    /// Association name (accessor name on the model)
    pub name: String,

    /// The kind of association
    pub kind: AssociationKind,

    /// Target model name, resolved lazily through the registry
    pub target: String,

    /// Reverse attribute name (`referenced` queries `<reverse>_id`;
    /// recorded but unused for `collection`)
    pub reverse: Option<String>,

    /// Qualified name of the declaring model
    pub declared_in: String,

    /// Namespace of the declaring model, searched first on resolution
    pub namespace: Option<String>,
}

impl Association {
    /// Create a new association declaration
    pub fn new(name: impl Into<String>, kind: AssociationKind, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            target: target.into(),
            reverse: None,
            declared_in: String::new(),
            namespace: None,
        }
    }

    pub fn with_reverse(mut self, reverse: impl Into<String>) -> Self {
        self.reverse = Some(reverse.into());
        self
    }

    pub fn declared_in(mut self, model: impl Into<String>, namespace: Option<String>) -> Self {
        self.declared_in = model.into();
        self.namespace = namespace;
        self
    }

    /// Raw attribute owned by this association (`<name>_id` / `<name>_ids`)
    pub fn storage_attribute(&self) -> Option<String> {
        self.kind.storage_attribute(&self.name)
    }

    /// Attribute queried on the target for reverse lookups (`<reverse>_id`)
    pub fn reverse_key(&self) -> Option<String> {
        self.reverse.as_ref().map(|reverse| format!("{}_id", reverse))
    }

    /// Validate the declaration for consistency
    pub fn validate(&self) -> ModelResult<()> {
        if self.name.is_empty() {
            return Err(ModelError::Configuration(format!(
                "Association of kind {:?} in model '{}' has an empty name",
                self.kind, self.declared_in
            )));
        }

        if self.target.is_empty() {
            return Err(ModelError::Configuration(format!(
                "Association '{}' in model '{}' has no target model",
                self.name, self.declared_in
            )));
        }

        if self.kind == AssociationKind::Referenced && self.reverse.is_none() {
            return Err(ModelError::Configuration(format!(
                "Referenced association '{}' in model '{}' requires a reverse attribute",
                self.name, self.declared_in
            )));
        }

        Ok(())
    }
}
