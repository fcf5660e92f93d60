//! Model Descriptor - per-model declaration table built once at definition time
//!
//! `ModelDescriptor::builder` is the declaration surface: attributes, indices
//! and the five association kinds. `#[derive(Document)]` emits a builder
//! chain from `#[document(...)]` attributes and caches the result in a static.

use std::collections::BTreeSet;

use crate::error::{ModelError, ModelResult};
use crate::naming::reverse_attribute_name;
use crate::relationships::metadata::{Association, AssociationKind};

/// Options accepted by `attribute_with`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttributeOptions {
    /// Only readable through generic accessors; writes go through the
    /// owning association
    pub reader_only: bool,
}

impl AttributeOptions {
    pub fn reader_only() -> Self {
        Self { reader_only: true }
    }
}

/// A declared raw attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDeclaration {
    pub name: String,
    pub options: AttributeOptions,
}

/// Immutable description of a model and its associations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelDescriptor {
    name: String,
    namespace: Option<String>,
    qualified_name: String,
    embeddable: bool,
    attributes: Vec<AttributeDeclaration>,
    indices: BTreeSet<String>,
    associations: Vec<Association>,
    embedded_names: BTreeSet<String>,
}

impl ModelDescriptor {
    /// Start declaring a model named `name`
    pub fn builder(name: impl Into<String>) -> ModelDescriptorBuilder {
        ModelDescriptorBuilder::new(name)
    }

    /// Model name without namespace
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Registry key: `Namespace::Name`, or the plain name
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn is_embeddable(&self) -> bool {
        self.embeddable
    }

    pub fn attributes(&self) -> &[AttributeDeclaration] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&AttributeDeclaration> {
        self.attributes.iter().find(|attribute| attribute.name == name)
    }

    pub fn is_reader_only(&self, name: &str) -> bool {
        self.attribute(name)
            .map(|attribute| attribute.options.reader_only)
            .unwrap_or(false)
    }

    pub fn indices(&self) -> impl Iterator<Item = &str> {
        self.indices.iter().map(String::as_str)
    }

    pub fn is_indexed(&self, attribute: &str) -> bool {
        self.indices.contains(attribute)
    }

    pub fn associations(&self) -> &[Association] {
        &self.associations
    }

    /// Look up an association by name
    pub fn association(&self, name: &str) -> ModelResult<&Association> {
        self.associations
            .iter()
            .find(|association| association.name == name)
            .ok_or_else(|| {
                ModelError::Configuration(format!(
                    "Model '{}' declares no association '{}'",
                    self.qualified_name, name
                ))
            })
    }

    /// Names registered by `embed` / `embed_collection`
    pub fn embedded_names(&self) -> &BTreeSet<String> {
        &self.embedded_names
    }

    pub fn is_embedded_name(&self, name: &str) -> bool {
        self.embedded_names.contains(name)
    }

    /// Validate the descriptor for consistency
    pub fn validate(&self) -> ModelResult<()> {
        if self.name.is_empty() {
            return Err(ModelError::Configuration(
                "Model descriptor has an empty name".to_string(),
            ));
        }

        let mut seen = BTreeSet::new();
        for association in &self.associations {
            association.validate()?;

            if !seen.insert(association.name.as_str()) {
                return Err(ModelError::Configuration(format!(
                    "Association '{}' declared twice in model '{}'",
                    association.name, self.qualified_name
                )));
            }
        }

        for name in &self.embedded_names {
            if self.attribute(name).is_some() {
                return Err(ModelError::Configuration(format!(
                    "Embedded name '{}' clashes with an attribute of model '{}'",
                    name, self.qualified_name
                )));
            }
        }

        Ok(())
    }
}

/// Builder populating a `ModelDescriptor`
#[derive(Debug, Clone)]
pub struct ModelDescriptorBuilder {
    name: String,
    namespace: Option<String>,
    embeddable: bool,
    attributes: Vec<AttributeDeclaration>,
    indices: BTreeSet<String>,
    associations: Vec<Association>,
    embedded_names: BTreeSet<String>,
}

impl ModelDescriptorBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            embeddable: false,
            attributes: Vec::new(),
            indices: BTreeSet::new(),
            associations: Vec::new(),
            embedded_names: BTreeSet::new(),
        }
    }

    /// Place the model in a namespace; associations resolve there first
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Mark documents of this model as embeddable
    pub fn embeddable(mut self) -> Self {
        self.embeddable = true;
        self
    }

    /// Declare a raw attribute
    pub fn attribute(self, name: impl Into<String>) -> Self {
        self.attribute_with(name, AttributeOptions::default())
    }

    /// Declare a raw attribute with options
    pub fn attribute_with(mut self, name: impl Into<String>, options: AttributeOptions) -> Self {
        let name = name.into();
        match self.attributes.iter_mut().find(|attribute| attribute.name == name) {
            Some(existing) => existing.options = options,
            None => self.attributes.push(AttributeDeclaration { name, options }),
        }
        self
    }

    /// Mark an attribute queryable by equality
    pub fn index(mut self, name: impl Into<String>) -> Self {
        self.indices.insert(name.into());
        self
    }

    /// Singular foreign key: declares indexed, reader-only `<name>_id`
    pub fn reference(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        let name = name.into();
        let id_attribute = format!("{}_id", name);
        self.attribute_with(id_attribute.clone(), AttributeOptions::reader_only())
            .index(id_attribute)
            .associate(Association::new(name, AssociationKind::Reference, target))
    }

    /// Reverse lookup with the reverse attribute derived from this model's name
    pub fn referenced(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        let reverse = reverse_attribute_name(&self.name);
        self.referenced_with(name, target, reverse)
    }

    /// Reverse lookup on `<reverse>_id` of the target
    pub fn referenced_with(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        reverse: impl Into<String>,
    ) -> Self {
        self.associate(
            Association::new(name, AssociationKind::Referenced, target).with_reverse(reverse),
        )
    }

    /// Ordered id-list collection with the reverse attribute derived from
    /// this model's name
    pub fn collection(self, name: impl Into<String>, target: impl Into<String>) -> Self {
        let reverse = reverse_attribute_name(&self.name);
        self.collection_with(name, target, reverse)
    }

    /// Ordered id-list collection: declares reader-only `<name>_ids`.
    ///
    /// `reverse` is recorded for documentation only; membership is always
    /// the locally stored id list.
    pub fn collection_with(
        self,
        name: impl Into<String>,
        target: impl Into<String>,
        reverse: impl Into<String>,
    ) -> Self {
        let name = name.into();
        self.attribute_with(format!("{}_ids", name), AttributeOptions::reader_only())
            .associate(
                Association::new(name, AssociationKind::Collection, target).with_reverse(reverse),
            )
    }

    /// Single embedded document
    pub fn embed(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        let name = name.into();
        self.embedded_names.insert(name.clone());
        self.associate(Association::new(name, AssociationKind::Embed, target))
    }

    /// Grow-only sequence of embedded documents
    pub fn embed_collection(mut self, name: impl Into<String>, target: impl Into<String>) -> Self {
        let name = name.into();
        self.embedded_names.insert(name.clone());
        self.associate(Association::new(name, AssociationKind::EmbedCollection, target))
    }

    fn associate(mut self, association: Association) -> Self {
        self.associations.push(association);
        self
    }

    /// Finish the declaration
    pub fn build(self) -> ModelDescriptor {
        let qualified_name = match &self.namespace {
            Some(namespace) => format!("{}::{}", namespace, self.name),
            None => self.name.clone(),
        };

        let associations = self
            .associations
            .into_iter()
            .map(|association| association.declared_in(qualified_name.clone(), self.namespace.clone()))
            .collect();

        ModelDescriptor {
            name: self.name,
            namespace: self.namespace,
            qualified_name,
            embeddable: self.embeddable,
            attributes: self.attributes,
            indices: self.indices,
            associations,
            embedded_names: self.embedded_names,
        }
    }
}
