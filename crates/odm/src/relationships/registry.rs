//! Model Registry - runtime name → model table used to resolve association
//! targets lazily

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::Value;

use crate::backends::{DocumentStore, Record};
use crate::config::OdmConfig;
use crate::error::{ModelError, ModelResult};
use crate::model::core_trait::Model;
use crate::model::descriptor::ModelDescriptor;
use crate::model::primary_key::DocumentId;
use super::metadata::Association;

/// A registered model: its declaration plus the store holding its records
#[derive(Debug, Clone)]
pub struct ModelHandle {
    descriptor: &'static ModelDescriptor,
    store: Arc<dyn DocumentStore>,
    strict_indexes: bool,
}

impl ModelHandle {
    pub fn descriptor(&self) -> &'static ModelDescriptor {
        self.descriptor
    }

    /// Qualified model name, also the key records are stored under
    pub fn name(&self) -> &str {
        self.descriptor.qualified_name()
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    pub fn get(&self, id: &DocumentId) -> ModelResult<Option<Record>> {
        self.store.get(self.name(), id)
    }

    /// Equality lookup; with strict indexes the attribute must be declared
    /// as an index
    pub fn find(&self, attribute: &str, value: &Value) -> ModelResult<Vec<Record>> {
        if self.strict_indexes && !self.descriptor.is_indexed(attribute) {
            return Err(ModelError::IndexNotFound {
                model: self.name().to_string(),
                attribute: attribute.to_string(),
            });
        }

        self.store.find(self.name(), attribute, value)
    }

    pub fn all(&self, ids: Option<&[DocumentId]>) -> ModelResult<Vec<Record>> {
        self.store.all(self.name(), ids)
    }

    pub fn save(&self, record: Record) -> ModelResult<DocumentId> {
        self.store.save(self.name(), record)
    }
}

/// Thread-safe model registry
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    /// Qualified model name -> handle
    models: Arc<DashMap<String, ModelHandle>>,
    config: OdmConfig,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    /// Create a new empty registry with the default configuration
    pub fn new() -> Self {
        Self::with_config(OdmConfig::default())
    }

    pub fn with_config(config: OdmConfig) -> Self {
        Self {
            models: Arc::new(DashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &OdmConfig {
        &self.config
    }

    /// Register a model type backed by `store`
    pub fn register<M: Model>(&self, store: Arc<dyn DocumentStore>) -> ModelResult<()> {
        self.register_descriptor(M::descriptor(), store)
    }

    /// Register a model by its descriptor
    pub fn register_descriptor(
        &self,
        descriptor: &'static ModelDescriptor,
        store: Arc<dyn DocumentStore>,
    ) -> ModelResult<()> {
        descriptor.validate()?;

        let name = descriptor.qualified_name().to_string();
        tracing::debug!(model = %name, "registering model");

        self.models.insert(
            name,
            ModelHandle {
                descriptor,
                store,
                strict_indexes: self.config.strict_indexes,
            },
        );
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Registered qualified names, sorted
    pub fn model_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.models.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn clear(&self) {
        self.models.clear();
    }

    /// Handle registered under an exact qualified name
    pub fn lookup(&self, name: &str) -> Option<ModelHandle> {
        self.models.get(name).map(|entry| entry.value().clone())
    }

    /// Resolve an association's target: the declaring model's namespace
    /// first, then the global scope
    pub fn resolve(&self, association: &Association) -> ModelResult<ModelHandle> {
        if let Some(namespace) = &association.namespace {
            let scoped = format!("{}::{}", namespace, association.target);
            if let Some(handle) = self.lookup(&scoped) {
                return Ok(handle);
            }
        }

        if let Some(handle) = self.lookup(&association.target) {
            return Ok(handle);
        }

        tracing::error!(
            target_model = %association.target,
            association = %association.name,
            declared_in = %association.declared_in,
            "unresolved association target"
        );
        Err(ModelError::UnresolvedModel {
            name: association.target.clone(),
            declared_in: association.declared_in.clone(),
        })
    }

    /// Resolve an association's target and check it is `T`
    pub fn resolve_as<T: Model>(&self, association: &Association) -> ModelResult<ModelHandle> {
        let handle = self.resolve(association)?;
        let expected = T::descriptor().qualified_name();

        if handle.name() != expected {
            return Err(ModelError::Configuration(format!(
                "Association '{}' in model '{}' resolves to '{}' but is typed as '{}'",
                association.name,
                association.declared_in,
                handle.name(),
                expected
            )));
        }

        Ok(handle)
    }

    /// Handle of a registered model type
    pub fn handle_of<M: Model>(&self) -> ModelResult<ModelHandle> {
        let name = M::descriptor().qualified_name();
        self.lookup(name).ok_or_else(|| {
            ModelError::Configuration(format!("Model '{}' is not registered", name))
        })
    }

    /// Resolve every store-backed association of every registered model
    pub fn validate(&self) -> ModelResult<()> {
        let handles: Vec<ModelHandle> = self.models.iter().map(|entry| entry.value().clone()).collect();

        for handle in handles {
            for association in handle.descriptor().associations() {
                if association.kind.is_store_backed() {
                    self.resolve(association)?;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::MemoryStore;
    use crate::relationships::metadata::AssociationKind;
    use std::sync::OnceLock;

    fn post() -> &'static ModelDescriptor {
        static DESCRIPTOR: OnceLock<ModelDescriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            ModelDescriptor::builder("Post")
                .collection("comments", "Comment")
                .build()
        })
    }

    fn comment() -> &'static ModelDescriptor {
        static DESCRIPTOR: OnceLock<ModelDescriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            ModelDescriptor::builder("Comment")
                .reference("post", "Post")
                .build()
        })
    }

    fn blog_comment() -> &'static ModelDescriptor {
        static DESCRIPTOR: OnceLock<ModelDescriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            ModelDescriptor::builder("Comment")
                .namespace("Blog")
                .build()
        })
    }

    fn blog_post() -> &'static ModelDescriptor {
        static DESCRIPTOR: OnceLock<ModelDescriptor> = OnceLock::new();
        DESCRIPTOR.get_or_init(|| {
            ModelDescriptor::builder("Post")
                .namespace("Blog")
                .collection("comments", "Comment")
                .reference("author", "Author")
                .build()
        })
    }

    fn registry() -> ModelRegistry {
        let registry = ModelRegistry::new();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        registry.register_descriptor(post(), store.clone()).unwrap();
        registry.register_descriptor(comment(), store).unwrap();
        registry
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = registry();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("Post"));
        assert_eq!(registry.model_names(), vec!["Comment".to_string(), "Post".to_string()]);
        assert_eq!(registry.lookup("Comment").unwrap().name(), "Comment");

        registry.clear();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_global() {
        let registry = registry();
        let association = post().association("comments").unwrap();
        assert_eq!(registry.resolve(association).unwrap().name(), "Comment");
    }

    #[test]
    fn test_resolve_prefers_namespace() {
        let registry = registry();
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        registry.register_descriptor(blog_comment(), store).unwrap();

        let association = blog_post().association("comments").unwrap();
        assert_eq!(registry.resolve(association).unwrap().name(), "Blog::Comment");

        let global = post().association("comments").unwrap();
        assert_eq!(registry.resolve(global).unwrap().name(), "Comment");
    }

    #[test]
    fn test_unresolved_target() {
        let registry = registry();
        let association = blog_post().association("author").unwrap();

        let error = registry.resolve(association).unwrap_err();
        assert_eq!(
            error,
            ModelError::UnresolvedModel {
                name: "Author".to_string(),
                declared_in: "Blog::Post".to_string(),
            }
        );

        // not cached: still failing on the next attempt
        assert!(registry.resolve(association).is_err());
    }

    #[test]
    fn test_validate() {
        let registry = registry();
        assert!(registry.validate().is_ok());

        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        registry.register_descriptor(blog_post(), store).unwrap();
        assert!(matches!(
            registry.validate(),
            Err(ModelError::UnresolvedModel { .. })
        ));
    }

    #[test]
    fn test_invalid_descriptor_is_rejected() {
        static DESCRIPTOR: OnceLock<ModelDescriptor> = OnceLock::new();
        let broken = DESCRIPTOR.get_or_init(|| {
            ModelDescriptor::builder("Broken")
                .reference("owner", "User")
                .embed("owner", "User")
                .build()
        });

        let registry = ModelRegistry::new();
        let result = registry.register_descriptor(broken, Arc::new(MemoryStore::new()));
        assert!(matches!(result, Err(ModelError::Configuration(_))));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_strict_index_check() {
        let registry = registry();
        let handle = registry.lookup("Comment").unwrap();

        assert!(handle.find("post_id", &Value::from("1")).unwrap().is_empty());
        assert_eq!(
            handle.find("body", &Value::from("x")).unwrap_err(),
            ModelError::IndexNotFound {
                model: "Comment".to_string(),
                attribute: "body".to_string(),
            }
        );

        let permissive = ModelRegistry::with_config(OdmConfig::permissive());
        permissive
            .register_descriptor(comment(), Arc::new(MemoryStore::new()))
            .unwrap();
        let handle = permissive.lookup("Comment").unwrap();
        assert!(handle.find("body", &Value::from("x")).is_ok());
    }

    #[test]
    fn test_embedded_targets_are_not_validated() {
        static DESCRIPTOR: OnceLock<ModelDescriptor> = OnceLock::new();
        let with_embed = DESCRIPTOR.get_or_init(|| {
            ModelDescriptor::builder("Letter")
                .embed("address", "Address")
                .build()
        });
        assert_eq!(with_embed.associations()[0].kind, AssociationKind::Embed);

        let registry = ModelRegistry::new();
        registry
            .register_descriptor(with_embed, Arc::new(MemoryStore::new()))
            .unwrap();
        assert!(registry.validate().is_ok());
    }
}
