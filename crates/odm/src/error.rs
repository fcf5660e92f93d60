//! Error types for the document mapping layer
//!
//! Two errors originate in the association engine itself: `InvalidClass`
//! (wrong document type assigned) and `NotEmbeddable` (document lacks the
//! embeddable capability). Everything else either describes a configuration
//! problem or passes a collaborator failure through unchanged.

use thiserror::Error;

/// Result type alias for model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error types for document and association operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Assigned document is not of the association's declared target type
    #[error("Invalid class for association '{association}': expected {expected}, got {actual}")]
    InvalidClass {
        association: String,
        expected: String,
        actual: String,
    },

    /// Assigned document does not declare itself embeddable
    #[error("Cannot embed {model} through '{association}': model is not embeddable")]
    NotEmbeddable { association: String, model: String },

    /// Association target name does not match any registered model
    #[error("Unresolved model '{name}' declared in {declared_in}")]
    UnresolvedModel { name: String, declared_in: String },

    /// Equality lookup on an attribute that carries no index
    #[error("No index on attribute '{attribute}' of model {model}")]
    IndexNotFound { model: String, attribute: String },

    /// Attribute is owned by an association and only writable through it
    #[error("Attribute '{attribute}' of model {model} is reader-only")]
    ReadOnlyAttribute { model: String, attribute: String },

    /// Primary key is missing (document never persisted)
    #[error("Primary key is missing or invalid")]
    MissingPrimaryKey,

    /// Record not found in the store
    #[error("Record not found for model '{0}'")]
    NotFound(String),

    /// Invalid model or registry configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Failure reported by the persistence collaborator
    #[error("Store error: {0}")]
    Store(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_class_display() {
        let err = ModelError::InvalidClass {
            association: "post".to_string(),
            expected: "Post".to_string(),
            actual: "Comment".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid class for association 'post': expected Post, got Comment"
        );
    }

    #[test]
    fn test_serde_error_conversion() {
        let err: ModelError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, ModelError::Serialization(_)));
    }
}
