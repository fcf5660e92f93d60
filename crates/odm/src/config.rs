//! Configuration for the document mapping layer
//!
//! Settings are plain data with sensible defaults; `OdmConfig::from_env`
//! overlays `ELIF_ODM_*` environment variables on top of the defaults.

use std::env;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::error::ModelError;

/// Environment variable selecting the id allocation strategy
pub const ID_STRATEGY_VAR: &str = "ELIF_ODM_ID_STRATEGY";

/// Environment variable toggling strict index checks on `find`
pub const STRICT_INDEXES_VAR: &str = "ELIF_ODM_STRICT_INDEXES";

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Invalid value for field '{field}': '{value}'. Expected: {expected}")]
    InvalidValue {
        field: String,
        value: String,
        expected: String,
    },
}

impl From<ConfigError> for ModelError {
    fn from(err: ConfigError) -> Self {
        ModelError::Configuration(err.to_string())
    }
}

/// How a store allocates ids for documents saved without one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdStrategy {
    /// Per-model counter: "1", "2", "3", ...
    #[default]
    Sequential,
    /// Random v4 UUIDs
    Uuid,
}

impl FromStr for IdStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sequential" | "counter" => Ok(IdStrategy::Sequential),
            "uuid" => Ok(IdStrategy::Uuid),
            _ => Err(ConfigError::InvalidValue {
                field: "id_strategy".to_string(),
                value: s.to_string(),
                expected: "sequential or uuid".to_string(),
            }),
        }
    }
}

impl fmt::Display for IdStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdStrategy::Sequential => write!(f, "sequential"),
            IdStrategy::Uuid => write!(f, "uuid"),
        }
    }
}

/// Document mapping configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OdmConfig {
    /// Id allocation used by the in-memory store
    pub id_strategy: IdStrategy,
    /// Reject `find` on attributes that were never declared as indices
    pub strict_indexes: bool,
}

impl OdmConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self {
            id_strategy: IdStrategy::Sequential,
            strict_indexes: true,
        }
    }

    /// Permissive configuration: any attribute may be queried
    pub fn permissive() -> Self {
        Self {
            strict_indexes: false,
            ..Self::new()
        }
    }

    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.id_strategy = id_strategy;
        self
    }

    pub fn with_strict_indexes(mut self, strict_indexes: bool) -> Self {
        self.strict_indexes = strict_indexes;
        self
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::new();

        if let Ok(strategy) = env::var(ID_STRATEGY_VAR) {
            config.id_strategy = strategy.parse()?;
        }

        if let Ok(strict) = env::var(STRICT_INDEXES_VAR) {
            config.strict_indexes = parse_bool(STRICT_INDEXES_VAR, &strict)?;
        }

        Ok(config)
    }
}

impl Default for OdmConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_bool(field: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            expected: "true or false".to_string(),
        }),
    }
}
