//! Key builder configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::key::{DefaultKeyBuilder, HashedKeyBuilder, KeyBuilder, DEFAULT_KEY_PREFIX};

/// Errors loading key builder configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid TOML.
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid JSON.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),
}

/// How cache keys are rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBuilderConfig {
    /// Prefix for every key.
    pub prefix: String,
    /// Replace the parameter portion of keys with a SHA-256 digest.
    pub hash_parameters: bool,
}

impl Default for KeyBuilderConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_KEY_PREFIX.to_string(),
            hash_parameters: false,
        }
    }
}

impl KeyBuilderConfig {
    /// Parse from TOML.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Parse from JSON.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a file. `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&content)
        } else {
            Self::from_toml_str(&content)
        }
    }

    /// Build the configured key builder.
    pub fn into_builder(self) -> Box<dyn KeyBuilder> {
        let builder = DefaultKeyBuilder::new().with_prefix(self.prefix);
        if self.hash_parameters {
            Box::new(HashedKeyBuilder::new(builder))
        } else {
            Box::new(builder)
        }
    }
}
