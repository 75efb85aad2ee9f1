//! CLI configuration.

use anyhow::{Context, Result};
use donut_cache::KeyBuilderConfig;
use serde::{Deserialize, Serialize};

/// CLI configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CliConfig {
    /// Key rendering configuration.
    #[serde(default)]
    pub keys: KeyBuilderConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: CliConfig = toml::from_str("").unwrap();
        assert_eq!(config.keys, KeyBuilderConfig::default());
    }

    #[test]
    fn test_keys_section() {
        let config: CliConfig = toml::from_str(
            r#"
            [keys]
            prefix = "frag:"
            hash_parameters = true
            "#,
        )
        .unwrap();

        assert_eq!(config.keys.prefix, "frag:");
        assert!(config.keys.hash_parameters);
    }
}
