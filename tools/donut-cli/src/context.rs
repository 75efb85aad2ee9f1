//! CLI execution context.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::config::CliConfig;
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the configuration came from, if a file was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output) -> Result<Self> {
        if let Some(path) = config_path {
            return Ok(Self {
                config: CliConfig::load(path)?,
                config_path: Some(PathBuf::from(path)),
                output,
            });
        }

        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        // Try to find config in current directory or parent directories
        let (config, config_path) = match Self::find_config(&cwd) {
            Some((config, path)) => (config, Some(path)),
            None => (CliConfig::default(), None),
        };

        Ok(Self {
            config,
            config_path,
            output,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(CliConfig, PathBuf)> {
        let config_names = ["donut.toml", ".donut.toml", "donut.json"];

        let mut current = start.to_path_buf();
        loop {
            for name in &config_names {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = CliConfig::load(config_path.to_str()?) {
                        return Some((config, config_path));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }
}
