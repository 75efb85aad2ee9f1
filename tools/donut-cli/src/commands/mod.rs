//! CLI command implementations.

pub mod config;
pub mod key;

use clap::{Args, Subcommand};

/// Arguments for the key command.
#[derive(Args)]
pub struct KeyArgs {
    /// Request fixture file (TOML or JSON).
    pub fixture: String,

    /// Also print the resolved identity and parameter set.
    #[arg(short, long)]
    pub explain: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Validate a config file.
    Validate {
        /// Config file to check (default: the loaded config).
        path: Option<String>,
    },
}
