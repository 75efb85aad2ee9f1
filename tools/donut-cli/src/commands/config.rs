//! Configuration management commands.

use anyhow::{bail, Result};
use donut_cache::KeyBuilderConfig;

use super::{ConfigArgs, ConfigCommand};
use crate::context::Context;

/// Run the config command.
pub fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Validate { path } => validate_config(path.as_deref(), ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("source", &path.display().to_string()),
        None => ctx.output.kv("source", "(defaults)"),
    }

    ctx.output.info("[keys]");
    ctx.output.kv("prefix", &ctx.config.keys.prefix);
    ctx.output
        .kv("hash_parameters", &ctx.config.keys.hash_parameters.to_string());

    Ok(())
}

fn validate_config(path: Option<&str>, ctx: &Context) -> Result<()> {
    let path = match path {
        Some(p) => p.to_string(),
        None => match &ctx.config_path {
            Some(p) => p.display().to_string(),
            None => bail!("No config file found. Pass a path to validate."),
        },
    };

    ctx.output.debug(&format!("Validating {}", path));
    let config = crate::config::CliConfig::load(&path)?;

    if config.keys.prefix.is_empty() {
        ctx.output.info("Key prefix is empty; keys will start with the controller name");
    }
    if config.keys == KeyBuilderConfig::default() {
        ctx.output.info("No [keys] overrides; using defaults");
    }

    ctx.output.success(&format!("{} is valid", path));
    Ok(())
}
