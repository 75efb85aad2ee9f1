//! Cache key derivation for request fixtures.

use std::path::Path;

use anyhow::{Context as _, Result};
use donut_cache::{CacheKey, KeyBuilder, KeyGenerator, ResolvedKeyInput, StaticVaryByCustom};
use donut_core::{CacheSettings, RequestSnapshot};
use serde::{Deserialize, Serialize};

use super::KeyArgs;
use crate::context::Context;

/// A recorded request plus the settings of the fragment rendered for it.
#[derive(Debug, Deserialize)]
pub struct Fixture {
    /// The request.
    pub request: RequestSnapshot,
    /// Fragment cache settings.
    #[serde(default)]
    pub settings: CacheSettings,
    /// Fixed values for vary-by-custom hooks.
    #[serde(default)]
    pub custom: StaticVaryByCustom,
}

impl Fixture {
    /// Load a fixture. `.json` files are parsed as JSON, anything else as TOML.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture: {}", path.display()))?;

        if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON fixture: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML fixture: {}", path.display()))
        }
    }

    /// Resolve the key input once and render it with `builder`.
    pub fn derive_key<B: KeyBuilder>(self, builder: B) -> Result<(CacheKey, ResolvedKeyInput)> {
        let generator = KeyGenerator::new(builder).with_custom_vary(self.custom);
        let input = generator
            .resolve(&self.request, &self.settings)
            .context("Failed to generate cache key")?;
        let key = generator.builder().build_key(
            &input.identity.controller,
            &input.identity.action,
            &input.parameters,
        );
        Ok((key, input))
    }
}

#[derive(Serialize)]
struct KeyReport<'a> {
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    input: Option<&'a ResolvedKeyInput>,
}

/// Run the key command.
pub fn run(args: KeyArgs, ctx: &Context) -> Result<()> {
    let fixture = Fixture::load(Path::new(&args.fixture))?;
    ctx.output.debug(&format!("Loaded fixture {}", args.fixture));

    let vary = fixture.settings.vary_rule().to_string();
    let (key, input) = fixture.derive_key(ctx.config.keys.clone().into_builder())?;
    let input = args.explain.then_some(input);

    if ctx.output.is_json() {
        ctx.output.json(&KeyReport {
            key: key.as_str(),
            input: input.as_ref(),
        });
        return Ok(());
    }

    match input {
        Some(input) => {
            ctx.output.header("Cache Key");
            ctx.output.kv("key", key.as_str());
            ctx.output.kv("controller", &input.identity.controller);
            ctx.output.kv("action", &input.identity.action);
            if let Some(area) = &input.identity.area {
                ctx.output.kv("area", area);
            }
            ctx.output.kv("vary", &vary);
            ctx.output.kv("parameters", &input.parameters.to_string());
        }
        None => ctx.output.plain(key.as_str()),
    }

    Ok(())
}
