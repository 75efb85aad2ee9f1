//! Host hook for application-defined vary dimensions.

use std::collections::HashMap;

use anyhow::anyhow;
use donut_core::RequestContext;
use serde::Deserialize;

/// Computes the value of a named custom vary dimension for a request.
///
/// What the value means (locale, device class, experiment bucket) is the
/// host's business; the pipeline only adds it to the parameter set.
pub trait VaryByCustomProvider: Send + Sync {
    /// Compute the value for `name` on this request.
    fn vary_by_custom_string(&self, name: &str, ctx: &dyn RequestContext)
        -> anyhow::Result<String>;
}

impl<F> VaryByCustomProvider for F
where
    F: Fn(&str, &dyn RequestContext) -> anyhow::Result<String> + Send + Sync,
{
    fn vary_by_custom_string(
        &self,
        name: &str,
        ctx: &dyn RequestContext,
    ) -> anyhow::Result<String> {
        self(name, ctx)
    }
}

/// Provider for hosts with no custom vary hooks. Fails for every name.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCustomVary;

impl VaryByCustomProvider for NoCustomVary {
    fn vary_by_custom_string(
        &self,
        name: &str,
        _ctx: &dyn RequestContext,
    ) -> anyhow::Result<String> {
        Err(anyhow!("no vary-by-custom provider registered for '{}'", name))
    }
}

/// Provider returning fixed values per name (case-insensitive).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "HashMap<String, String>")]
pub struct StaticVaryByCustom {
    values: HashMap<String, String>,
}

impl StaticVaryByCustom {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a fixed value.
    pub fn with_value(mut self, name: &str, value: impl Into<String>) -> Self {
        self.values.insert(name.to_lowercase(), value.into());
        self
    }
}

impl From<HashMap<String, String>> for StaticVaryByCustom {
    fn from(values: HashMap<String, String>) -> Self {
        values
            .into_iter()
            .fold(Self::new(), |p, (name, value)| p.with_value(&name, value))
    }
}

impl VaryByCustomProvider for StaticVaryByCustom {
    fn vary_by_custom_string(
        &self,
        name: &str,
        _ctx: &dyn RequestContext,
    ) -> anyhow::Result<String> {
        self.values
            .get(&name.to_lowercase())
            .cloned()
            .ok_or_else(|| anyhow!("no value configured for vary-by-custom '{}'", name))
    }
}

#[cfg(test)]
mod tests {
    use donut_core::RequestSnapshot;

    use super::*;

    fn controller_tag(name: &str, ctx: &dyn RequestContext) -> anyhow::Result<String> {
        Ok(format!("{}:{}", name, ctx.controller_name().unwrap_or_default()))
    }

    #[test]
    fn test_fn_provider() {
        let ctx = RequestSnapshot::new("Home", "Index");
        let value = controller_tag.vary_by_custom_string("device", &ctx).unwrap();
        assert_eq!(value, "device:Home");
    }

    #[test]
    fn test_no_custom_vary_fails() {
        let ctx = RequestSnapshot::new("Home", "Index");
        let err = NoCustomVary.vary_by_custom_string("device", &ctx).unwrap_err();
        assert!(err.to_string().contains("device"));
    }

    #[test]
    fn test_static_lookup_is_case_insensitive() {
        let ctx = RequestSnapshot::new("Home", "Index");
        let provider = StaticVaryByCustom::new().with_value("Locale", "en-GB");

        assert_eq!(provider.vary_by_custom_string("locale", &ctx).unwrap(), "en-GB");
        assert!(provider.vary_by_custom_string("device", &ctx).is_err());
    }

    #[test]
    fn test_static_from_json() {
        let ctx = RequestSnapshot::new("Home", "Index");
        let provider: StaticVaryByCustom = serde_json::from_str(r#"{"Device": "mobile"}"#).unwrap();
        assert_eq!(provider.vary_by_custom_string("device", &ctx).unwrap(), "mobile");
    }
}
