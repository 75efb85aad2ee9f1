//! The key generation pipeline.

use donut_core::{CacheSettings, RequestContext};
use serde::Serialize;
use tracing::{debug, debug_span, error};

use crate::custom::{NoCustomVary, VaryByCustomProvider};
use crate::error::{KeyGenerationError, KeyResult, KeyTrace, Stage};
use crate::identity::HandlerIdentity;
use crate::key::{CacheKey, KeyBuilder};
use crate::merge::merge_parameters;
use crate::params::ParameterSet;
use crate::vary::{apply_vary_by_custom, apply_vary_by_param};

/// Everything the key builder receives for one fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedKeyInput {
    /// Handler that produced the fragment.
    #[serde(flatten)]
    pub identity: HandlerIdentity,
    /// Final, filtered parameters.
    pub parameters: ParameterSet,
}

/// Derives cache keys for rendered fragments.
///
/// Holds no mutable state; one generator can serve any number of concurrent
/// requests as long as its builder and custom vary provider can.
///
/// # Example
///
/// ```ignore
/// let generator = KeyGenerator::new(DefaultKeyBuilder::new())
///     .with_custom_vary(StaticVaryByCustom::new().with_value("device", "mobile"));
///
/// let key = generator.generate_key(&request, &settings)?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct KeyGenerator<B, P = NoCustomVary> {
    builder: B,
    custom: P,
}

impl<B: KeyBuilder> KeyGenerator<B> {
    /// Create a generator with no custom vary hooks.
    pub fn new(builder: B) -> Self {
        Self {
            builder,
            custom: NoCustomVary,
        }
    }
}

impl<B: KeyBuilder, P: VaryByCustomProvider> KeyGenerator<B, P> {
    /// Set the provider for vary-by-custom hooks.
    pub fn with_custom_vary<Q: VaryByCustomProvider>(self, custom: Q) -> KeyGenerator<B, Q> {
        KeyGenerator {
            builder: self.builder,
            custom,
        }
    }

    /// Get the key builder.
    pub fn builder(&self) -> &B {
        &self.builder
    }

    /// Generate the cache key for a fragment.
    ///
    /// Any failure aborts the whole call; the caller must not cache the
    /// fragment when this returns an error.
    pub fn generate_key(
        &self,
        ctx: &dyn RequestContext,
        settings: &CacheSettings,
    ) -> KeyResult<CacheKey> {
        let span = debug_span!(
            "generate_key",
            controller = ctx.controller_name().unwrap_or_default(),
            action = ctx.action_name().unwrap_or_default(),
        );
        let _enter = span.enter();

        let input = self.resolve_in_span(ctx, settings)?;
        let key = self.builder.build_key(
            &input.identity.controller,
            &input.identity.action,
            &input.parameters,
        );

        debug!(%key, "built cache key");
        Ok(key)
    }

    /// Run every stage except key rendering.
    ///
    /// Useful for explaining why two requests do or do not share a key.
    pub fn resolve(
        &self,
        ctx: &dyn RequestContext,
        settings: &CacheSettings,
    ) -> KeyResult<ResolvedKeyInput> {
        let span = debug_span!("resolve_key_input");
        let _enter = span.enter();
        self.resolve_in_span(ctx, settings)
    }

    fn resolve_in_span(
        &self,
        ctx: &dyn RequestContext,
        settings: &CacheSettings,
    ) -> KeyResult<ResolvedKeyInput> {
        self.run_stages(ctx, settings).inspect_err(|e| {
            error!(
                stage = %e.stage(),
                trace = e.trace().map(tracing::field::display),
                error = %e,
                "cache key generation failed"
            );
        })
    }

    fn run_stages(
        &self,
        ctx: &dyn RequestContext,
        settings: &CacheSettings,
    ) -> KeyResult<ResolvedKeyInput> {
        let identity = HandlerIdentity::extract(ctx)?;
        let mut parameters = merge_parameters(&identity, ctx, settings)?;

        apply_vary_by_param(&mut parameters, &settings.vary_rule());

        if let Some(name) = settings.custom_vary_name() {
            apply_vary_by_custom(&mut parameters, name, &self.custom, ctx).map_err(|source| {
                KeyGenerationError::ExtractionFailure {
                    stage: Stage::VaryByCustom,
                    trace: KeyTrace {
                        controller: identity.controller.clone(),
                        action: identity.action.clone(),
                        area: identity.area.clone(),
                        child: ctx.is_child_invocation(),
                        parameters: parameters.clone(),
                    },
                    source,
                }
            })?;
        }

        Ok(ResolvedKeyInput {
            identity,
            parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use donut_core::{RequestSnapshot, RouteValues};

    use super::*;
    use crate::custom::StaticVaryByCustom;
    use crate::error::IdentityPart;
    use crate::key::DefaultKeyBuilder;

    struct BrokenForm;

    impl RequestContext for BrokenForm {
        fn action_name(&self) -> Option<&str> {
            Some("Edit")
        }

        fn controller_name(&self) -> Option<&str> {
            Some("Profile")
        }

        fn route_values(&self) -> anyhow::Result<RouteValues> {
            Ok(vec![("id".to_string(), "7".into())])
        }

        fn form_values(&self) -> anyhow::Result<donut_core::FormValues> {
            anyhow::bail!("truncated multipart body")
        }

        fn query_values(&self) -> anyhow::Result<donut_core::QueryValues> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_generate_key() {
        let generator = KeyGenerator::new(DefaultKeyBuilder::new());
        let ctx = RequestSnapshot::new("Products", "List")
            .with_query_value("category", "Shoes")
            .with_query_value("sort", "price");
        let settings = CacheSettings::new().vary_by_param("category");

        let key = generator.generate_key(&ctx, &settings).unwrap();
        assert_eq!(key.as_str(), "_d0nutc@che.products.list#category=shoes#");
    }

    #[test]
    fn test_resolve_exposes_parameters() {
        let generator = KeyGenerator::new(DefaultKeyBuilder::new());
        let ctx = RequestSnapshot::new("Products", "Show")
            .with_area("Shop")
            .with_route_value("id", "42");

        let input = generator.resolve(&ctx, &CacheSettings::new()).unwrap();
        assert_eq!(input.identity.controller, "Products");
        assert_eq!(input.parameters.get("id"), Some("42"));
        assert_eq!(input.parameters.get("area"), Some("Shop"));
    }

    #[test]
    fn test_custom_vary_added_after_filter() {
        let generator = KeyGenerator::new(DefaultKeyBuilder::new())
            .with_custom_vary(StaticVaryByCustom::new().with_value("device", "mobile"));
        let ctx = RequestSnapshot::new("Home", "Index").with_query_value("page", "3");
        let settings = CacheSettings::new().vary_by_param("none").vary_by_custom("Device");

        let key = generator.generate_key(&ctx, &settings).unwrap();
        assert_eq!(key.as_str(), "_d0nutc@che.home.index#device=mobile#");
    }

    #[test]
    fn test_missing_custom_provider_fails() {
        let generator = KeyGenerator::new(DefaultKeyBuilder::new());
        let ctx = RequestSnapshot::new("Home", "Index");
        let settings = CacheSettings::new().vary_by_custom("device");

        let err = generator.generate_key(&ctx, &settings).unwrap_err();
        assert_eq!(err.stage(), Stage::VaryByCustom);
    }

    #[test]
    fn test_missing_identity_fails() {
        let generator = KeyGenerator::new(DefaultKeyBuilder::new());
        let ctx = RequestSnapshot {
            action: Some("Index".to_string()),
            ..Default::default()
        };

        let err = generator.generate_key(&ctx, &CacheSettings::new()).unwrap_err();
        assert!(matches!(
            err,
            KeyGenerationError::MissingIdentity {
                missing: IdentityPart::Controller
            }
        ));
    }

    #[test]
    fn test_source_failure_reports_stage_and_trace() {
        let generator = KeyGenerator::new(DefaultKeyBuilder::new());

        let err = generator
            .generate_key(&BrokenForm, &CacheSettings::new())
            .unwrap_err();
        assert_eq!(err.stage(), Stage::FormValues);

        let trace = err.trace().unwrap();
        assert_eq!(trace.controller, "Profile");
        assert_eq!(trace.parameters.get("id"), Some("7"));
    }

    #[test]
    fn test_ignored_source_is_not_read() {
        let generator = KeyGenerator::new(DefaultKeyBuilder::new());
        let settings = CacheSettings::new().ignoring_form_data();

        let key = generator.generate_key(&BrokenForm, &settings).unwrap();
        assert_eq!(key.as_str(), "_d0nutc@che.profile.edit#id=7#");
    }
}
