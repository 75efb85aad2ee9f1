//! Vary-by-param filtering and the vary-by-custom extension.

use anyhow::anyhow;
use donut_core::{RequestContext, VaryByParam};
use tracing::debug;

use crate::custom::VaryByCustomProvider;
use crate::params::ParameterSet;

/// Reduce a parameter set to the parameters the rule varies on.
pub fn apply_vary_by_param(parameters: &mut ParameterSet, rule: &VaryByParam) {
    match rule {
        VaryByParam::Unset | VaryByParam::All => {}
        VaryByParam::None => parameters.clear(),
        VaryByParam::Named(_) => parameters.retain(|name| rule.keeps(name)),
    }
    debug!(rule = %rule, kept = parameters.len(), "applied vary-by-param");
}

/// Add the host-computed value for a custom vary dimension under its
/// lowercased name.
///
/// Fails if the hook fails, or if a parameter with the same name survived
/// filtering: replacing it would silently change what the key varies on.
pub fn apply_vary_by_custom(
    parameters: &mut ParameterSet,
    name: &str,
    provider: &dyn VaryByCustomProvider,
    ctx: &dyn RequestContext,
) -> anyhow::Result<()> {
    let value = provider.vary_by_custom_string(name, ctx)?;

    if !parameters.insert_if_absent(name, value) {
        return Err(anyhow!(
            "vary-by-custom '{}' collides with a request parameter of the same name",
            name
        ));
    }

    debug!(name, "applied vary-by-custom");
    Ok(())
}
