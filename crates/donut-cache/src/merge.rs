//! Parameter merging across route, form and query sources.
//!
//! Precedence, highest first: route values, form fields, query string.
//! A name already in the set is never overwritten by a lower source.

use donut_core::{CacheSettings, RequestContext};
use tracing::{debug, trace};

use crate::error::{KeyGenerationError, KeyResult, KeyTrace, Stage};
use crate::identity::HandlerIdentity;
use crate::params::ParameterSet;

/// Route names that carry identity rather than variation.
pub const RESERVED_ROUTE_NAMES: [&str; 3] = ["controller", "action", "area"];

/// Merge a request's parameter sources into one normalized set.
///
/// Form and query data are only merged for top-level requests; a nested
/// fragment's key depends on the route values passed to it and nothing else.
pub fn merge_parameters(
    identity: &HandlerIdentity,
    ctx: &dyn RequestContext,
    settings: &CacheSettings,
) -> KeyResult<ParameterSet> {
    let child = ctx.is_child_invocation();
    let failure = |stage: Stage, parameters: &ParameterSet, source: anyhow::Error| {
        KeyGenerationError::ExtractionFailure {
            stage,
            trace: KeyTrace {
                controller: identity.controller.clone(),
                action: identity.action.clone(),
                area: identity.area.clone(),
                child,
                parameters: parameters.clone(),
            },
            source,
        }
    };

    let mut parameters = ParameterSet::new();

    let route = ctx
        .route_values()
        .map_err(|e| failure(Stage::RouteValues, &parameters, e))?;
    for (name, value) in &route {
        let lower = name.to_lowercase();
        if RESERVED_ROUTE_NAMES.iter().any(|reserved| *reserved == lower) {
            continue;
        }
        match value.as_text() {
            Some(text) => {
                parameters.insert(&lower, text);
            }
            None => trace!(name = %name, "dropping synthetic route value"),
        }
    }

    if let Some(area) = &identity.area {
        parameters.insert("area", area.as_str());
    }
    debug!(count = parameters.len(), "collected route values");

    if child {
        debug!("nested invocation, skipping form and query data");
        return Ok(parameters);
    }

    if !settings.ignore_form_data {
        let form = ctx
            .form_values()
            .map_err(|e| failure(Stage::FormValues, &parameters, e))?;
        let added = fill_gaps(
            &mut parameters,
            form.iter().map(|(n, v)| (n.as_str(), v.as_deref())),
        );
        debug!(added, total = form.len(), "merged form values");
    }

    if !settings.ignore_query_string {
        let query = ctx
            .query_values()
            .map_err(|e| failure(Stage::QueryValues, &parameters, e))?;
        let added = fill_gaps(
            &mut parameters,
            query
                .iter()
                .filter_map(|(n, v)| n.as_deref().map(|n| (n, v.as_deref()))),
        );
        debug!(added, total = query.len(), "merged query string");
    }

    Ok(parameters)
}

/// Add lowercased entries whose names are not yet present. Returns how many
/// were added.
///
/// Repeated names within the source (compared lowercase) are collapsed first,
/// joining their values with `,` in submission order, so `?c=red&c=blue`
/// becomes `c=red,blue`.
fn fill_gaps<'a>(
    parameters: &mut ParameterSet,
    source: impl Iterator<Item = (&'a str, Option<&'a str>)>,
) -> usize {
    let mut added = 0;
    for (name, value) in collapse_repeated(source) {
        if parameters.insert_if_absent(&name, value) {
            added += 1;
        } else {
            trace!(name = %name, "already present, skipping");
        }
    }
    added
}

fn collapse_repeated<'a>(
    source: impl Iterator<Item = (&'a str, Option<&'a str>)>,
) -> Vec<(String, String)> {
    let mut collapsed: Vec<(String, Option<String>)> = Vec::new();
    for (name, value) in source {
        let name = name.to_lowercase();
        let value = value.map(str::to_lowercase);
        match collapsed.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => {
                *existing = match (existing.take(), value) {
                    (Some(a), Some(b)) => Some(format!("{},{}", a, b)),
                    (a, b) => a.or(b),
                };
            }
            None => collapsed.push((name, value)),
        }
    }
    collapsed
        .into_iter()
        .map(|(name, value)| (name, value.unwrap_or_default()))
        .collect()
}
