//! Handler identity extraction.

use donut_core::RequestContext;
use serde::Serialize;

use crate::error::{IdentityPart, KeyGenerationError, KeyResult};

/// The controller/action pair (and optional area) that produced a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandlerIdentity {
    /// Controller name, as supplied by the host.
    pub controller: String,
    /// Action name, as supplied by the host.
    pub action: String,
    /// Area name, if the controller lives in one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
}

impl HandlerIdentity {
    /// Read the identity from a request context.
    ///
    /// Controller and action are mandatory; an empty name counts as missing.
    /// A blank area is treated as no area.
    pub fn extract(ctx: &dyn RequestContext) -> KeyResult<Self> {
        let action = required(ctx.action_name(), IdentityPart::Action)?;
        let controller = required(ctx.controller_name(), IdentityPart::Controller)?;
        let area = ctx
            .area_name()
            .filter(|a| !a.trim().is_empty())
            .map(str::to_string);

        tracing::trace!(%controller, %action, area = ?area, "resolved handler identity");

        Ok(Self {
            controller,
            action,
            area,
        })
    }
}

fn required(name: Option<&str>, part: IdentityPart) -> KeyResult<String> {
    match name {
        Some(n) if !n.is_empty() => Ok(n.to_string()),
        _ => Err(KeyGenerationError::MissingIdentity { missing: part }),
    }
}
