//! Request context with handler identity and parameter sources.

use serde::{Deserialize, Serialize};

/// Route parameters in the order the router produced them.
pub type RouteValues = Vec<(String, RouteValue)>;

/// Submitted form fields. A field may be present without a value.
pub type FormValues = Vec<(String, Option<String>)>;

/// Query string parameters. A `None` name is a bare flag such as `?value`.
pub type QueryValues = Vec<(Option<String>, Option<String>)>;

/// A single route parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteValue {
    /// A value matched from the request route.
    Text(String),
    /// An entry injected by the host's nested-invocation machinery.
    ///
    /// Synthetic entries are plumbing, not request data, and never take part
    /// in key computation.
    Synthetic,
}

impl RouteValue {
    /// Create a text route value.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Check if this entry was injected by the host.
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic)
    }

    /// Get the text value, if any.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Synthetic => None,
        }
    }
}

impl From<&str> for RouteValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for RouteValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Read-only view of the request a fragment is rendered for.
///
/// The host's routing layer implements this over its own request types. The
/// parameter source accessors are fallible so that malformed request data can
/// be surfaced instead of silently dropped.
pub trait RequestContext: Send + Sync {
    /// Name of the action producing the fragment.
    fn action_name(&self) -> Option<&str>;

    /// Name of the controller producing the fragment.
    fn controller_name(&self) -> Option<&str>;

    /// Area (namespace) of the controller, if any.
    fn area_name(&self) -> Option<&str> {
        None
    }

    /// Whether this is a nested invocation from within a parent fragment.
    fn is_child_invocation(&self) -> bool {
        false
    }

    /// Route parameters, including identity entries.
    fn route_values(&self) -> anyhow::Result<RouteValues>;

    /// Form fields.
    fn form_values(&self) -> anyhow::Result<FormValues>;

    /// Query string parameters.
    fn query_values(&self) -> anyhow::Result<QueryValues>;
}

/// Owned snapshot of a request, usable as a `RequestContext`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSnapshot {
    /// Action name.
    pub action: Option<String>,
    /// Controller name.
    pub controller: Option<String>,
    /// Area name.
    pub area: Option<String>,
    /// Nested invocation flag.
    pub child: bool,
    /// Route parameters.
    pub route: RouteValues,
    /// Form fields.
    pub form: FormValues,
    /// Query string parameters.
    pub query: QueryValues,
}

impl RequestSnapshot {
    /// Create a snapshot for a controller/action pair.
    pub fn new(controller: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            action: Some(action.into()),
            controller: Some(controller.into()),
            ..Default::default()
        }
    }

    /// Set the area name.
    pub fn with_area(mut self, area: impl Into<String>) -> Self {
        self.area = Some(area.into());
        self
    }

    /// Mark as a nested invocation.
    pub fn as_child(mut self) -> Self {
        self.child = true;
        self
    }

    /// Add a route parameter.
    pub fn with_route_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.route.push((name.into(), RouteValue::Text(value.into())));
        self
    }

    /// Add a host-injected route entry.
    pub fn with_synthetic_route_value(mut self, name: impl Into<String>) -> Self {
        self.route.push((name.into(), RouteValue::Synthetic));
        self
    }

    /// Add a form field.
    pub fn with_form_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form.push((name.into(), Some(value.into())));
        self
    }

    /// Add a form field with no value.
    pub fn with_empty_form_value(mut self, name: impl Into<String>) -> Self {
        self.form.push((name.into(), None));
        self
    }

    /// Add a query string parameter.
    pub fn with_query_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((Some(name.into()), Some(value.into())));
        self
    }

    /// Add a bare query string flag (`?value` with no `=`).
    pub fn with_query_flag(mut self, flag: impl Into<String>) -> Self {
        self.query.push((None, Some(flag.into())));
        self
    }
}

impl RequestContext for RequestSnapshot {
    fn action_name(&self) -> Option<&str> {
        self.action.as_deref()
    }

    fn controller_name(&self) -> Option<&str> {
        self.controller.as_deref()
    }

    fn area_name(&self) -> Option<&str> {
        self.area.as_deref()
    }

    fn is_child_invocation(&self) -> bool {
        self.child
    }

    fn route_values(&self) -> anyhow::Result<RouteValues> {
        Ok(self.route.clone())
    }

    fn form_values(&self) -> anyhow::Result<FormValues> {
        Ok(self.form.clone())
    }

    fn query_values(&self) -> anyhow::Result<QueryValues> {
        Ok(self.query.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_builder() {
        let ctx = RequestSnapshot::new("Products", "List")
            .with_area("Shop")
            .with_route_value("id", "42")
            .with_form_value("name", "Boots")
            .with_query_value("sort", "price")
            .with_query_flag("debug");

        assert_eq!(ctx.controller_name(), Some("Products"));
        assert_eq!(ctx.action_name(), Some("List"));
        assert_eq!(ctx.area_name(), Some("Shop"));
        assert!(!ctx.is_child_invocation());
        assert_eq!(ctx.route_values().unwrap(), vec![("id".to_string(), RouteValue::text("42"))]);
        assert_eq!(ctx.form_values().unwrap().len(), 1);
        assert_eq!(
            ctx.query_values().unwrap()[1],
            (None, Some("debug".to_string()))
        );
    }

    #[test]
    fn test_default_snapshot_has_no_identity() {
        let ctx = RequestSnapshot::default();
        assert_eq!(ctx.controller_name(), None);
        assert_eq!(ctx.action_name(), None);
    }

    #[test]
    fn test_synthetic_route_value() {
        let ctx = RequestSnapshot::new("Home", "Index").with_synthetic_route_value("__childState");
        let route = ctx.route_values().unwrap();

        assert!(route[0].1.is_synthetic());
        assert_eq!(route[0].1.as_text(), None);
    }

    #[test]
    fn test_snapshot_deserialize() {
        let json_src = r#"{
            "controller": "Products",
            "action": "List",
            "child": true,
            "route": [["id", {"text": "42"}], ["__state", "synthetic"]],
            "query": [["sort", "price"], [null, "flag"]]
        }"#;
        let ctx: RequestSnapshot = serde_json::from_str(json_src).unwrap();
        assert!(ctx.is_child_invocation());
        assert_eq!(ctx.route[1].1, RouteValue::Synthetic);
        assert_eq!(ctx.query[1].0, None);
        assert!(ctx.form.is_empty());
    }
}
