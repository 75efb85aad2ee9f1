//! Per-fragment cache settings.

use serde::{Deserialize, Serialize};

/// Vary settings for one cached fragment.
///
/// Produced by whatever configuration layer the host uses; read-only to the
/// key generation pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Leave form fields out of the key.
    pub ignore_form_data: bool,
    /// Leave query string parameters out of the key.
    pub ignore_query_string: bool,
    /// `none`, `*`, or a `;`-separated list of parameter names.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vary_by_param: Option<String>,
    /// Name of a host-provided custom vary hook.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vary_by_custom: Option<String>,
}

impl CacheSettings {
    /// Create settings that vary on every parameter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignore form fields.
    pub fn ignoring_form_data(mut self) -> Self {
        self.ignore_form_data = true;
        self
    }

    /// Ignore query string parameters.
    pub fn ignoring_query_string(mut self) -> Self {
        self.ignore_query_string = true;
        self
    }

    /// Set the vary-by-param rule.
    pub fn vary_by_param(mut self, rule: impl Into<String>) -> Self {
        self.vary_by_param = Some(rule.into());
        self
    }

    /// Set the custom vary hook name.
    pub fn vary_by_custom(mut self, name: impl Into<String>) -> Self {
        self.vary_by_custom = Some(name.into());
        self
    }

    /// Parsed vary-by-param rule.
    pub fn vary_rule(&self) -> VaryByParam {
        VaryByParam::parse(self.vary_by_param.as_deref())
    }

    /// Custom vary hook name, if set and non-empty.
    pub fn custom_vary_name(&self) -> Option<&str> {
        self.vary_by_custom.as_deref().filter(|s| !s.is_empty())
    }
}

/// Parsed vary-by-param rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaryByParam {
    /// No rule given; the parameter set passes through unchanged.
    Unset,
    /// `none` - a single variant regardless of parameters.
    None,
    /// `*` - every parameter participates.
    All,
    /// Only the listed (lowercase) parameter names participate.
    Named(Vec<String>),
}

impl VaryByParam {
    /// Parse a raw vary-by-param setting.
    pub fn parse(raw: Option<&str>) -> Self {
        let raw = match raw {
            Some(s) if !s.trim().is_empty() => s,
            _ => return Self::Unset,
        };

        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("none") {
            return Self::None;
        }
        if trimmed == "*" {
            return Self::All;
        }

        let names = raw
            .split(';')
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect();

        Self::Named(names)
    }

    /// Check if a lowercase parameter name is kept by this rule.
    pub fn keeps(&self, name: &str) -> bool {
        match self {
            Self::Unset | Self::All => true,
            Self::None => false,
            Self::Named(names) => names.iter().any(|n| n == name),
        }
    }
}

impl std::fmt::Display for VaryByParam {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unset => write!(f, "unset"),
            Self::None => write!(f, "none"),
            Self::All => write!(f, "*"),
            Self::Named(names) => write!(f, "{}", names.join(";")),
        }
    }
}
