//! Key generation errors.

use std::fmt;

use serde::Serialize;

use crate::params::ParameterSet;

/// Result type for key generation.
pub type KeyResult<T> = Result<T, KeyGenerationError>;

/// Errors that abort key generation.
///
/// A caller that receives one of these must not cache the fragment.
#[derive(Debug, thiserror::Error)]
pub enum KeyGenerationError {
    /// The handler producing the fragment could not be identified.
    #[error("cannot address fragment: {missing} name is missing")]
    MissingIdentity {
        /// Which part of the identity was missing.
        missing: IdentityPart,
    },

    /// Reading a parameter source or running the custom vary hook failed.
    #[error("key generation failed while reading {stage} [{trace}]: {source}")]
    ExtractionFailure {
        /// Stage that failed.
        stage: Stage,
        /// What had been seen when the failure happened.
        trace: KeyTrace,
        /// Underlying failure.
        #[source]
        source: anyhow::Error,
    },
}

impl KeyGenerationError {
    /// Stage the error was raised in.
    pub fn stage(&self) -> Stage {
        match self {
            Self::MissingIdentity { .. } => Stage::Identity,
            Self::ExtractionFailure { stage, .. } => *stage,
        }
    }

    /// Diagnostic trace, if the failure happened after identity extraction.
    pub fn trace(&self) -> Option<&KeyTrace> {
        match self {
            Self::MissingIdentity { .. } => None,
            Self::ExtractionFailure { trace, .. } => Some(trace),
        }
    }
}

/// Part of a handler's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityPart {
    /// Controller name.
    Controller,
    /// Action name.
    Action,
}

impl fmt::Display for IdentityPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Controller => write!(f, "controller"),
            Self::Action => write!(f, "action"),
        }
    }
}

/// Pipeline stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Reading the controller, action and area names.
    Identity,
    /// Collecting route values.
    RouteValues,
    /// Merging posted form fields.
    FormValues,
    /// Merging query string entries.
    QueryValues,
    /// Asking the vary-by-custom provider for its value.
    VaryByCustom,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => write!(f, "handler identity"),
            Self::RouteValues => write!(f, "route values"),
            Self::FormValues => write!(f, "form values"),
            Self::QueryValues => write!(f, "query string"),
            Self::VaryByCustom => write!(f, "vary-by-custom"),
        }
    }
}

/// Snapshot of what key generation had seen when it failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyTrace {
    /// Controller name.
    pub controller: String,
    /// Action name.
    pub action: String,
    /// Area name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    /// Nested invocation flag.
    pub child: bool,
    /// Parameters collected before the failure.
    pub parameters: ParameterSet,
}

impl fmt::Display for KeyTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "controller={} action={}", self.controller, self.action)?;
        if let Some(area) = &self.area {
            write!(f, " area={}", area)?;
        }
        write!(f, " child={} parameters={}", self.child, self.parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_identity_message() {
        let err = KeyGenerationError::MissingIdentity {
            missing: IdentityPart::Action,
        };
        assert_eq!(err.to_string(), "cannot address fragment: action name is missing");
        assert_eq!(err.stage(), Stage::Identity);
        assert!(err.trace().is_none());
    }

    #[test]
    fn test_extraction_failure_carries_trace() {
        let mut parameters = ParameterSet::new();
        parameters.insert("id", "42");

        let err = KeyGenerationError::ExtractionFailure {
            stage: Stage::QueryValues,
            trace: KeyTrace {
                controller: "Products".to_string(),
                action: "Show".to_string(),
                area: None,
                child: false,
                parameters,
            },
            source: anyhow::anyhow!("malformed query string"),
        };

        let msg = err.to_string();
        assert!(msg.contains("query string"));
        assert!(msg.contains("controller=Products action=Show"));
        assert!(msg.contains("id=42"));
        assert!(msg.ends_with("malformed query string"));
        assert_eq!(err.trace().map(|t| t.parameters.len()), Some(1));
    }

    #[test]
    fn test_stage_and_part_names() {
        assert_eq!(serde_json::to_string(&Stage::VaryByCustom).unwrap(), r#""vary_by_custom""#);
        assert_eq!(serde_json::to_string(&IdentityPart::Controller).unwrap(), r#""controller""#);
        assert_eq!(Stage::RouteValues.to_string(), "route values");
        assert_eq!(IdentityPart::Action.to_string(), "action");
    }
}
