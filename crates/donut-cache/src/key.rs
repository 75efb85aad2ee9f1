//! Cache key rendering.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::params::ParameterSet;

/// Prefix shared by every key the default builders render.
pub const DEFAULT_KEY_PREFIX: &str = "_d0nutc@che.";

/// A cache key addressing one cached fragment variant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Create a cache key from a string.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Get the key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if the key belongs to a controller or action prefix.
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }

    /// Consume the key, returning the string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<CacheKey> for String {
    fn from(key: CacheKey) -> Self {
        key.0
    }
}

/// Renders a key from a handler identity and its final parameter set.
///
/// Implementations must be deterministic, must not depend on parameter
/// iteration order, and must never render the same key for two distinct
/// `(controller, action, parameters)` triples.
pub trait KeyBuilder: Send + Sync {
    /// Render the key for one fragment variant.
    fn build_key(&self, controller: &str, action: &str, parameters: &ParameterSet) -> CacheKey;

    /// Prefix shared by every key of a controller.
    fn build_controller_prefix(&self, controller: &str) -> String;

    /// Prefix shared by every key of a controller action.
    fn build_action_prefix(&self, controller: &str, action: &str) -> String;
}

impl<B: KeyBuilder + ?Sized> KeyBuilder for Box<B> {
    fn build_key(&self, controller: &str, action: &str, parameters: &ParameterSet) -> CacheKey {
        (**self).build_key(controller, action, parameters)
    }

    fn build_controller_prefix(&self, controller: &str) -> String {
        (**self).build_controller_prefix(controller)
    }

    fn build_action_prefix(&self, controller: &str, action: &str) -> String {
        (**self).build_action_prefix(controller, action)
    }
}

impl<B: KeyBuilder + ?Sized> KeyBuilder for Arc<B> {
    fn build_key(&self, controller: &str, action: &str, parameters: &ParameterSet) -> CacheKey {
        (**self).build_key(controller, action, parameters)
    }

    fn build_controller_prefix(&self, controller: &str) -> String {
        (**self).build_controller_prefix(controller)
    }

    fn build_action_prefix(&self, controller: &str, action: &str) -> String {
        (**self).build_action_prefix(controller, action)
    }
}

/// Readable key builder.
///
/// Format: `{prefix}{controller}.{action}#{name}={value}#...` with controller
/// and action lowercased and parameters in name order. `%`, `.`, `#` and `=`
/// are percent-encoded in every component so the delimiters stay unambiguous.
#[derive(Debug, Clone)]
pub struct DefaultKeyBuilder {
    prefix: String,
}

impl Default for DefaultKeyBuilder {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl DefaultKeyBuilder {
    /// Create a builder with the default prefix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key prefix.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Get the key prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl KeyBuilder for DefaultKeyBuilder {
    fn build_key(&self, controller: &str, action: &str, parameters: &ParameterSet) -> CacheKey {
        let mut key = self.build_action_prefix(controller, action);
        for (name, value) in parameters.iter() {
            key.push_str(&escape(name));
            key.push('=');
            key.push_str(&escape(value));
            key.push('#');
        }
        CacheKey(key)
    }

    fn build_controller_prefix(&self, controller: &str) -> String {
        format!("{}{}.", self.prefix, escape(&controller.to_lowercase()))
    }

    fn build_action_prefix(&self, controller: &str, action: &str) -> String {
        format!(
            "{}{}#",
            self.build_controller_prefix(controller),
            escape(&action.to_lowercase())
        )
    }
}

/// Builder that replaces the parameter portion of another builder's key with
/// a SHA-256 digest, bounding key length for stores with key size limits.
///
/// The inner builder's controller and action prefixes are kept so prefix
/// invalidation still works.
#[derive(Debug, Clone, Default)]
pub struct HashedKeyBuilder<B> {
    inner: B,
}

impl<B: KeyBuilder> HashedKeyBuilder<B> {
    /// Wrap a builder.
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    /// Get the wrapped builder.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: KeyBuilder> KeyBuilder for HashedKeyBuilder<B> {
    fn build_key(&self, controller: &str, action: &str, parameters: &ParameterSet) -> CacheKey {
        let full = self.inner.build_key(controller, action, parameters);
        let digest = hex::encode(Sha256::digest(full.as_str().as_bytes()));
        CacheKey(format!(
            "{}{}",
            self.inner.build_action_prefix(controller, action),
            digest
        ))
    }

    fn build_controller_prefix(&self, controller: &str) -> String {
        self.inner.build_controller_prefix(controller)
    }

    fn build_action_prefix(&self, controller: &str, action: &str) -> String {
        self.inner.build_action_prefix(controller, action)
    }
}

fn escape(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for c in component.chars() {
        match c {
            '%' => out.push_str("%25"),
            '.' => out.push_str("%2E"),
            '#' => out.push_str("%23"),
            '=' => out.push_str("%3D"),
            _ => out.push(c),
        }
    }
    out
}
