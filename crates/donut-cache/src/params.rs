//! Case-normalized parameter set.

use std::collections::btree_map::{self, BTreeMap};
use std::fmt;

use serde::Serialize;

/// Parameters that vary a cached fragment.
///
/// Names are lowercased on the way in, so every lookup and membership check
/// is case-insensitive. Iteration is in sorted name order, which keeps
/// rendering independent of the order parameters were collected in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterSet {
    entries: BTreeMap<String, String>,
}

impl ParameterSet {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parameter, replacing any existing value for the same name.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) -> Option<String> {
        self.entries.insert(name.to_lowercase(), value.into())
    }

    /// Insert a parameter only if the name is not already present.
    ///
    /// Returns `true` if the value was inserted.
    pub fn insert_if_absent(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.entries.entry(name.to_lowercase()) {
            btree_map::Entry::Vacant(slot) => {
                slot.insert(value.into());
                true
            }
            btree_map::Entry::Occupied(_) => false,
        }
    }

    /// Check if a parameter is present.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    /// Get a parameter value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(&name.to_lowercase()).map(|s| s.as_str())
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the set is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove every parameter.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Keep only parameters whose (lowercase) name matches the predicate.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.entries.retain(|name, _| keep(name));
    }

    /// Iterate over `(name, value)` pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over parameter names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = Self::new();
        for (k, v) in iter {
            set.insert(k.as_ref(), v);
        }
        set
    }
}

impl fmt::Display for ParameterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}={}", k, v)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_lowercased() {
        let mut set = ParameterSet::new();
        set.insert("Category", "Shoes");

        assert!(set.contains("category"));
        assert!(set.contains("CATEGORY"));
        assert_eq!(set.get("category"), Some("Shoes"));
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["category"]);
    }

    #[test]
    fn test_insert_replaces() {
        let mut set = ParameterSet::new();
        set.insert("id", "1");
        let old = set.insert("ID", "2");

        assert_eq!(old, Some("1".to_string()));
        assert_eq!(set.len(), 1);
        assert_eq!(set.get("id"), Some("2"));
    }

    #[test]
    fn test_insert_if_absent_keeps_first() {
        let mut set = ParameterSet::new();
        assert!(set.insert_if_absent("id", "42"));
        assert!(!set.insert_if_absent("Id", "7"));
        assert_eq!(set.get("id"), Some("42"));
    }

    #[test]
    fn test_order_independent_equality() {
        let a: ParameterSet = vec![("b", "2"), ("a", "1")].into_iter().collect();
        let b: ParameterSet = vec![("A", "1"), ("B", "2")].into_iter().collect();

        assert_eq!(a, b);
        assert_eq!(a.to_string(), "{a=1, b=2}");
    }

    #[test]
    fn test_retain_and_clear() {
        let mut set: ParameterSet = vec![("id", "1"), ("page", "2"), ("sort", "asc")]
            .into_iter()
            .collect();

        set.retain(|name| name != "sort");
        assert_eq!(set.len(), 2);
        assert!(!set.contains("sort"));

        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.to_string(), "{}");
    }

    #[test]
    fn test_serialize_as_map() {
        let set: ParameterSet = vec![("Page", "2")].into_iter().collect();
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"{"page":"2"}"#);
    }
}
