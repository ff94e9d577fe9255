//! The generic configuration value tree.
//!
//! # Responsibilities
//! - Represent a parsed configuration document as a closed variant type
//! - Convert from the trees third-party parsers produce
//! - Recursive right-biased merge of two trees
//!
//! # Design Decisions
//! - Closed enum instead of duck-typed access, so the resolver can
//!   pattern-match on node kinds
//! - Map keys are plain `String`s; normalization happens at insertion
//! - Untagged serde representation so YAML, TOML and JSON documents all
//!   deserialize into the same shape

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A node in a configuration document tree.
///
/// Produced by the parsing layer (see [`crate::config::loader`]) and consumed
/// by the resolver and the container. Scalars, sequences and mappings cover
/// everything a YAML/TOML/JSON document can hold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    /// Explicit null / absent value.
    Null,
    /// Boolean scalar.
    Bool(bool),
    /// Integer scalar.
    Integer(i64),
    /// Floating-point scalar.
    Float(f64),
    /// String scalar.
    String(String),
    /// Ordered sequence of values.
    Sequence(Vec<ConfigValue>),
    /// String-keyed mapping of values.
    Map(BTreeMap<String, ConfigValue>),
}

impl ConfigValue {
    /// An empty mapping node.
    pub fn empty_map() -> Self {
        ConfigValue::Map(BTreeMap::new())
    }

    /// Returns true if this node is a mapping.
    pub fn is_map(&self) -> bool {
        matches!(self, ConfigValue::Map(_))
    }

    /// Returns true if this node is the null value.
    pub fn is_null(&self) -> bool {
        matches!(self, ConfigValue::Null)
    }

    /// Borrow the mapping entries, if this node is a mapping.
    pub fn as_map(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            ConfigValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Borrow the string value, if this node is a string scalar.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The integer value, if this node is an integer scalar.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ConfigValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// The float value, if this node is a float or integer scalar.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Float(f) => Some(*f),
            ConfigValue::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// The boolean value, if this node is a boolean scalar.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Borrow the child named `key`, if this node is a mapping.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.as_map().and_then(|m| m.get(key))
    }

    /// A short name for the node kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfigValue::Null => "null",
            ConfigValue::Bool(_) => "boolean",
            ConfigValue::Integer(_) => "integer",
            ConfigValue::Float(_) => "float",
            ConfigValue::String(_) => "string",
            ConfigValue::Sequence(_) => "sequence",
            ConfigValue::Map(_) => "mapping",
        }
    }
}

impl Default for ConfigValue {
    fn default() -> Self {
        ConfigValue::Null
    }
}

impl From<serde_json::Value> for ConfigValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => ConfigValue::Null,
            serde_json::Value::Bool(b) => ConfigValue::Bool(b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    ConfigValue::Integer(i)
                } else {
                    ConfigValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => ConfigValue::String(s),
            serde_json::Value::Array(items) => {
                ConfigValue::Sequence(items.into_iter().map(ConfigValue::from).collect())
            }
            serde_json::Value::Object(entries) => ConfigValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, ConfigValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue::Integer(n)
    }
}

impl From<i32> for ConfigValue {
    fn from(n: i32) -> Self {
        ConfigValue::Integer(n.into())
    }
}

impl From<f64> for ConfigValue {
    fn from(f: f64) -> Self {
        ConfigValue::Float(f)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

/// Recursively merge `overlay` onto `base` and return the result.
///
/// Where both sides are mappings the merge recurses per key; everywhere else
/// the overlay value wins outright, including a scalar replacing a whole
/// mapping (and vice versa).
pub fn deep_merge(base: ConfigValue, overlay: ConfigValue) -> ConfigValue {
    match (base, overlay) {
        (ConfigValue::Map(mut base_map), ConfigValue::Map(overlay_map)) => {
            for (key, overlay_val) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_val) => deep_merge(base_val, overlay_val),
                    None => overlay_val,
                };
                base_map.insert(key, merged);
            }
            ConfigValue::Map(base_map)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_value() {
        let tree = ConfigValue::from(json!({
            "db": { "host": "localhost", "port": 5432, "replica": null },
            "tags": ["a", "b"],
            "debug": true,
        }));

        assert_eq!(
            tree.get("db").and_then(|db| db.get("host")).and_then(ConfigValue::as_str),
            Some("localhost")
        );
        assert_eq!(
            tree.get("db").and_then(|db| db.get("port")).and_then(ConfigValue::as_i64),
            Some(5432)
        );
        assert!(tree.get("db").and_then(|db| db.get("replica")).unwrap().is_null());
        assert_eq!(tree.get("debug").and_then(ConfigValue::as_bool), Some(true));
        assert!(matches!(tree.get("tags"), Some(ConfigValue::Sequence(items)) if items.len() == 2));
    }

    #[test]
    fn test_deep_merge_recurses_into_maps() {
        let base = ConfigValue::from(json!({ "db": { "host": "localhost", "port": 5432 } }));
        let overlay = ConfigValue::from(json!({ "db": { "port": 5433 } }));

        let merged = deep_merge(base, overlay);
        assert_eq!(
            merged.get("db").and_then(|db| db.get("host")).and_then(ConfigValue::as_str),
            Some("localhost")
        );
        assert_eq!(
            merged.get("db").and_then(|db| db.get("port")).and_then(ConfigValue::as_i64),
            Some(5433)
        );
    }

    #[test]
    fn test_deep_merge_overlay_wins_at_leaves() {
        let base = ConfigValue::from(json!({ "a": { "nested": 1 } }));
        let overlay = ConfigValue::from(json!({ "a": "flattened" }));

        let merged = deep_merge(base, overlay);
        assert_eq!(merged.get("a").and_then(ConfigValue::as_str), Some("flattened"));
    }

    #[test]
    fn test_deep_merge_disjoint_keys_is_union() {
        let base = ConfigValue::from(json!({ "a": 1 }));
        let overlay = ConfigValue::from(json!({ "b": 2 }));

        let merged = deep_merge(base, overlay);
        assert_eq!(merged, ConfigValue::from(json!({ "a": 1, "b": 2 })));
    }

    #[test]
    fn test_yaml_round_trip() {
        let source = "db:\n  host: localhost\n  port: 5432\nenabled: true\n";
        let tree: ConfigValue = serde_yaml::from_str(source).unwrap();

        assert_eq!(
            tree.get("db").and_then(|db| db.get("port")).and_then(ConfigValue::as_i64),
            Some(5432)
        );

        let dumped = serde_yaml::to_string(&tree).unwrap();
        let reparsed: ConfigValue = serde_yaml::from_str(&dumped).unwrap();
        assert_eq!(tree, reparsed);
    }
}
