//! Declarative setting sets.
//!
//! A [`SettingSet`] is a ready-made [`Configurable`] for modules whose
//! configuration is a flat list of named settings with defaults: declare the
//! settings up front, register the set, and read effective values after
//! distribution.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::BoxError;
use crate::key::ConfigKey;
use crate::registry::Configurable;
use crate::value::ConfigValue;

/// A named collection of settings with per-setting defaults.
///
/// On `configure`, declared settings found in the received section override
/// their defaults; everything else keeps its default. Receiving no section
/// resets every setting to its default.
pub struct SettingSet {
    name: String,
    key: Option<ConfigKey>,
    defaults: BTreeMap<String, ConfigValue>,
    values: BTreeMap<String, ConfigValue>,
}

impl SettingSet {
    /// A new set named `name`; the config key is derived from the name
    /// unless overridden with [`SettingSet::with_key`].
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: None,
            defaults: BTreeMap::new(),
            values: BTreeMap::new(),
        }
    }

    /// Use an explicit config key instead of deriving one from the name.
    pub fn with_key(mut self, key: impl Into<ConfigKey>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Declare a setting and its default value.
    pub fn setting(mut self, name: impl Into<String>, default: impl Into<ConfigValue>) -> Self {
        let name = name.into();
        let default = default.into();
        self.values.insert(name.clone(), default.clone());
        self.defaults.insert(name, default);
        self
    }

    /// The effective value of a declared setting.
    pub fn get(&self, name: &str) -> Option<&ConfigValue> {
        self.values.get(name)
    }

    /// Returns true if `name` was declared as a setting.
    pub fn declares(&self, name: &str) -> bool {
        self.defaults.contains_key(name)
    }
}

impl Configurable for SettingSet {
    fn name(&self) -> &str {
        &self.name
    }

    fn config_key(&self) -> ConfigKey {
        self.key
            .clone()
            .unwrap_or_else(|| ConfigKey::derive(&self.name))
    }

    fn configure(&mut self, section: Option<&ConfigValue>) -> Result<(), BoxError> {
        self.values = self.defaults.clone();

        if let Some(ConfigValue::Map(section)) = section {
            for (name, value) in section {
                if self.defaults.contains_key(name) {
                    self.values.insert(name.clone(), value.clone());
                } else {
                    debug!(set = %self.name, setting = %name, "ignoring undeclared setting");
                }
            }
        }
        Ok(())
    }

    fn defaults(&self) -> Option<ConfigValue> {
        if self.defaults.is_empty() {
            None
        } else {
            Some(ConfigValue::Map(self.defaults.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ModuleRef, Registry};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn db_settings() -> SettingSet {
        SettingSet::new("db")
            .setting("host", "localhost")
            .setting("port", 5432)
    }

    #[test]
    fn test_settings_start_at_defaults() {
        let set = db_settings();
        assert_eq!(set.get("host").and_then(ConfigValue::as_str), Some("localhost"));
        assert_eq!(set.get("port").and_then(ConfigValue::as_i64), Some(5432));
    }

    #[test]
    fn test_configure_overlays_declared_settings() {
        let mut set = db_settings();
        let section = ConfigValue::from(json!({ "port": 5433, "unknown": true }));
        set.configure(Some(&section)).unwrap();

        assert_eq!(set.get("host").and_then(ConfigValue::as_str), Some("localhost"));
        assert_eq!(set.get("port").and_then(ConfigValue::as_i64), Some(5433));
        assert!(set.get("unknown").is_none());
    }

    #[test]
    fn test_configure_with_no_section_resets_to_defaults() {
        let mut set = db_settings();
        let section = ConfigValue::from(json!({ "port": 9 }));
        set.configure(Some(&section)).unwrap();
        set.configure(None).unwrap();

        assert_eq!(set.get("port").and_then(ConfigValue::as_i64), Some(5432));
    }

    #[test]
    fn test_setting_set_participates_in_defaults_aggregation() {
        let set = Rc::new(RefCell::new(
            SettingSet::new("cache").with_key("svc.cache").setting("ttl", 30),
        ));
        let mut registry = Registry::new();
        registry.register(&ModuleRef::from(set)).unwrap();

        assert_eq!(
            registry.gather_defaults(),
            ConfigValue::from(json!({ "svc": { "cache": { "ttl": 30 } } }))
        );
    }

    #[test]
    fn test_setting_set_end_to_end() {
        let set = Rc::new(RefCell::new(db_settings()));
        let mut registry = Registry::new();
        registry.register(&ModuleRef::from(set.clone())).unwrap();

        registry
            .distribute(ConfigValue::from(json!({ "db": { "host": "db.internal" } })))
            .unwrap();

        assert_eq!(
            set.borrow().get("host").and_then(ConfigValue::as_str),
            Some("db.internal")
        );
        assert_eq!(set.borrow().get("port").and_then(ConfigValue::as_i64), Some(5432));
    }
}
