//! End-to-end distribution scenarios: registration, dispatch, deferred
//! configuration and defaults aggregation working together.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::json;

use sectional::{
    BoxError, Config, ConfigKey, ConfigValue, Configurable, ModuleRef, Registry, SettingSet,
};

/// A module that remembers every section it was configured with.
struct Recorder {
    key: &'static str,
    defaults: Option<ConfigValue>,
    seen: Vec<Option<ConfigValue>>,
}

impl Recorder {
    fn new(key: &'static str) -> Self {
        Self {
            key,
            defaults: None,
            seen: Vec::new(),
        }
    }

    fn with_defaults(key: &'static str, defaults: serde_json::Value) -> Self {
        Self {
            key,
            defaults: Some(ConfigValue::from(defaults)),
            seen: Vec::new(),
        }
    }
}

impl Configurable for Recorder {
    fn config_key(&self) -> ConfigKey {
        ConfigKey::new(self.key)
    }

    fn configure(&mut self, section: Option<&ConfigValue>) -> Result<(), BoxError> {
        self.seen.push(section.cloned());
        Ok(())
    }

    fn defaults(&self) -> Option<ConfigValue> {
        self.defaults.clone()
    }
}

fn recorder(key: &'static str) -> (Rc<RefCell<Recorder>>, ModuleRef) {
    let inner = Rc::new(RefCell::new(Recorder::new(key)));
    let handle = ModuleRef::from(inner.clone());
    (inner, handle)
}

#[test]
fn scenario_register_then_distribute() {
    let (inner, handle) = recorder("db");
    let mut registry = Registry::new();
    registry.register(&handle).unwrap();

    // Nothing loaded yet: configure must not have been called.
    assert!(inner.borrow().seen.is_empty());

    registry
        .distribute(ConfigValue::from(json!({ "db": { "host": "localhost" } })))
        .unwrap();

    assert_eq!(
        inner.borrow().seen,
        vec![Some(ConfigValue::from(json!({ "host": "localhost" })))]
    );
}

#[test]
fn scenario_nested_key_then_resolution_miss() {
    let (inner, handle) = recorder("svc.cache");
    let mut registry = Registry::new();
    registry.register(&handle).unwrap();

    registry
        .distribute(ConfigValue::from(json!({ "svc": { "cache": { "ttl": 30 } } })))
        .unwrap();
    registry
        .distribute(ConfigValue::from(json!({ "other": 1 })))
        .unwrap();

    let seen = &inner.borrow().seen;
    assert_eq!(seen[0], Some(ConfigValue::from(json!({ "ttl": 30 }))));
    assert_eq!(seen[1], None);
}

#[test]
fn scenario_disjoint_defaults_aggregate() {
    let a = ModuleRef::new(Recorder::with_defaults("a", json!({ "one": 1 })));
    let b = ModuleRef::new(Recorder::with_defaults("b", json!({ "two": 2 })));

    let mut registry = Registry::new();
    registry.register(&a).unwrap();
    registry.register(&b).unwrap();

    assert_eq!(
        registry.gather_defaults(),
        ConfigValue::from(json!({ "a": { "one": 1 }, "b": { "two": 2 } }))
    );
}

#[test]
fn scenario_deferred_configuration_via_late_bind() {
    // A placeholder entry point is registered first; the real behavior is
    // installed later, after a document is already loaded.
    struct TwoPhase {
        armed: bool,
        received: Option<ConfigValue>,
    }

    impl Configurable for TwoPhase {
        fn config_key(&self) -> ConfigKey {
            ConfigKey::new("m")
        }

        fn configure(&mut self, section: Option<&ConfigValue>) -> Result<(), BoxError> {
            if self.armed {
                self.received = section.cloned();
            }
            Ok(())
        }
    }

    let module = Rc::new(RefCell::new(TwoPhase {
        armed: false,
        received: None,
    }));
    let handle = ModuleRef::from(module.clone());

    let mut registry = Registry::new();
    registry.register(&handle).unwrap();
    registry
        .distribute(ConfigValue::from(json!({ "m": { "v": 9 } })))
        .unwrap();

    // The placeholder ignored the section.
    assert!(module.borrow().received.is_none());

    // Install the real entry point, then late-bind; no second distribute.
    module.borrow_mut().armed = true;
    assert!(registry.late_bind(&handle).unwrap());
    assert_eq!(
        module.borrow().received,
        Some(ConfigValue::from(json!({ "v": 9 })))
    );
}

#[test]
fn defaults_feed_back_through_distribution() {
    let (inner, handle) = recorder("db");
    let db_defaults = ModuleRef::new(Recorder::with_defaults("db", json!({ "host": "fallback" })));

    let mut registry = Registry::new();
    registry.register(&db_defaults).unwrap();
    registry.register(&handle).unwrap();

    // Reconstruct the default document and push it back through dispatch.
    let defaults = registry.default_config();
    registry.distribute(defaults.to_tree()).unwrap();

    assert_eq!(
        inner.borrow().seen,
        vec![Some(ConfigValue::from(json!({ "host": "fallback" })))]
    );
}

#[test]
fn config_document_distributes_like_a_raw_tree() {
    let (inner, handle) = recorder("db");
    let mut registry = Registry::new();
    registry.register(&handle).unwrap();

    let config = Config::from_source("db:\n  host: filehost\n").unwrap();
    config.install(&mut registry).unwrap();

    assert_eq!(
        inner.borrow().seen,
        vec![Some(ConfigValue::from(json!({ "host": "filehost" })))]
    );
}

#[test]
fn setting_sets_and_plain_modules_share_a_registry() {
    let settings = Rc::new(RefCell::new(
        SettingSet::new("cache")
            .with_key("svc.cache")
            .setting("ttl", 30),
    ));
    let (plain, plain_handle) = recorder("svc.workers");

    let mut registry = Registry::new();
    registry.register(&ModuleRef::from(settings.clone())).unwrap();
    registry.register(&plain_handle).unwrap();

    registry
        .distribute(ConfigValue::from(json!({
            "svc": { "cache": { "ttl": 60 }, "workers": { "count": 4 } }
        })))
        .unwrap();

    assert_eq!(
        settings.borrow().get("ttl").and_then(ConfigValue::as_i64),
        Some(60)
    );
    assert_eq!(
        plain.borrow().seen,
        vec![Some(ConfigValue::from(json!({ "count": 4 })))]
    );
}
