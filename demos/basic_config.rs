//! Minimal walkthrough: two modules, one YAML document, one registry.
//!
//! Run with: cargo run --example basic_config

use std::cell::RefCell;
use std::rc::Rc;

use sectional::{BoxError, Config, ConfigKey, ConfigValue, Configurable, ModuleRef, Registry};

struct Database {
    host: String,
    port: i64,
}

impl Configurable for Database {
    fn config_key(&self) -> ConfigKey {
        ConfigKey::new("db")
    }

    fn configure(&mut self, section: Option<&ConfigValue>) -> Result<(), BoxError> {
        if let Some(section) = section {
            if let Some(host) = section.get("host").and_then(ConfigValue::as_str) {
                self.host = host.to_string();
            }
            if let Some(port) = section.get("port").and_then(ConfigValue::as_i64) {
                self.port = port;
            }
        }
        Ok(())
    }
}

struct Cache {
    ttl: i64,
}

impl Configurable for Cache {
    fn config_key(&self) -> ConfigKey {
        ConfigKey::new("svc.cache")
    }

    fn configure(&mut self, section: Option<&ConfigValue>) -> Result<(), BoxError> {
        self.ttl = section
            .and_then(|s| s.get("ttl"))
            .and_then(ConfigValue::as_i64)
            .unwrap_or(30);
        Ok(())
    }
}

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "debug".into()),
        )
        .init();

    let db = Rc::new(RefCell::new(Database {
        host: "localhost".into(),
        port: 5432,
    }));
    let cache = Rc::new(RefCell::new(Cache { ttl: 30 }));

    let mut registry = Registry::new();
    registry.register(&ModuleRef::from(db.clone()))?;
    registry.register(&ModuleRef::from(cache.clone()))?;
    registry.add_post_configure_hook(|| println!("configuration distributed"));

    let config = Config::from_source(
        "db:\n  host: db.internal\n  port: 5433\nsvc:\n  cache:\n    ttl: 120\n",
    )?;
    config.install(&mut registry)?;

    println!("db    -> {}:{}", db.borrow().host, db.borrow().port);
    println!("cache -> ttl {}", cache.borrow().ttl);
    Ok(())
}
