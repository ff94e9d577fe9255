//! Reconstruct a full default document from per-module declarations and
//! dump it as YAML.
//!
//! Run with: cargo run --example defaults_dump

use sectional::{BoxError, Config, ModuleRef, Registry, SettingSet};

fn main() -> Result<(), BoxError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let mut registry = Registry::new();
    registry.register(&ModuleRef::new(
        SettingSet::new("db")
            .setting("host", "localhost")
            .setting("port", 5432),
    ))?;
    registry.register(&ModuleRef::new(
        SettingSet::new("cache")
            .with_key("svc.cache")
            .setting("ttl", 30),
    ))?;
    registry.register(&ModuleRef::new(
        SettingSet::new("log").setting("level", "info"),
    ))?;

    let defaults = Config::from_value(registry.gather_defaults())?;
    print!("{}", defaults.dump()?);
    Ok(())
}
