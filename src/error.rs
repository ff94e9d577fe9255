//! Error definitions for the configuration core.

use thiserror::Error;

use crate::key::ConfigKey;

/// Boxed error type for failures raised inside module entry points.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur during configuration handling.
///
/// A key that resolves to no section is not an error; it is reported as
/// `None` and the module is configured with nothing.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A module's configure entry point failed during distribution.
    /// Distribution is fail-fast: modules registered after the failing one
    /// are left unconfigured.
    #[error("module `{key}` failed to configure")]
    ModuleDispatch {
        key: ConfigKey,
        #[source]
        source: BoxError,
    },

    /// Attempted to merge a value kind the container cannot merge with.
    #[error("cannot merge configuration with a {found} value")]
    MergeType { found: &'static str },

    /// A write or reload was requested but the configuration has no source
    /// path associated with it.
    #[error("no source path associated with this configuration")]
    NoSource,

    /// Reading or writing the configuration source failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration source could not be parsed as YAML.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration source could not be parsed as TOML.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
