//! Sectioned configuration distribution library.
//!
//! One loaded configuration document is split between an open set of
//! independently defined modules, each owning a named section of it.
//! Modules implement [`Configurable`], register with a [`Registry`], and
//! receive their section whenever a document is distributed, including
//! modules registered after the document was loaded.

pub mod config;
pub mod container;
pub mod error;
pub mod key;
pub mod registry;
pub mod resolver;
pub mod value;

pub use config::{Config, ConfigWatcher};
pub use container::{ConfigStruct, Setting};
pub use error::{BoxError, ConfigError};
pub use key::ConfigKey;
pub use registry::{Configurable, ModuleRef, Registry, SettingSet};
pub use value::{deep_merge, ConfigValue};
