//! Configuration documents with provenance.
//!
//! # Data Flow
//! ```text
//! config file (YAML/TOML)
//!     → loader.rs (read & parse into a ConfigValue tree)
//!     → deep-merged over optional defaults
//!     → Config (ConfigStruct + source path + load time)
//!     → Config::install hands it to a Registry for distribution
//!
//! On reload:
//!     watcher.rs detects a change, or the caller polls source_changed()
//!     → loader re-parses
//!     → caller re-distributes
//! ```
//!
//! # Design Decisions
//! - File I/O lives here, at the edge; the registry, resolver and container
//!   never touch the filesystem
//! - A config remembers where it came from so staleness checks and reloads
//!   are possible; reloading without a source is a loud error
//! - Dumps are YAML regardless of the source format

pub mod loader;
pub mod watcher;

pub use watcher::ConfigWatcher;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info};

use crate::container::ConfigStruct;
use crate::error::ConfigError;
use crate::registry::Registry;
use crate::value::{deep_merge, ConfigValue};

/// A loaded configuration document: the settings tree plus where it came
/// from and when.
#[derive(Debug, Clone)]
pub struct Config {
    settings: ConfigStruct,
    defaults: Option<ConfigValue>,
    path: Option<PathBuf>,
    time_created: SystemTime,
}

impl Config {
    /// An empty in-memory configuration.
    pub fn new() -> Self {
        Self {
            settings: ConfigStruct::new(),
            defaults: None,
            path: None,
            time_created: SystemTime::now(),
        }
    }

    /// Wrap an already-parsed document tree. The tree must be a mapping
    /// (or null, which counts as empty).
    pub fn from_value(tree: ConfigValue) -> Result<Self, ConfigError> {
        let mut config = Self::new();
        config.settings = make_settings(tree, None)?;
        Ok(config)
    }

    /// Parse an in-memory YAML source.
    pub fn from_source(source: &str) -> Result<Self, ConfigError> {
        let tree: ConfigValue = serde_yaml::from_str(source)?;
        Self::from_value(tree)
    }

    /// Read and parse the file at `path`. The parser is chosen by file
    /// extension; see [`loader`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::load_inner(path.as_ref(), None)
    }

    /// Like [`Config::load`], with the parsed document deep-merged over
    /// `defaults` (document values win).
    pub fn load_with_defaults(
        path: impl AsRef<Path>,
        defaults: ConfigValue,
    ) -> Result<Self, ConfigError> {
        Self::load_inner(path.as_ref(), Some(defaults))
    }

    fn load_inner(path: &Path, defaults: Option<ConfigValue>) -> Result<Self, ConfigError> {
        let tree = loader::load_document(path)?;
        info!(path = %path.display(), "loaded configuration");

        Ok(Self {
            settings: make_settings(tree, defaults.as_ref())?,
            defaults,
            path: Some(path.to_path_buf()),
            time_created: SystemTime::now(),
        })
    }

    /// The root settings container.
    pub fn settings(&self) -> &ConfigStruct {
        &self.settings
    }

    /// Mutable access to the root settings container.
    pub fn settings_mut(&mut self) -> &mut ConfigStruct {
        &mut self.settings
    }

    /// The file this configuration was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// When this configuration was loaded or created.
    pub fn time_created(&self) -> SystemTime {
        self.time_created
    }

    /// Flatten into a plain document tree.
    pub fn to_tree(&self) -> ConfigValue {
        self.settings.to_tree()
    }

    /// Serialize to YAML.
    pub fn dump(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(&self.to_tree())?)
    }

    /// Write the configuration back to its source path.
    pub fn write(&self) -> Result<(), ConfigError> {
        match &self.path {
            Some(path) => self.write_to(path),
            None => Err(ConfigError::NoSource),
        }
    }

    /// Write the configuration to `path` as YAML.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        info!(path = %path.display(), "writing configuration");
        std::fs::write(path, self.dump()?)?;
        Ok(())
    }

    /// Returns true if the settings were mutated since load, or the source
    /// file has been updated since then.
    pub fn changed(&self) -> bool {
        self.settings.is_dirty() || self.source_changed()
    }

    /// The persistence-layer staleness predicate: true if the source file's
    /// modification time is newer than this configuration's load time.
    pub fn source_changed(&self) -> bool {
        match &self.path {
            Some(path) => self.is_older_than(path),
            None => false,
        }
    }

    /// Returns true if the file at `path` was modified after this
    /// configuration was created. A missing file counts as unchanged.
    pub fn is_older_than(&self, path: impl AsRef<Path>) -> bool {
        let Ok(metadata) = std::fs::metadata(path.as_ref()) else {
            return false;
        };
        match metadata.modified() {
            Ok(mtime) => mtime > self.time_created,
            Err(_) => false,
        }
    }

    /// Re-read the configuration from its source path if it has changed.
    ///
    /// Returns whether a reload actually happened. Calling this on a config
    /// with no source path is a programmer error and fails with
    /// [`ConfigError::NoSource`]. The caller is responsible for
    /// re-distributing after a successful reload.
    pub fn reload(&mut self) -> Result<bool, ConfigError> {
        let path = self.path.clone().ok_or(ConfigError::NoSource)?;

        if !self.changed() {
            debug!(path = %path.display(), "configuration unchanged, skipping reload");
            return Ok(false);
        }

        let tree = loader::load_document(&path)?;
        self.settings = make_settings(tree, self.defaults.as_ref())?;
        self.time_created = SystemTime::now();
        info!(path = %path.display(), "reloaded configuration");
        Ok(true)
    }

    /// Distribute this configuration through `registry`.
    pub fn install(&self, registry: &mut Registry) -> Result<(), ConfigError> {
        registry.distribute(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&Config> for ConfigValue {
    fn from(config: &Config) -> Self {
        config.to_tree()
    }
}

/// Merge a parsed tree over its defaults and wrap the result. A null tree
/// (empty document) counts as an empty mapping.
fn make_settings(
    tree: ConfigValue,
    defaults: Option<&ConfigValue>,
) -> Result<ConfigStruct, ConfigError> {
    let tree = if tree.is_null() {
        ConfigValue::empty_map()
    } else {
        tree
    };

    let merged = match defaults {
        Some(defaults) => deep_merge(defaults.clone(), tree),
        None => tree,
    };
    ConfigStruct::from_tree(merged)
}
