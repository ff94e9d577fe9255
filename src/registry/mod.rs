//! Module registration and configuration dispatch.
//!
//! # Data Flow
//! ```text
//! parsed document (ConfigValue)
//!     → Registry::distribute
//!     → resolver finds each module's section by its config key
//!     → module.configure(section) in registration order
//!     → post-configure hooks fire, in registration order
//!
//! Late arrivals:
//!     Registry::register while a document is loaded → configured immediately
//!     Registry::late_bind after a module installs its real entry point
//!         → that one module is re-configured from the loaded document
//! ```
//!
//! # Design Decisions
//! - The registry is an explicit state object handed around by the
//!   application, not ambient global state
//! - Dispatch is fail-fast: a failing entry point aborts the remaining
//!   modules and leaves them unconfigured
//! - Re-distributing an unchanged document re-invokes every entry point;
//!   there is no dedup against the previously seen section
//! - No internal locking: the registry is single-threaded (`ModuleRef` is
//!   `Rc`-based); callers that share it across threads serialize externally

pub mod defaults;
pub mod module;
pub mod settings;

pub use module::{Configurable, ModuleRef};
pub use settings::SettingSet;

use tracing::debug;

use crate::error::ConfigError;
use crate::resolver;
use crate::value::ConfigValue;

/// Tracks which modules want configuration and which document is currently
/// active.
#[derive(Default)]
pub struct Registry {
    modules: Vec<ModuleRef>,
    loaded: Option<ConfigValue>,
    hooks: Vec<Box<dyn FnMut()>>,
    hooks_run: bool,
}

impl Registry {
    /// An empty registry with no modules and no loaded document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module to the tracked set.
    ///
    /// Idempotent by handle identity: registering the same module twice is
    /// harmless. If a document has already been distributed, the module's
    /// section is resolved and dispatched to it immediately.
    pub fn register(&mut self, module: &ModuleRef) -> Result<(), ConfigError> {
        if self.is_registered(module) {
            debug!(key = %module.config_key(), "module already registered");
            return Ok(());
        }

        debug!(key = %module.config_key(), "registering module");
        self.modules.push(module.clone());

        if let Some(document) = &self.loaded {
            install(document, module)?;
        }
        Ok(())
    }

    /// Returns true if `module` is already in the tracked set.
    pub fn is_registered(&self, module: &ModuleRef) -> bool {
        self.modules.iter().any(|m| m.same(module))
    }

    /// Number of registered modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Returns true if no modules are registered.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Iterate over the registered modules in registration order.
    pub fn modules(&self) -> impl Iterator<Item = &ModuleRef> {
        self.modules.iter()
    }

    /// The most recently distributed document, if any.
    pub fn loaded(&self) -> Option<&ConfigValue> {
        self.loaded.as_ref()
    }

    /// Distribute `document` to every registered module.
    ///
    /// Each module's section is resolved by its config key and handed to its
    /// entry point (as `None` when the document has no such section), in
    /// registration order. Afterwards every post-configure hook fires once,
    /// in registration order. The document becomes the loaded document,
    /// visible to later `register` calls.
    ///
    /// Fail-fast: the first module error aborts dispatch, leaving later
    /// modules unconfigured and skipping the hooks. There are no
    /// transactional semantics.
    pub fn distribute(&mut self, document: impl Into<ConfigValue>) -> Result<(), ConfigError> {
        let document = document.into();
        debug!(
            modules = self.modules.len(),
            "distributing configuration document"
        );
        self.loaded = Some(document);

        if let Some(document) = &self.loaded {
            for module in &self.modules {
                install(document, module)?;
            }
        }

        for hook in &mut self.hooks {
            hook();
        }
        self.hooks_run = true;
        Ok(())
    }

    /// Re-configure a single module from the loaded document.
    ///
    /// This is the deferred-configuration entry point: a module whose real
    /// entry point only exists after registration calls this once it is
    /// installed. A handle that was never registered is registered here
    /// first, so the module is configured exactly once either way. Returns
    /// `true` if a document was loaded and the module was configured,
    /// `false` if there was nothing to do.
    pub fn late_bind(&mut self, module: &ModuleRef) -> Result<bool, ConfigError> {
        if !self.is_registered(module) {
            debug!(key = %module.config_key(), "late_bind on unregistered module, registering");
            self.register(module)?;
            return Ok(self.loaded.is_some());
        }

        match &self.loaded {
            Some(document) => {
                debug!(key = %module.config_key(), "late-binding module configuration");
                install(document, module)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Clear the loaded document and the hooks-run flag.
    ///
    /// Registered modules and hooks stay registered.
    pub fn reset(&mut self) {
        self.loaded = None;
        self.hooks_run = false;
    }

    /// Register a callback that fires after every completed distribute.
    ///
    /// If a distribute has already completed, the callback also fires
    /// immediately so late registrants are not silently skipped.
    pub fn add_post_configure_hook(&mut self, hook: impl FnMut() + 'static) {
        let mut hook = Box::new(hook);
        if self.hooks_run {
            debug!("post-configure hooks already ran, firing new hook immediately");
            hook();
        }
        self.hooks.push(hook);
    }
}

/// Resolve the module's section of `document` and hand it to the module's
/// entry point.
fn install(document: &ConfigValue, module: &ModuleRef) -> Result<(), ConfigError> {
    let key = module.config_key();
    let section = resolver::resolve(document, &key);
    debug!(%key, found = section.is_some(), "installing config section");

    module
        .borrow_mut()
        .configure(section)
        .map_err(|source| ConfigError::ModuleDispatch { key, source })
}
