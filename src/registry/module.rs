//! The capability interface for modules that want configuration.

use std::any::type_name_of_val;
use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use crate::error::BoxError;
use crate::key::ConfigKey;
use crate::value::ConfigValue;

/// Implemented by anything that owns a named section of the configuration
/// document.
///
/// A module declares which section it wants through [`Configurable::config_key`]
/// and receives that section through [`Configurable::configure`] whenever a
/// document is distributed. Modules that also declare
/// [`Configurable::defaults`] participate in defaults aggregation.
pub trait Configurable {
    /// Human-readable module name, used to derive the config key when
    /// [`Configurable::config_key`] is not overridden. The default (empty)
    /// name falls back to the module's runtime type name.
    fn name(&self) -> &str {
        ""
    }

    /// The key naming this module's section of the document.
    ///
    /// Defaults to deriving from [`Configurable::name`], falling back to the
    /// runtime type name, falling back to the `anonymous` sentinel.
    fn config_key(&self) -> ConfigKey {
        let name = self.name();
        if name.is_empty() {
            ConfigKey::derive(type_name_of_val(self))
        } else {
            ConfigKey::derive(name)
        }
    }

    /// Receive this module's section of a distributed document, or `None`
    /// when the document has no section for its key.
    fn configure(&mut self, section: Option<&ConfigValue>) -> Result<(), BoxError>;

    /// The module's declared default subtree, if it has one. Modules
    /// without defaults are skipped by defaults aggregation.
    fn defaults(&self) -> Option<ConfigValue> {
        None
    }
}

/// Shared handle to a registered module.
///
/// The registry holds these by identity: the same handle (or a clone of it)
/// registered twice counts as one module. Single-threaded by design; wrap
/// the registry in your own lock if you need cross-thread access.
#[derive(Clone)]
pub struct ModuleRef {
    inner: Rc<RefCell<dyn Configurable>>,
}

impl ModuleRef {
    /// Wrap a module in a shared handle.
    pub fn new<M: Configurable + 'static>(module: M) -> Self {
        Self {
            inner: Rc::new(RefCell::new(module)),
        }
    }

    /// Immutably borrow the module.
    pub fn borrow(&self) -> Ref<'_, dyn Configurable> {
        self.inner.borrow()
    }

    /// Mutably borrow the module.
    pub fn borrow_mut(&self) -> RefMut<'_, dyn Configurable> {
        self.inner.borrow_mut()
    }

    /// The module's config key.
    pub fn config_key(&self) -> ConfigKey {
        self.inner.borrow().config_key()
    }

    /// Identity comparison: true if both handles point at the same module.
    pub fn same(&self, other: &ModuleRef) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<M: Configurable + 'static> From<Rc<RefCell<M>>> for ModuleRef {
    fn from(inner: Rc<RefCell<M>>) -> Self {
        Self { inner }
    }
}

impl fmt::Debug for ModuleRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.inner.try_borrow() {
            Ok(module) => f
                .debug_struct("ModuleRef")
                .field("config_key", &module.config_key().to_string())
                .finish(),
            Err(_) => f.debug_struct("ModuleRef").finish_non_exhaustive(),
        }
    }
}
