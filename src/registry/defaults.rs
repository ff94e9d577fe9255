//! Defaults aggregation.
//!
//! Rebuilds a full default document from the union of every registered
//! module's declared defaults, each nested under that module's key path.

use std::collections::BTreeMap;

use tracing::debug;

use crate::container::ConfigStruct;
use crate::key::ConfigKey;
use crate::registry::Registry;
use crate::value::{deep_merge, ConfigValue};

impl Registry {
    /// Collect every registered module's declared defaults into one tree.
    ///
    /// Each module's defaults subtree is nested under its key segments and
    /// deep-merged into the accumulator in registration order, so the last
    /// module to declare a conflicting scalar wins. Modules without a
    /// defaults provider are skipped; that is normal, not a failure.
    pub fn gather_defaults(&self) -> ConfigValue {
        let mut aggregate = ConfigValue::empty_map();

        for module in self.modules() {
            let module = module.borrow();
            let key = module.config_key();
            match module.defaults() {
                Some(defaults) => {
                    debug!(%key, "merging module defaults");
                    aggregate = deep_merge(aggregate, nest_under_key(&key, defaults));
                }
                None => {
                    debug!(%key, "module declares no defaults, skipping");
                }
            }
        }

        aggregate
    }

    /// The aggregated defaults wrapped in a [`ConfigStruct`].
    pub fn default_config(&self) -> ConfigStruct {
        // gather_defaults always produces a mapping
        ConfigStruct::from_tree(self.gather_defaults()).unwrap_or_default()
    }
}

/// Wrap `defaults` in one single-key mapping per key segment, innermost out,
/// so a key `a.b.c` yields `{a: {b: {c: defaults}}}`.
fn nest_under_key(key: &ConfigKey, defaults: ConfigValue) -> ConfigValue {
    key.segments().rev().fold(defaults, |inner, segment| {
        let mut wrapper = BTreeMap::new();
        wrapper.insert(segment.to_string(), inner);
        ConfigValue::Map(wrapper)
    })
}
