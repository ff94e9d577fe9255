//! Key resolution over document trees.
//!
//! # Responsibilities
//! - Walk a (possibly multi-segment) config key down a document tree
//! - Report a missing section as `None`, never as an error
//!
//! # Design Decisions
//! - Pattern-matches on the closed [`ConfigValue`] variant instead of
//!   probing node capabilities at runtime
//! - A `null` node counts as "no section": resolving through or to it
//!   yields `None`

use tracing::debug;

use crate::key::ConfigKey;
use crate::value::ConfigValue;

/// Find the subtree of `document` that corresponds to `key`.
///
/// Walks one segment at a time; if any segment has no corresponding child,
/// or an intermediate node is not a mapping, the whole resolution
/// short-circuits to `None`.
pub fn resolve<'a>(document: &'a ConfigValue, key: &ConfigKey) -> Option<&'a ConfigValue> {
    let mut node = Some(document);
    for segment in key.segments() {
        node = node.and_then(|n| subsection(n, segment));
    }

    match node {
        Some(found) if !found.is_null() => Some(found),
        Some(_) => {
            debug!(%key, "section resolved to null, treating as no section");
            None
        }
        None => {
            debug!(%key, "no section found in document");
            None
        }
    }
}

/// The child of `node` named `segment`, if `node` is a mapping that has one.
pub fn subsection<'a>(node: &'a ConfigValue, segment: &str) -> Option<&'a ConfigValue> {
    match node {
        ConfigValue::Map(map) => map.get(segment),
        _ => None,
    }
}
