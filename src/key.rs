//! Config key normalization and derivation.
//!
//! # Responsibilities
//! - Hold the normalized path that names a module's section of the document
//! - Convert between the dotted API form (`"svc.cache"`) and the canonical
//!   internal form (`"svc__cache"`)
//! - Derive a key from a module name when none was declared
//!
//! # Design Decisions
//! - Stored as path segments; both textual forms are views over the same key
//! - Keys are not required to be unique across modules
//! - Derivation lowercases and strips `::`-qualified prefixes so type paths
//!   make usable keys

use std::fmt;
use std::str::FromStr;

/// The separator used by the canonical internal key form.
pub const CANONICAL_SEPARATOR: &str = "__";

/// Fallback key for modules with no usable name.
pub const ANONYMOUS_KEY: &str = "anonymous";

/// The normalized path identifying which subtree of a document belongs to a
/// module.
///
/// A key with N segments resolves to a node N levels deep.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConfigKey {
    segments: Vec<String>,
}

impl ConfigKey {
    /// Parse a key from either the dotted form (`"a.b.c"`) or the canonical
    /// internal form (`"a__b__c"`). The two are equivalent and may be mixed
    /// within one key.
    pub fn new(raw: &str) -> Self {
        Self {
            segments: raw
                .replace(CANONICAL_SEPARATOR, ".")
                .split('.')
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Build a key from pre-split segments.
    pub fn from_segments<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Derive a default key from a module or type name.
    ///
    /// Strips everything up to the last `::`, collapses runs of
    /// non-alphanumeric characters into single underscores, and lowercases.
    /// An empty or unusable name yields the `anonymous` sentinel key.
    pub fn derive(name: &str) -> Self {
        let unqualified = match name.rfind("::") {
            Some(idx) => &name[idx + 2..],
            None => name,
        };

        let mut normalized = String::with_capacity(unqualified.len());
        let mut pending_separator = false;
        for ch in unqualified.chars() {
            if ch.is_ascii_alphanumeric() {
                if pending_separator && !normalized.is_empty() {
                    normalized.push('_');
                }
                pending_separator = false;
                normalized.push(ch.to_ascii_lowercase());
            } else {
                pending_separator = true;
            }
        }

        if normalized.is_empty() {
            Self::from_segments([ANONYMOUS_KEY])
        } else {
            Self::from_segments([normalized])
        }
    }

    /// The path segments, outermost first.
    pub fn segments(&self) -> impl DoubleEndedIterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Number of path segments.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// The canonical internal form, segments joined by `__`.
    pub fn canonical(&self) -> String {
        self.segments.join(CANONICAL_SEPARATOR)
    }
}

impl fmt::Display for ConfigKey {
    /// The human-friendly dotted form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

impl From<&str> for ConfigKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl FromStr for ConfigKey {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dotted_and_canonical_forms_are_equivalent() {
        let dotted = ConfigKey::new("svc.cache.ttl");
        let canonical = ConfigKey::new("svc__cache__ttl");

        assert_eq!(dotted, canonical);
        assert_eq!(dotted.depth(), 3);
        assert_eq!(dotted.canonical(), "svc__cache__ttl");
        assert_eq!(dotted.to_string(), "svc.cache.ttl");
    }

    #[test]
    fn test_mixed_separator_forms_split_on_both() {
        let mixed = ConfigKey::new("a.b__c");
        assert_eq!(mixed.segments().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert_eq!(mixed, ConfigKey::new("a.b.c"));
        assert_eq!(mixed, ConfigKey::new("a__b__c"));
    }

    #[test]
    fn test_single_segment_key() {
        let key = ConfigKey::new("db");
        assert_eq!(key.depth(), 1);
        assert_eq!(key.segments().collect::<Vec<_>>(), vec!["db"]);
    }

    #[test]
    fn test_derive_strips_qualifiers_and_lowercases() {
        assert_eq!(ConfigKey::derive("myapp::db::DbPool"), ConfigKey::new("dbpool"));
        assert_eq!(ConfigKey::derive("Cache Manager"), ConfigKey::new("cache_manager"));
        assert_eq!(ConfigKey::derive("HTTP/2 Frontend"), ConfigKey::new("http_2_frontend"));
    }

    #[test]
    fn test_derive_empty_name_is_anonymous() {
        assert_eq!(ConfigKey::derive(""), ConfigKey::new(ANONYMOUS_KEY));
        assert_eq!(ConfigKey::derive("!!!"), ConfigKey::new(ANONYMOUS_KEY));
    }
}
