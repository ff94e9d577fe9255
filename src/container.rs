//! The hierarchical configuration container.
//!
//! # Responsibilities
//! - Hold one subtree of configuration data with keyed and dotted access
//! - Promote nested mappings to containers so sections nest naturally
//! - Track mutation (dirty) state through the containment hierarchy
//! - Merge other containers or raw trees recursively
//!
//! # Design Decisions
//! - Backed by a real map, not synthesized accessors: "any key is readable
//!   and writable" is a map contract
//! - Reading an absent key returns `None` and never creates structure;
//!   intermediate sections are created only by the explicit
//!   [`ConfigStruct::ensure_section`] / [`ConfigStruct::set_at`] operations
//! - `set` marks dirty only when the new value actually differs, using
//!   value equality
//! - Equality between containers ignores dirty state

use std::collections::BTreeMap;

use crate::config::Config;
use crate::error::ConfigError;
use crate::key::ConfigKey;
use crate::value::ConfigValue;

/// One member of a [`ConfigStruct`]: either a leaf value or a nested
/// section.
#[derive(Debug, Clone, PartialEq)]
pub enum Setting {
    /// A scalar or sequence leaf.
    Value(ConfigValue),
    /// A nested configuration section.
    Section(ConfigStruct),
}

impl Setting {
    /// Borrow the leaf value, if this member is one.
    pub fn as_value(&self) -> Option<&ConfigValue> {
        match self {
            Setting::Value(v) => Some(v),
            Setting::Section(_) => None,
        }
    }

    /// Borrow the nested section, if this member is one.
    pub fn as_section(&self) -> Option<&ConfigStruct> {
        match self {
            Setting::Section(s) => Some(s),
            Setting::Value(_) => None,
        }
    }
}

impl From<ConfigValue> for Setting {
    /// Mapping values are promoted to nested sections; everything else is
    /// stored as a leaf.
    fn from(value: ConfigValue) -> Self {
        match value {
            ConfigValue::Map(map) => Setting::Section(ConfigStruct::from_map(map)),
            other => Setting::Value(other),
        }
    }
}

impl From<ConfigStruct> for Setting {
    fn from(section: ConfigStruct) -> Self {
        Setting::Section(section)
    }
}

impl From<&str> for Setting {
    fn from(s: &str) -> Self {
        Setting::Value(ConfigValue::from(s))
    }
}

impl From<i64> for Setting {
    fn from(n: i64) -> Self {
        Setting::Value(ConfigValue::from(n))
    }
}

impl From<i32> for Setting {
    fn from(n: i32) -> Self {
        Setting::Value(ConfigValue::from(n))
    }
}

impl From<f64> for Setting {
    fn from(f: f64) -> Self {
        Setting::Value(ConfigValue::from(f))
    }
}

impl From<bool> for Setting {
    fn from(b: bool) -> Self {
        Setting::Value(ConfigValue::from(b))
    }
}

/// Hierarchical, schema-less holder of configuration data.
///
/// Arbitrary keys can be read and written without prior declaration.
/// Mutations are tracked: [`ConfigStruct::is_dirty`] reports whether this
/// container or any nested section changed since construction.
#[derive(Debug, Clone, Default)]
pub struct ConfigStruct {
    entries: BTreeMap<String, Setting>,
    dirty: bool,
}

impl PartialEq for ConfigStruct {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

/// Anything a [`ConfigStruct`] can merge with.
pub enum MergeSource {
    /// Another container.
    Struct(ConfigStruct),
    /// A raw document tree; must be a mapping.
    Tree(ConfigValue),
}

impl From<ConfigStruct> for MergeSource {
    fn from(s: ConfigStruct) -> Self {
        MergeSource::Struct(s)
    }
}

impl From<&ConfigStruct> for MergeSource {
    fn from(s: &ConfigStruct) -> Self {
        MergeSource::Struct(s.clone())
    }
}

impl From<ConfigValue> for MergeSource {
    fn from(tree: ConfigValue) -> Self {
        MergeSource::Tree(tree)
    }
}

impl From<&Config> for MergeSource {
    fn from(config: &Config) -> Self {
        MergeSource::Struct(config.settings().clone())
    }
}

impl ConfigStruct {
    /// An empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a document tree. The tree must be a mapping; nested mappings
    /// become nested sections.
    pub fn from_tree(tree: ConfigValue) -> Result<Self, ConfigError> {
        match tree {
            ConfigValue::Map(map) => Ok(Self::from_map(map)),
            other => Err(ConfigError::MergeType { found: other.kind() }),
        }
    }

    fn from_map(map: BTreeMap<String, ConfigValue>) -> Self {
        Self {
            entries: map
                .into_iter()
                .map(|(k, v)| (k, Setting::from(v)))
                .collect(),
            dirty: false,
        }
    }

    /// Look up a direct member. Absent keys yield `None`; nothing is
    /// created by reading.
    pub fn get(&self, key: &str) -> Option<&Setting> {
        self.entries.get(key)
    }

    /// The leaf value stored under `key`, if any.
    pub fn value(&self, key: &str) -> Option<&ConfigValue> {
        self.get(key).and_then(Setting::as_value)
    }

    /// The nested section stored under `key`, if any.
    pub fn section(&self, key: &str) -> Option<&ConfigStruct> {
        self.get(key).and_then(Setting::as_section)
    }

    /// Mutable access to the nested section stored under `key`, if any.
    pub fn section_mut(&mut self, key: &str) -> Option<&mut ConfigStruct> {
        match self.entries.get_mut(key) {
            Some(Setting::Section(s)) => Some(s),
            _ => None,
        }
    }

    /// Assign `value` to the direct member `key`.
    ///
    /// Marks the container dirty only if the new value differs from the
    /// current one (value equality, not identity).
    pub fn set(&mut self, key: &str, value: impl Into<Setting>) {
        let value = value.into();
        if self.entries.get(key) != Some(&value) {
            self.dirty = true;
            self.entries.insert(key.to_string(), value);
        }
    }

    /// Return the section at `key`, creating an empty one if the slot is
    /// absent or null. A non-section value already stored there is replaced.
    ///
    /// This is the only way structure gets created without an assignment;
    /// plain reads never autovivify.
    pub fn ensure_section(&mut self, key: &str) -> &mut ConfigStruct {
        let needs_init = !matches!(self.entries.get(key), Some(Setting::Section(_)));
        if needs_init {
            self.dirty = true;
            self.entries
                .insert(key.to_string(), Setting::Section(ConfigStruct::new()));
        }

        match self.entries.get_mut(key) {
            Some(Setting::Section(s)) => s,
            _ => unreachable!("slot was just initialized as a section"),
        }
    }

    /// Look up a member through a dotted path, read-only.
    pub fn get_at(&self, path: impl Into<ConfigKey>) -> Option<&Setting> {
        let key = path.into();
        let mut segments = key.segments();
        let first = segments.next()?;

        let mut current = self.get(first)?;
        for segment in segments {
            current = current.as_section()?.get(segment)?;
        }
        Some(current)
    }

    /// The leaf value at a dotted path, if any.
    pub fn value_at(&self, path: impl Into<ConfigKey>) -> Option<&ConfigValue> {
        self.get_at(path).and_then(Setting::as_value)
    }

    /// Assign a value through a dotted path, creating intermediate sections
    /// as needed.
    pub fn set_at(&mut self, path: impl Into<ConfigKey>, value: impl Into<Setting>) {
        let key = path.into();
        let segments: Vec<&str> = key.segments().collect();
        let Some((leaf, parents)) = segments.split_last() else {
            return;
        };

        let mut current = self;
        for segment in parents {
            current = current.ensure_section(segment);
        }
        current.set(leaf, value);
    }

    /// The member names of this container.
    pub fn members(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Returns true if `key` names a direct member.
    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of direct members.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if this container has no members.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the direct members.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Setting)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns true if this container or any nested section was mutated
    /// since construction.
    pub fn is_dirty(&self) -> bool {
        self.dirty
            || self.entries.values().any(|setting| match setting {
                Setting::Section(s) => s.is_dirty(),
                Setting::Value(_) => false,
            })
    }

    /// Recursively merge `source` into this container.
    ///
    /// Where both sides hold sections the merge recurses; otherwise the
    /// incoming value wins. Accepts another container, a raw mapping tree,
    /// or a full [`Config`]; any other tree kind is a
    /// [`ConfigError::MergeType`]. Returns whether anything changed.
    ///
    /// Because leaves are right-biased, merging is not associative in
    /// general; merging disjoint key sets yields the union of both.
    pub fn merge_from(&mut self, source: impl Into<MergeSource>) -> Result<bool, ConfigError> {
        let other = match source.into() {
            MergeSource::Struct(s) => s,
            MergeSource::Tree(tree) => ConfigStruct::from_tree(tree)?,
        };
        Ok(self.merge_struct(other))
    }

    /// Non-destructive merge: returns a new container that is the result of
    /// merging `source` onto a copy of this one.
    pub fn merged(&self, source: impl Into<MergeSource>) -> Result<ConfigStruct, ConfigError> {
        let mut copy = self.clone();
        copy.merge_from(source)?;
        Ok(copy)
    }

    fn merge_struct(&mut self, other: ConfigStruct) -> bool {
        let mut changed = false;
        for (key, theirs) in other.entries {
            match (self.entries.get_mut(&key), theirs) {
                (Some(Setting::Section(mine)), Setting::Section(theirs)) => {
                    changed |= mine.merge_struct(theirs);
                }
                (Some(existing), theirs) => {
                    if *existing != theirs {
                        *existing = theirs;
                        changed = true;
                    }
                }
                (None, theirs) => {
                    self.entries.insert(key, theirs);
                    changed = true;
                }
            }
        }
        self.dirty |= changed;
        changed
    }

    /// Flatten back into a plain document tree suitable for serialization.
    /// Sections become mappings; leaves are copied.
    pub fn to_tree(&self) -> ConfigValue {
        ConfigValue::Map(
            self.entries
                .iter()
                .map(|(key, setting)| {
                    let value = match setting {
                        Setting::Value(v) => v.clone(),
                        Setting::Section(s) => s.to_tree(),
                    };
                    (key.clone(), value)
                })
                .collect(),
        )
    }
}

impl From<&ConfigStruct> for ConfigValue {
    fn from(s: &ConfigStruct) -> Self {
        s.to_tree()
    }
}
