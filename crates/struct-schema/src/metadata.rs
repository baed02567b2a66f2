//! Namespaced side-channel storage attached to schema nodes
//!
//! Libraries built on top of `struct-schema` keep their own per-node data
//! here without the schema model knowing about it. Each entry is keyed by a
//! [`MetadataId`] so unrelated consumers cannot clobber each other.

use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a metadata entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MetadataId {
    namespace: &'static str,
    name: &'static str,
}

impl MetadataId {
    /// Create an identifier; usable in `const` items
    #[must_use]
    pub const fn new(namespace: &'static str, name: &'static str) -> Self {
        Self { namespace, name }
    }

    /// Owning namespace, usually the consuming crate's name
    #[must_use]
    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Entry name within the namespace
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    fn key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for MetadataId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.namespace, self.name)
    }
}

/// Metadata entries of a single schema node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    entries: BTreeMap<String, Value>,
}

impl Metadata {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an entry
    #[must_use]
    pub fn get(&self, id: MetadataId) -> Option<&Value> {
        self.entries.get(&id.key())
    }

    /// Set an entry, replacing any previous value
    pub fn set(&mut self, id: MetadataId, value: Value) {
        self.entries.insert(id.key(), value);
    }

    /// Remove an entry and return it
    pub fn remove(&mut self, id: MetadataId) -> Option<Value> {
        self.entries.remove(&id.key())
    }

    /// Check whether an entry exists
    #[must_use]
    pub fn contains(&self, id: MetadataId) -> bool {
        self.entries.contains_key(&id.key())
    }

    /// Whether the store holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
