//! Identifier-keyed store of loaded modules.
//!
//! Backed by an [`IndexMap`], so enumeration follows first-insertion order.
//! Overwriting an identifier keeps its original position.

use indexmap::IndexMap;

use crate::module::ModuleEntry;

pub struct Catalog<C> {
    entries: IndexMap<String, ModuleEntry<C>>,
}

impl<C> Catalog<C> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.contains_key(identifier)
    }

    pub fn get(&self, identifier: &str) -> Option<&ModuleEntry<C>> {
        self.entries.get(identifier)
    }

    /// Insert under `entry.identifier`, returning the entry it replaced.
    pub fn insert(&mut self, entry: ModuleEntry<C>) -> Option<ModuleEntry<C>> {
        self.entries.insert(entry.identifier.clone(), entry)
    }

    pub fn remove(&mut self, identifier: &str) -> Option<ModuleEntry<C>> {
        self.entries.shift_remove(identifier)
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModuleEntry<C>> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C> Default for Catalog<C> {
    fn default() -> Self {
        Self::new()
    }
}
