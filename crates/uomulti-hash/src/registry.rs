//! Reverse lookup from identifier hash to numeric id

use crate::identifier::identifier_hash;
use crate::template::NameTemplate;
use std::collections::HashMap;
use std::ops::RangeInclusive;

/// Map of identifier hashes to the ids whose names produce them
///
/// Populated by hashing a name template over a range of ids. Inserting an
/// existing hash replaces its id.
#[derive(Debug, Clone, Default)]
pub struct IdentifierRegistry {
    hashes: HashMap<u64, u32>,
}

impl IdentifierRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry covering every id in `ids`
    pub fn from_template(template: &NameTemplate, ids: RangeInclusive<u32>) -> Self {
        let mut registry = Self::new();
        registry.load(template, ids);
        registry
    }

    /// Hash the template for every id in `ids` and record the results
    pub fn load(&mut self, template: &NameTemplate, ids: RangeInclusive<u32>) {
        self.hashes.reserve(ids.size_hint().0);
        for id in ids {
            self.hashes.insert(identifier_hash(template.format(id)), id);
        }
    }

    /// Record a single hash/id pair
    pub fn insert(&mut self, hash: u64, id: u32) {
        self.hashes.insert(hash, id);
    }

    /// Look up the id for a hash
    pub fn get(&self, hash: u64) -> Option<u32> {
        self.hashes.get(&hash).copied()
    }

    /// Whether a hash is known
    pub fn contains(&self, hash: u64) -> bool {
        self.hashes.contains_key(&hash)
    }

    /// Number of distinct hashes
    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    /// Whether the registry holds no hashes
    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Remove all hashes
    pub fn clear(&mut self) {
        self.hashes.clear();
    }
}
