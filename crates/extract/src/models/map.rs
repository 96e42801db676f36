use std::collections::BTreeMap;
use std::collections::btree_map::{IntoIter, Iter};

use super::ResourceKey;

/// Download URLs keyed by [`ResourceKey`].
///
/// A map may be partial: a key that wasn't found is absent, not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceMap {
    entries: BTreeMap<ResourceKey, String>,
}
impl ResourceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: ResourceKey) -> Option<&str> {
        self.entries.get(&key).map(String::as_str)
    }

    pub fn contains(&self, key: ResourceKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Stores `url` for `key`, returning the value it replaced.
    pub fn insert(&mut self, key: ResourceKey, url: impl Into<String>) -> Option<String> {
        self.entries.insert(key, url.into())
    }

    /// Merges a newer map into this one.
    ///
    /// Every key present in `newer` overwrites the stored value; keys absent
    /// from `newer` keep whatever this map already had. Entries are never
    /// removed. Returns the number of keys whose value changed.
    pub fn merge(&mut self, newer: ResourceMap) -> usize {
        let mut changed = 0;
        for (key, url) in newer {
            if self.entries.get(&key) != Some(&url) {
                changed += 1;
            }
            self.entries.insert(key, url);
        }
        changed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> Iter<'_, ResourceKey, String> {
        self.entries.iter()
    }

    /// Keys from [`ResourceKey::ALL`] that this map has no value for.
    pub fn missing(&self) -> Vec<ResourceKey> {
        ResourceKey::ALL.into_iter().filter(|key| !self.contains(*key)).collect()
    }
}
impl IntoIterator for ResourceMap {
    type Item = (ResourceKey, String);
    type IntoIter = IntoIter<ResourceKey, String>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
impl<'a> IntoIterator for &'a ResourceMap {
    type Item = (&'a ResourceKey, &'a String);
    type IntoIter = Iter<'a, ResourceKey, String>;
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
impl<U: Into<String>> FromIterator<(ResourceKey, U)> for ResourceMap {
    fn from_iter<T: IntoIterator<Item = (ResourceKey, U)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(key, url)| (key, url.into())).collect(),
        }
    }
}
