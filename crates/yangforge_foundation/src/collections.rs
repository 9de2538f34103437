//! Persistent insertion-ordered map with structural sharing.
//!
//! Child slots of normalized containers and effective-statement indices are
//! ordered mappings: iteration follows first-insertion order, lookup is by
//! hash. Built on the `im` crate so cloning is O(1) and modified copies
//! share structure with their originals.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;

/// Persistent map preserving first-insertion order of keys.
///
/// Modifications return a new map sharing structure with the original.
/// Re-inserting an existing key replaces the value but keeps the key's
/// original position.
#[derive(Clone)]
pub struct OrderedMap<K, V>
where
    K: Clone + Eq + Hash,
    V: Clone,
{
    order: im::Vector<K>,
    entries: im::HashMap<K, V>,
}

impl<K: Clone + Eq + Hash, V: Clone> OrderedMap<K, V> {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            order: im::Vector::new(),
            entries: im::HashMap::new(),
        }
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Gets a value by key.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    /// Returns true if the map contains the key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns a new map with the key-value pair inserted.
    ///
    /// A key already present keeps its position; only the value changes.
    #[must_use]
    pub fn insert(&self, key: K, value: V) -> Self {
        let order = if self.entries.contains_key(&key) {
            self.order.clone()
        } else {
            let mut order = self.order.clone();
            order.push_back(key.clone());
            order
        };
        let mut entries = self.entries.clone();
        entries.insert(key, value);
        Self { order, entries }
    }

    /// Returns a new map with the key removed.
    #[must_use]
    pub fn remove(&self, key: &K) -> Self {
        if !self.entries.contains_key(key) {
            return self.clone();
        }
        let mut entries = self.entries.clone();
        entries.remove(key);
        let order = self.order.iter().filter(|k| *k != key).cloned().collect();
        Self { order, entries }
    }

    /// Returns the first entry in insertion order.
    #[must_use]
    pub fn first(&self) -> Option<(&K, &V)> {
        let key = self.order.front()?;
        self.entries.get(key).map(|v| (key, v))
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.order
            .iter()
            .filter_map(move |k| self.entries.get(k).map(|v| (k, v)))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.order.iter()
    }

    /// Iterates values in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.iter().map(|(_, v)| v)
    }
}

impl<K: Clone + Eq + Hash, V: Clone> Default for OrderedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone + Eq + Hash + fmt::Debug, V: Clone + fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: Clone + Eq + Hash, V: Clone + PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        // Order-sensitive: two maps with the same entries in different
        // insertion order are distinct.
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Clone + Eq + Hash, V: Clone + Eq> Eq for OrderedMap<K, V> {}

impl<K: Clone + Eq + Hash, V: Clone + Hash> Hash for OrderedMap<K, V> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self.iter() {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: Clone + Eq + Hash, V: Clone> FromIterator<(K, V)> for OrderedMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map = map.insert(k, v);
        }
        map
    }
}
