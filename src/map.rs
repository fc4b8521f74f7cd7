//! Ordered map type for marshalled objects.
//!
//! This module provides [`ValueMap`], a wrapper around [`IndexMap`] that keeps
//! insertion order. Marshalling inserts keys in field declaration order, so
//! the map lists them the same way the type declares them.
//!
//! ## Why IndexMap?
//!
//! - **Deterministic output**: a marshalled object always lists its keys the same way
//! - **Iteration order**: fields are iterated in insertion order
//! - **Merging**: [`ValueMap::merge`] overwrites existing keys in place and appends new ones
//!
//! ## Examples
//!
//! ```rust
//! use grammar::{ValueMap, Value};
//!
//! let mut map = ValueMap::new();
//! map.insert("name".to_string(), Value::from("Alice"));
//! map.insert("age".to_string(), Value::from(30));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("name").and_then(|v| v.as_str()), Some("Alice"));
//! ```

use crate::Value;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An ordered map of string keys to generic values.
///
/// # Examples
///
/// ```rust
/// use grammar::{ValueMap, Value};
///
/// let mut map = ValueMap::new();
/// map.insert("first".to_string(), Value::from(1));
/// map.insert("second".to_string(), Value::from(2));
///
/// // Iteration maintains insertion order
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueMap(IndexMap<String, Value>);

impl ValueMap {
    /// Creates an empty `ValueMap`.
    #[must_use]
    pub fn new() -> Self {
        ValueMap(IndexMap::new())
    }

    /// Creates an empty `ValueMap` with the specified capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ValueMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already contained this key, the old value is returned and
    /// the key keeps its position.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grammar::{ValueMap, Value};
    ///
    /// let mut map = ValueMap::new();
    /// assert!(map.insert("key".to_string(), Value::from(42)).is_none());
    /// assert!(map.insert("key".to_string(), Value::from(43)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    /// Returns a reference to the value corresponding to the key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Removes a key, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Copies every entry of `other` into this map.
    ///
    /// Keys already present are overwritten in place; new keys are appended
    /// in `other`'s order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use grammar::{value, Value, ValueMap};
    ///
    /// let mut extras: ValueMap = [("a".to_string(), Value::from(1))].into_iter().collect();
    /// let incoming: ValueMap = [
    ///     ("b".to_string(), Value::from(2)),
    ///     ("a".to_string(), Value::from(3)),
    /// ]
    /// .into_iter()
    /// .collect();
    ///
    /// extras.merge(&incoming);
    /// assert_eq!(Value::Object(extras), value!({ "a": 3, "b": 2 }));
    /// ```
    pub fn merge(&mut self, other: &ValueMap) {
        self.0
            .extend(other.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    /// Returns an iterator over the keys of the map, in insertion order.
    pub fn keys(&self) -> indexmap::map::Keys<'_, String, Value> {
        self.0.keys()
    }

    /// Returns an iterator over the values of the map, in insertion order.
    pub fn values(&self) -> indexmap::map::Values<'_, String, Value> {
        self.0.values()
    }

    /// Returns an iterator over the key-value pairs of the map, in insertion order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }
}

impl From<HashMap<String, Value>> for ValueMap {
    fn from(map: HashMap<String, Value>) -> Self {
        ValueMap(map.into_iter().collect())
    }
}

impl From<IndexMap<String, Value>> for ValueMap {
    fn from(map: IndexMap<String, Value>) -> Self {
        ValueMap(map)
    }
}

impl From<ValueMap> for HashMap<String, Value> {
    fn from(map: ValueMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for ValueMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValueMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for ValueMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        ValueMap(IndexMap::from_iter(iter))
    }
}

impl Extend<(String, Value)> for ValueMap {
    fn extend<T: IntoIterator<Item = (String, Value)>>(&mut self, iter: T) {
        self.0.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(pairs: &[(&str, i32)]) -> ValueMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::from(*v)))
            .collect()
    }

    #[test]
    fn test_remove_keeps_order() {
        let mut map = entries(&[("a", 1), ("b", 2), ("c", 3)]);
        assert_eq!(map.remove("b"), Some(Value::from(2)));
        let keys: Vec<_> = map.keys().cloned().collect();
        assert_eq!(keys, vec!["a", "c"]);
    }

    #[test]
    fn test_merge_overwrites_and_appends() {
        let mut map = entries(&[("a", 1), ("b", 2)]);
        map.merge(&entries(&[("c", 3), ("a", 10)]));

        let pairs: Vec<_> = map
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_i64().unwrap()))
            .collect();
        assert_eq!(pairs, vec![("a", 10), ("b", 2), ("c", 3)]);
    }

    #[test]
    fn test_merge_twice_is_stable() {
        let incoming = entries(&[("x", 1), ("y", 2)]);
        let mut map = ValueMap::new();
        map.merge(&incoming);
        map.merge(&incoming);
        assert_eq!(map, incoming);
    }

    #[test]
    fn test_get_mut_and_clear() {
        let mut map = entries(&[("a", 1)]);
        if let Some(v) = map.get_mut("a") {
            *v = Value::from("changed");
        }
        assert_eq!(map.get("a").and_then(Value::as_str), Some("changed"));
        assert!(map.contains_key("a"));

        map.clear();
        assert!(map.is_empty());
    }

    #[test]
    fn test_hashmap_conversion() {
        let mut hash = HashMap::new();
        hash.insert("k".to_string(), Value::Bool(true));
        let map = ValueMap::from(hash);
        let back: HashMap<String, Value> = map.into();
        assert_eq!(back.get("k"), Some(&Value::Bool(true)));
    }
}
