//! Ordered mapping of configuration keys to values.
//!
//! [`ConfMap`] wraps an [`IndexMap`] so that keys keep the order in which
//! they were inserted. [`encode`](crate::encode) appends keys that have no
//! line in the previous layout in exactly this order, which makes the
//! output deterministic.
//!
//! ## Examples
//!
//! ```rust
//! use plain_config::{ConfMap, Value};
//!
//! let mut map = ConfMap::new();
//! map.insert("host".to_string(), Value::from("localhost"));
//! map.insert("port".to_string(), Value::from(8080));
//!
//! assert_eq!(map.len(), 2);
//! assert_eq!(map.get("port").and_then(|v| v.as_i64()), Some(8080));
//! ```

use crate::Value;
use indexmap::IndexMap;
use std::collections::HashMap;

/// An insertion-ordered map of configuration keys to values.
///
/// # Examples
///
/// ```rust
/// use plain_config::{ConfMap, Value};
///
/// let mut map = ConfMap::new();
/// map.insert("first".to_string(), Value::from(1));
/// map.insert("second".to_string(), Value::from(2));
///
/// let keys: Vec<_> = map.keys().cloned().collect();
/// assert_eq!(keys, vec!["first", "second"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfMap(IndexMap<String, Value>);

impl ConfMap {
    #[must_use]
    pub fn new() -> Self {
        ConfMap(IndexMap::new())
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        ConfMap(IndexMap::with_capacity(capacity))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// An existing key keeps its position and has its value replaced; the
    /// old value is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use plain_config::{ConfMap, Value};
    ///
    /// let mut map = ConfMap::new();
    /// assert!(map.insert("key".to_string(), Value::from(42)).is_none());
    /// assert!(map.insert("key".to_string(), Value::from(43)).is_some());
    /// ```
    pub fn insert(&mut self, key: String, value: Value) -> Option<Value> {
        self.0.insert(key, value)
    }

    /// Removes a key, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.shift_remove(key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.0.get_mut(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
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

impl From<HashMap<String, Value>> for ConfMap {
    fn from(map: HashMap<String, Value>) -> Self {
        ConfMap(map.into_iter().collect())
    }
}

impl From<ConfMap> for HashMap<String, Value> {
    fn from(map: ConfMap) -> Self {
        map.0.into_iter().collect()
    }
}

impl IntoIterator for ConfMap {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ConfMap {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for ConfMap {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        ConfMap(IndexMap::from_iter(iter))
    }
}
