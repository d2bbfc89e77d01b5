//! Insertion-ordered string-keyed map.

use indexmap::IndexMap;

use super::Value;


/// String-keyed map that remembers insertion order. Overwriting a key keeps
/// its original position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hash {
    entries: IndexMap<String, Value>,
}

impl Hash {
    pub fn new() -> Self {
        Hash {
            entries: IndexMap::new(),
        }
    }

    /// Insert or overwrite. Empty is stored as Nil.
    pub fn set(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value.or_nil());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove a key, keeping the order of the remaining entries.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.entries.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for Hash {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut hash = Hash::new();
        for (k, v) in iter {
            hash.set(k, v);
        }
        hash
    }
}
