use crate::membership::types::{Key, KeySet};
use serde_json::Value;
use std::collections::HashMap;

/// Reply to a successful `set`.
pub const ACK: &str = "OK";

#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    data: HashMap<Key, Value>,
}

impl LocalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: impl IntoIterator<Item = (Key, Value)>) -> Self {
        Self {
            data: data.into_iter().collect(),
        }
    }

    pub fn get(&self, key: &Key) -> Option<&Value> {
        self.data.get(key)
    }

    /// Looks up a key for a remote caller: a missing key is `null`, not an error.
    pub fn get_or_absent(&self, key: &Key) -> Value {
        self.data.get(key).cloned().unwrap_or(Value::Null)
    }

    /// Stores a value, silently replacing any previous one.
    pub fn set(&mut self, key: Key, value: Value) -> Option<Value> {
        self.data.insert(key, value)
    }

    pub fn contains(&self, key: &Key) -> bool {
        self.data.contains_key(key)
    }

    /// The keys this node advertises to its neighbors.
    pub fn key_set(&self) -> KeySet {
        self.data.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
