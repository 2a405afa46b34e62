use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Network identity of a node, in `scheme://host:port` form.
///
/// String equality is the only notion of identity: two different strings that
/// happen to reach the same process are treated as two different peers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(transparent)]
pub struct NodeUrl(pub String);

impl NodeUrl {
    pub fn new(scheme: &str, host: &str, port: u16) -> Self {
        Self(format!("{}://{}:{}", scheme, host, port))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeUrl {
    fn from(url: &str) -> Self {
        Self(url.to_string())
    }
}

impl From<String> for NodeUrl {
    fn from(url: String) -> Self {
        Self(url)
    }
}

/// A key in the overlay's key space.
///
/// Keys travel as plain JSON scalars. Integers and strings are kept apart, so
/// `1` and `"1"` are distinct keys.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(untagged)]
pub enum Key {
    Int(i64),
    Text(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Int(i) => write!(f, "{}", i),
            Key::Text(s) => write!(f, "{:?}", s),
        }
    }
}

impl From<i64> for Key {
    fn from(key: i64) -> Self {
        Key::Int(key)
    }
}

impl From<&str> for Key {
    fn from(key: &str) -> Self {
        Key::Text(key.to_string())
    }
}

impl From<String> for Key {
    fn from(key: String) -> Self {
        Key::Text(key)
    }
}

pub type KeySet = BTreeSet<Key>;

/// The gossip payload: what the sender believes each peer holds.
///
/// On the wire this is a JSON object of `url -> [key, ...]`. Key lists are
/// emitted sorted, and their order carries no meaning on receipt.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Snapshot(pub BTreeMap<NodeUrl, KeySet>);

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, url: NodeUrl, keys: KeySet) {
        self.0.insert(url, keys);
    }

    pub fn remove(&mut self, url: &NodeUrl) -> Option<KeySet> {
        self.0.remove(url)
    }

    pub fn get(&self, url: &NodeUrl) -> Option<&KeySet> {
        self.0.get(url)
    }

    pub fn contains(&self, url: &NodeUrl) -> bool {
        self.0.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeUrl, &KeySet)> {
        self.0.iter()
    }
}

impl IntoIterator for Snapshot {
    type Item = (NodeUrl, KeySet);
    type IntoIter = std::collections::btree_map::IntoIter<NodeUrl, KeySet>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl FromIterator<(NodeUrl, KeySet)> for Snapshot {
    fn from_iter<I: IntoIterator<Item = (NodeUrl, KeySet)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
