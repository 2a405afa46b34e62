use super::types::{Key, KeySet, NodeUrl, Snapshot};
use std::collections::BTreeMap;

/// A node's belief about which keys each known peer holds.
///
/// The table is owned by one node and never carries an entry for that node's
/// own URL. Facts are only ever added: a merge is a per-peer set union and no
/// operation removes a peer or a key.
#[derive(Debug, Clone)]
pub struct NeighborTable {
    owner: NodeUrl,
    entries: BTreeMap<NodeUrl, KeySet>,
}

impl NeighborTable {
    pub fn new(owner: NodeUrl) -> Self {
        Self {
            owner,
            entries: BTreeMap::new(),
        }
    }

    pub fn owner(&self) -> &NodeUrl {
        &self.owner
    }

    /// Registers a peer with no known keys.
    ///
    /// Returns `false` when the peer is the owner itself or already known; an
    /// existing entry keeps its keys.
    pub fn add_neighbor(&mut self, url: NodeUrl) -> bool {
        if url == self.owner || self.entries.contains_key(&url) {
            return false;
        }
        tracing::debug!("{}: added neighbor {}", self.owner, url);
        self.entries.insert(url, KeySet::new());
        true
    }

    /// Union-merges a snapshot into the table, ignoring any entry that
    /// describes the owner. Returns the number of (peer, key) facts that were
    /// not known before.
    pub fn merge(&mut self, incoming: Snapshot) -> usize {
        let mut learned = 0;

        for (url, keys) in incoming {
            if url == self.owner {
                continue;
            }
            let known = self.entries.entry(url).or_default();
            for key in keys {
                if known.insert(key) {
                    learned += 1;
                }
            }
        }

        learned
    }

    pub fn urls(&self) -> Vec<NodeUrl> {
        self.entries.keys().cloned().collect()
    }

    pub fn keys_of(&self, url: &NodeUrl) -> Option<&KeySet> {
        self.entries.get(url)
    }

    pub fn contains(&self, url: &NodeUrl) -> bool {
        self.entries.contains_key(url)
    }

    pub fn advertises(&self, url: &NodeUrl, key: &Key) -> bool {
        self.entries
            .get(url)
            .map(|keys| keys.contains(key))
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeUrl, &KeySet)> {
        self.entries.iter()
    }

    /// The table as a snapshot, without the owner.
    pub fn to_snapshot(&self) -> Snapshot {
        self.entries
            .iter()
            .map(|(url, keys)| (url.clone(), keys.clone()))
            .collect()
    }

    /// The owner's full view: every neighbor entry plus the owner mapped to
    /// `own_keys`. This is what a node sends out and what it answers with.
    pub fn view_with_self(&self, own_keys: KeySet) -> Snapshot {
        let mut view = self.to_snapshot();
        view.insert(self.owner.clone(), own_keys);
        view
    }
}

/// Per-peer set union of two snapshots.
pub fn union_snapshots(a: &Snapshot, b: &Snapshot) -> Snapshot {
    let mut merged = a.clone();
    for (url, keys) in b.iter() {
        let mut combined = merged.remove(url).unwrap_or_default();
        combined.extend(keys.iter().cloned());
        merged.insert(url.clone(), combined);
    }
    merged
}
