use super::table::NeighborTable;
use super::types::{Key, NodeUrl};
use std::collections::{BTreeMap, BTreeSet};

/// Inverted view of a neighbor table: key -> peers that advertise it.
///
/// Built fresh from the table on every request, so it always matches the
/// table it came from. The owning node never appears as a holder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    holders: BTreeMap<Key, BTreeSet<NodeUrl>>,
}

impl Catalog {
    pub fn from_table(table: &NeighborTable) -> Self {
        let mut holders: BTreeMap<Key, BTreeSet<NodeUrl>> = BTreeMap::new();

        for (url, keys) in table.iter() {
            for key in keys {
                holders.entry(key.clone()).or_default().insert(url.clone());
            }
        }

        Self { holders }
    }

    pub fn holders(&self, key: &Key) -> Option<&BTreeSet<NodeUrl>> {
        self.holders.get(key)
    }

    /// The peer a lookup should be routed to. There is no balancing: the
    /// lowest URL wins.
    pub fn first_holder(&self, key: &Key) -> Option<&NodeUrl> {
        self.holders.get(key).and_then(|urls| urls.iter().next())
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.holders.keys()
    }

    pub fn len(&self) -> usize {
        self.holders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.holders.is_empty()
    }
}
