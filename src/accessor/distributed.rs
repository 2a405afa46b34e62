use crate::error::Result;
use crate::membership::types::Key;
use crate::node::protocol::Operation;
use crate::node::service::NodeHandle;

use serde_json::Value;

/// Reads keys from anywhere in the overlay through one bound node.
///
/// Writes are not distributed: `set` only changes the bound node's store, even
/// if other peers advertise the same key.
#[derive(Debug, Clone)]
pub struct DistributedAccessor {
    node: NodeHandle,
}

impl DistributedAccessor {
    pub fn new(node: NodeHandle) -> Self {
        Self { node }
    }

    pub fn node(&self) -> &NodeHandle {
        &self.node
    }

    /// Returns the value for `key`, or `null` if it cannot be found.
    ///
    /// A key present in the bound node's store is answered without any network
    /// I/O. Otherwise the first peer the catalog lists for the key is asked,
    /// and its reply is returned as is: a stale catalog entry yields `null`,
    /// and no other holder is tried.
    pub async fn get(&self, key: &Key) -> Result<Value> {
        if let Some(value) = self.node.get(key).await? {
            tracing::debug!("GET {}: found locally on {}", key, self.node.url());
            return Ok(value);
        }

        let catalog = self.node.catalog().await?;
        let Some(holder) = catalog.first_holder(key) else {
            tracing::debug!("GET {}: no known holder", key);
            return Ok(Value::Null);
        };

        tracing::debug!("GET {}: routing to {}", key, holder);
        self.node
            .client()
            .call(holder, Operation::Get { key: key.clone() })
            .await
    }

    pub async fn set(&self, key: Key, value: Value) -> Result<()> {
        self.node.set(key, value).await
    }
}
