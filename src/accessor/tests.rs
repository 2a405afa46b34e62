//! Accessor Module Tests
//!
//! Routing of reads through the catalog, local-first reads and local-only writes.

#[cfg(test)]
mod tests {
    use crate::accessor::distributed::DistributedAccessor;
    use crate::error::NodeError;
    use crate::membership::types::{Key, KeySet, NodeUrl, Snapshot};
    use crate::test_support::{dead_url, spawn_node};
    use serde_json::{Value, json};

    fn advertise(url: &NodeUrl, key: Key) -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert(url.clone(), [key].into_iter().collect::<KeySet>());
        snapshot
    }

    #[tokio::test]
    async fn test_distributed_fetch_routes_to_holder() {
        let a = spawn_node(vec![(Key::Int(1), json!("one"))]).await;
        let b = spawn_node(vec![(Key::Int(2), json!("two"))]).await;
        a.add_neighbor(b.url().clone()).await.unwrap();
        a.update().await.unwrap();

        let accessor = DistributedAccessor::new(a.clone());

        assert_eq!(accessor.get(&Key::Int(2)).await.unwrap(), json!("two"));
        assert_eq!(accessor.get(&Key::Int(1)).await.unwrap(), json!("one"));

        // The fetched value was never copied into a's store.
        assert!(a.get(&Key::Int(2)).await.unwrap().is_none());

        a.stop().await.unwrap();
        b.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_local_hit_does_no_network_io() {
        let a = spawn_node(vec![(Key::Int(1), json!("local"))]).await;

        // The catalog claims an unreachable peer also holds the key. Any
        // network attempt would fail.
        let dead = dead_url().await;
        a.merge(advertise(&dead, Key::Int(1))).await.unwrap();

        let accessor = DistributedAccessor::new(a.clone());
        assert_eq!(accessor.get(&Key::Int(1)).await.unwrap(), json!("local"));

        a.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_holder_surfaces_error() {
        let a = spawn_node(vec![]).await;
        let dead = dead_url().await;
        a.merge(advertise(&dead, Key::from("k"))).await.unwrap();

        let accessor = DistributedAccessor::new(a.clone());
        let result = accessor.get(&Key::from("k")).await;

        assert!(matches!(result, Err(NodeError::Transport { .. })));
        a.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stale_catalog_entry_returns_null() {
        let a = spawn_node(vec![]).await;
        let b = spawn_node(vec![]).await;

        // a believes b holds "gone"; b never had it.
        a.merge(advertise(b.url(), Key::from("gone"))).await.unwrap();

        let accessor = DistributedAccessor::new(a.clone());
        assert_eq!(accessor.get(&Key::from("gone")).await.unwrap(), Value::Null);

        a.stop().await.unwrap();
        b.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_key_returns_null() {
        let a = spawn_node(vec![]).await;
        let accessor = DistributedAccessor::new(a.clone());

        assert_eq!(accessor.get(&Key::Int(404)).await.unwrap(), Value::Null);
        a.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_set_writes_only_locally() {
        let a = spawn_node(vec![]).await;
        let b = spawn_node(vec![(Key::Int(2), json!("two"))]).await;
        a.add_neighbor(b.url().clone()).await.unwrap();
        a.update().await.unwrap();

        let accessor = DistributedAccessor::new(a.clone());
        accessor.set(Key::Int(2), json!("shadow")).await.unwrap();

        // Local copy now shadows the remote one; the remote is unchanged.
        assert_eq!(accessor.get(&Key::Int(2)).await.unwrap(), json!("shadow"));
        assert_eq!(b.get(&Key::Int(2)).await.unwrap(), Some(json!("two")));

        a.stop().await.unwrap();
        b.stop().await.unwrap();
    }
}
