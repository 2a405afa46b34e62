//! Helpers shared by the module test suites.

use crate::config::{NodeConfig, URL_SCHEME};
use crate::membership::types::{Key, NodeUrl};
use crate::node::service::{Node, NodeHandle};

use serde_json::Value;
use std::time::Duration;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn test_config() -> NodeConfig {
    NodeConfig::default().with_request_timeout(Duration::from_millis(500))
}

/// Binds a node on a free local port, seeds it and starts it.
pub async fn spawn_node(data: Vec<(Key, Value)>) -> NodeHandle {
    init_tracing();
    Node::bind(test_config())
        .await
        .expect("Failed to bind node")
        .with_data(data)
        .start()
}

/// A URL nothing is listening on.
pub async fn dead_url() -> NodeUrl {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    NodeUrl::new(URL_SCHEME, "127.0.0.1", port)
}
