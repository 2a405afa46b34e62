//! Node configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// Upper bound on a single outbound request (gossip exchange or remote get).
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(2);
/// Commands that may queue up in front of a node's serving loop.
pub const MAILBOX_CAPACITY: usize = 64;

pub const DEFAULT_HOSTNAME: &str = "127.0.0.1";
pub const URL_SCHEME: &str = "http";

#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Address the endpoint listens on. Port `0` picks a free port.
    pub bind_addr: SocketAddr,
    /// Host part of the URL the node advertises to its peers.
    pub hostname: String,
    pub request_timeout: Duration,
    pub mailbox_capacity: usize,
}

impl NodeConfig {
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Self::default()
        }
    }

    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = hostname.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity.max(1);
        self
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            hostname: DEFAULT_HOSTNAME.to_string(),
            request_timeout: REQUEST_TIMEOUT,
            mailbox_capacity: MAILBOX_CAPACITY,
        }
    }
}
