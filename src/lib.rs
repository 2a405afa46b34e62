//! Peer-to-Peer Key-Value Overlay Library
//!
//! Independent nodes each hold part of a key space, tell their neighbors which
//! keys they have, and gossip that knowledge onward so any node can eventually
//! find the holder of any key.
//!
//! ## Architecture Modules
//! - **`storage`**: the node's own key-value data.
//! - **`membership`**: the neighbor table (peer -> keys), its gossip snapshot
//!   form, and the catalog (key -> peers) derived from it.
//! - **`node`**: the serving loop, the request protocol, the HTTP endpoint and
//!   the gossip exchange.
//! - **`accessor`**: a client-side reader that routes misses through the catalog.
//! - **`config`** / **`error`**: node settings and the shared error type.

pub mod accessor;
pub mod config;
pub mod error;
pub mod membership;
pub mod node;
pub mod storage;

#[cfg(test)]
mod test_support;
