//! Overlay Node Module
//!
//! A node owns its local store and neighbor table and serves requests for them
//! over a request/reply endpoint.
//!
//! ## Architecture Overview
//! 1. **Serving loop**: one task owns all node state and drains a mailbox one
//!    command at a time, so inbound requests never interleave.
//! 2. **Endpoint**: an HTTP route that decodes requests and forwards them into
//!    the mailbox; it never touches state itself.
//! 3. **Gossip**: `NodeHandle::update` runs on the caller's task. It reads the
//!    outgoing view from the loop, exchanges it with each neighbor under a
//!    timeout, and sends every reply back into the loop as a merge.
//!
//! ## Submodules
//! - **`protocol`**: request shapes and the typed `Operation` enum.
//! - **`service`**: `Node`, `NodeHandle`, the serving loop and the gossip round.
//! - **`handlers`**: the inbound HTTP handler.
//! - **`client`**: the outbound request/reply client.

pub mod client;
pub mod handlers;
pub mod protocol;
pub mod service;
