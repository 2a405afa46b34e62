//! Membership Knowledge Module
//!
//! Holds what a node believes about the rest of the overlay and how that belief
//! changes when nodes gossip.
//!
//! ## Core Concepts
//! - **Neighbor Table**: peer URL -> keys believed to live on that peer. Grows by
//!   set union only; nothing is ever retracted.
//! - **Snapshot**: the wire form of a table, always carrying the sender's own keys.
//! - **Catalog**: key -> peers, derived from the table on demand for routing reads.

pub mod catalog;
pub mod table;
pub mod types;
