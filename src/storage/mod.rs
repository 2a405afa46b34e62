//! Local Storage Module
//!
//! The node's own key-value data. Values are opaque JSON; nothing here knows
//! about peers. The store is only ever touched from inside the node's actor task,
//! so it is a plain map without interior locking.

pub mod memory;
