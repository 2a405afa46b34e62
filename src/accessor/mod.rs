//! Distributed read access on top of a single node.
//!
//! Reads go to the local store first and fall back to whichever peer the
//! catalog says holds the key. Writes stay local.

pub mod distributed;

#[cfg(test)]
mod tests;
