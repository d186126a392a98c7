//! # Adapters
//!
//! Concrete implementations of the ports this crate depends on. The only
//! one shipped here is an in-memory reference store for tests and
//! embedders without a real KV engine; production callers implement
//! [`crate::ports::TrieStore`] against their own storage engine.

pub mod memory_store;
