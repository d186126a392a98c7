//! # Ports
//!
//! The inbound/outbound interfaces this crate depends on without owning an
//! implementation: the content-addressed storage adapter.

mod store;

pub use store::TrieStore;
