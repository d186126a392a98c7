//! # patricia-trie
//!
//! An Ethereum-compatible Modified Merkle Patricia Trie: a persistent,
//! cryptographically authenticated radix-16 key/value map, per the
//! Yellow Paper's Appendix D.
//!
//! This crate implements the trie engine itself - RLP, hex-prefix nibble
//! encoding, Keccak-256, the node codec, and the `get`/`put`/`remove`
//! engine - against a pluggable [`ports::TrieStore`]. It does not ship a
//! production storage engine, an account/state trie built on top, or
//! Merkle proof generation; bring your own `TrieStore` and build those
//! layers on top of [`domain::trie::Trie`].
//!
//! ```
//! use patricia_trie::{InMemoryTrieStore, Trie};
//!
//! let mut trie = Trie::new(InMemoryTrieStore::new());
//! trie.put(b"do", b"verb").unwrap();
//! trie.put(b"dog", b"puppy").unwrap();
//! assert_eq!(trie.get(b"dog").unwrap(), Some(b"puppy".to_vec()));
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::memory_store::InMemoryTrieStore;
pub use domain::errors::TrieError;
pub use domain::trie::Trie;
pub use domain::{Hash, EMPTY_TRIE_ROOT};
pub use ports::TrieStore;
