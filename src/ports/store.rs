//! # Storage adapter contract
//!
//! A content-addressed key/value store abstraction. The engine writes node
//! blobs whose keys are their Keccak-256 hashes; this trait is the only
//! interface it needs from the physical KV engine (LevelDB, RocksDB, an
//! in-memory map, ...), which is otherwise out of scope.

use crate::domain::{errors::TrieError, Hash};

/// Content-addressed node store.
///
/// Implementors must be durable relative to the caller's mutation boundary
/// (no stronger consistency than read-your-writes within a single engine
/// instance is required) and safe for concurrent readers: multiple threads
/// may share an immutable root and call `get` concurrently, provided no
/// writer is mutating at the same time (see the crate's concurrency model).
/// The engine never deletes; pruning of orphaned blobs is external.
pub trait TrieStore: Send + Sync {
    /// Fetch the node blob stored under `hash`, or `None` if absent.
    fn get(&self, hash: &Hash) -> Result<Option<Vec<u8>>, TrieError>;

    /// Store `data` under `hash`. Puts are idempotent: the same key is
    /// always written with the same bytes, since the key is the content
    /// hash of the value.
    fn put(&self, hash: Hash, data: Vec<u8>) -> Result<(), TrieError>;

    /// Whether a node blob exists under `hash`, without fetching it.
    fn contains(&self, hash: &Hash) -> Result<bool, TrieError> {
        Ok(self.get(hash)?.is_some())
    }
}

impl<T: TrieStore + ?Sized> TrieStore for &T {
    fn get(&self, hash: &Hash) -> Result<Option<Vec<u8>>, TrieError> {
        (**self).get(hash)
    }

    fn put(&self, hash: Hash, data: Vec<u8>) -> Result<(), TrieError> {
        (**self).put(hash, data)
    }

    fn contains(&self, hash: &Hash) -> Result<bool, TrieError> {
        (**self).contains(hash)
    }
}
