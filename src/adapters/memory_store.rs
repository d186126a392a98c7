//! # In-memory store adapter
//!
//! A `HashMap`-backed [`TrieStore`] implementation. Used by tests and as a
//! default store for callers who don't need a real KV engine; it is not
//! the production storage adapter the crate scopes out (see `spec.md` §1).

use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::{errors::TrieError, Hash};
use crate::ports::TrieStore;

/// In-memory, thread-safe node store.
pub struct InMemoryTrieStore {
    nodes: RwLock<HashMap<Hash, Vec<u8>>>,
}

impl InMemoryTrieStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
        }
    }

    /// Number of node blobs currently stored.
    pub fn len(&self) -> usize {
        self.nodes.read().expect("store lock poisoned").len()
    }

    /// Whether the store holds no node blobs.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryTrieStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TrieStore for InMemoryTrieStore {
    fn get(&self, hash: &Hash) -> Result<Option<Vec<u8>>, TrieError> {
        let nodes = self
            .nodes
            .read()
            .map_err(|_| TrieError::StoreIO("in-memory store lock poisoned".into()))?;
        Ok(nodes.get(hash).cloned())
    }

    fn put(&self, hash: Hash, data: Vec<u8>) -> Result<(), TrieError> {
        let mut nodes = self
            .nodes
            .write()
            .map_err(|_| TrieError::StoreIO("in-memory store lock poisoned".into()))?;
        nodes.insert(hash, data);
        Ok(())
    }

    fn contains(&self, hash: &Hash) -> Result<bool, TrieError> {
        let nodes = self
            .nodes
            .read()
            .map_err(|_| TrieError::StoreIO("in-memory store lock poisoned".into()))?;
        Ok(nodes.contains_key(hash))
    }
}
