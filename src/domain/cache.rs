//! # Decoded-node cache
//!
//! A session cache of `hash -> decoded node`. This is a pure performance
//! optimization sitting in front of the store; per `spec.md` §9 it must
//! never affect observable root hashes, so it is never consulted for
//! anything other than skipping an RLP-decode of bytes the store already
//! gave us.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use super::node::TrieNode;
use super::Hash;

/// Default capacity, bounding memory use for long-running tries.
pub const DEFAULT_CACHE_CAPACITY: usize = 10_000;

/// Thread-safe LRU cache of decoded trie nodes, keyed by the hash under
/// which their RLP encoding is stored.
pub struct NodeCache {
    inner: Mutex<LruCache<Hash, TrieNode>>,
}

impl NodeCache {
    /// Create a cache with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }

    /// Create a cache with a custom capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least 1");
        Self {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Look up a previously decoded node by its hash.
    pub fn get(&self, hash: &Hash) -> Option<TrieNode> {
        self.inner
            .lock()
            .expect("node cache lock poisoned")
            .get(hash)
            .cloned()
    }

    /// Record a decoded node under its hash.
    pub fn insert(&self, hash: Hash, node: TrieNode) {
        self.inner
            .lock()
            .expect("node cache lock poisoned")
            .put(hash, node);
    }

    /// Drop all cached entries.
    pub fn clear(&self) {
        self.inner.lock().expect("node cache lock poisoned").clear();
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("node cache lock poisoned").len()
    }

    /// Whether the cache currently holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for NodeCache {
    fn default() -> Self {
        Self::new()
    }
}
