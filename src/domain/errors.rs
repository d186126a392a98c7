//! # Trie Error Types
//!
//! Defines all error conditions for the trie engine. Each variant is
//! recoverable by the caller - the engine itself never panics in release
//! builds, even on a corrupt store or a foreign root.

use thiserror::Error;

use super::Hash;

/// Errors surfaced by the trie engine.
///
/// None of these cause panics. Structural normalization failures during
/// delete are classified as `InvariantViolation`, not recovered locally -
/// they indicate an engine bug and should be unreachable in correct code.
#[derive(Debug, Error)]
pub enum TrieError {
    /// RLP input was truncated, non-minimally encoded, or had trailing
    /// bytes after the top-level item; or a hex-prefix byte string was
    /// internally inconsistent.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),

    /// A 32-byte reference reached during traversal has no entry in the
    /// store. Indicates corruption, a root from a foreign store, or a
    /// pruned node being read through a stale root.
    #[error("node {} missing from store", hex::encode(.0))]
    StoreMissing(Hash),

    /// Reached a structural shape forbidden by the data model invariants
    /// (e.g. a singleton branch, or an empty-path extension). Should be
    /// unreachable in correct code; treated as fatal in release builds via
    /// the returned error and via `debug_assert!` in test builds.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// The underlying storage adapter failed. Propagated verbatim from the
    /// `TrieStore` implementation.
    #[error("store I/O error: {0}")]
    StoreIO(String),
}
