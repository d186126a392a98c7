//! # Domain
//!
//! Core trie logic: nibble paths, RLP, the node codec, Keccak-256, the
//! decode cache, and the trie engine itself. Nothing in this module
//! depends on a concrete storage backend; it only depends on the
//! [`crate::ports::TrieStore`] contract.

pub mod cache;
pub mod errors;
pub mod hasher;
pub mod nibbles;
pub mod node;
pub mod rlp;
pub mod trie;

/// A Keccak-256 digest, or the key under which a node blob is stored.
pub type Hash = [u8; 32];

/// Root hash of the canonical empty trie: `Keccak256(RLP(""))`.
///
/// This is the one root value that never requires a store lookup to
/// resolve - it always denotes [`node::TrieNode::Empty`].
pub const EMPTY_TRIE_ROOT: Hash = [
    0x56, 0xe8, 0x1f, 0x17, 0x1b, 0xcc, 0x55, 0xa6, 0xff, 0x83, 0x45, 0xe6, 0x92, 0xc0, 0xf8, 0x6e,
    0x5b, 0x48, 0xe0, 0x1b, 0x99, 0x6c, 0xad, 0xc0, 0x01, 0x62, 0x2f, 0xb5, 0xe3, 0x63, 0xb4, 0x21,
];
