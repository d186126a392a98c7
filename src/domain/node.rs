//! # Trie node shape and node codec
//!
//! Converts between the logical node variant (Empty/Leaf/Extension/Branch)
//! and its RLP-list representation, and implements the "inline if < 32
//! bytes else hash-and-store" rule for child references.

use super::errors::TrieError;
use super::hasher::keccak256;
use super::nibbles::Nibbles;
use super::rlp::RlpItem;
use super::{Hash, EMPTY_TRIE_ROOT};
use crate::ports::TrieStore;

/// A child (or root) reference: either the child's own RLP item, spliced
/// structurally into the parent's list (when the child's RLP encoding is
/// strictly shorter than 32 bytes), or the 32-byte Keccak-256 hash of the
/// child's RLP encoding, with the encoding itself written to the store
/// under that hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChildRef {
    /// The child's own RLP item (a list for a non-empty node, or the empty
    /// byte string for an empty child), embedded directly as a nested item
    /// rather than re-framed as a byte string.
    Inline(RlpItem),
    /// The Keccak-256 hash of the child's RLP encoding; the encoding lives
    /// in the store under this hash.
    Hash(Hash),
}

impl ChildRef {
    /// Empty child reference: the RLP encoding of the empty byte string.
    pub fn empty() -> Self {
        ChildRef::Inline(RlpItem::Bytes(vec![]))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ChildRef::Inline(RlpItem::Bytes(bytes)) if bytes.is_empty())
    }

    /// The item to place into a parent's RLP list for this reference: the
    /// child's own item verbatim, or the 32-byte hash as a byte string.
    fn to_rlp_item(&self) -> RlpItem {
        match self {
            ChildRef::Inline(item) => item.clone(),
            ChildRef::Hash(hash) => RlpItem::bytes(hash.to_vec()),
        }
    }

    /// Reconstruct a child reference from an item found in a parent's
    /// decoded RLP list. A `List` item is a structurally-embedded inline
    /// node; a 32-byte `Bytes` item is a hash reference; an empty `Bytes`
    /// item is the empty child. Any other byte-string length is malformed -
    /// the encoder never produces one.
    fn from_rlp_item(item: RlpItem) -> Result<Self, TrieError> {
        match item {
            RlpItem::List(_) => Ok(ChildRef::Inline(item)),
            RlpItem::Bytes(ref bytes) if bytes.is_empty() => Ok(ChildRef::Inline(item)),
            RlpItem::Bytes(ref bytes) if bytes.len() == 32 => {
                let mut hash = [0u8; 32];
                hash.copy_from_slice(bytes);
                Ok(ChildRef::Hash(hash))
            }
            RlpItem::Bytes(bytes) => Err(TrieError::MalformedEncoding(format!(
                "child reference byte string has length {}, expected 0 or 32",
                bytes.len()
            ))),
        }
    }
}

/// The four node shapes of a Modified Merkle Patricia Trie.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrieNode {
    /// Absence of a subtree.
    Empty,
    /// Terminal mapping from (inherited prefix ++ path) to value.
    Leaf { path: Nibbles, value: Vec<u8> },
    /// Shared-prefix compression node; path is never empty.
    Extension { path: Nibbles, child: ChildRef },
    /// Radix-16 fan-out plus an optional terminator value.
    Branch {
        children: Box<[ChildRef; 16]>,
        value: Option<Vec<u8>>,
    },
}

impl TrieNode {
    /// Construct an all-empty branch with no terminator value.
    pub fn empty_branch() -> Self {
        TrieNode::Branch {
            children: Box::new(std::array::from_fn(|_| ChildRef::empty())),
            value: None,
        }
    }

    /// RLP-encode this node's logical item.
    pub fn rlp_encode(&self) -> Vec<u8> {
        self.to_rlp_item().encode()
    }

    fn to_rlp_item(&self) -> RlpItem {
        match self {
            TrieNode::Empty => RlpItem::bytes(vec![]),

            TrieNode::Leaf { path, value } => RlpItem::List(vec![
                RlpItem::bytes(path.encode_hex_prefix(true)),
                RlpItem::bytes(value.clone()),
            ]),

            TrieNode::Extension { path, child } => RlpItem::List(vec![
                RlpItem::bytes(path.encode_hex_prefix(false)),
                child.to_rlp_item(),
            ]),

            TrieNode::Branch { children, value } => {
                let mut items: Vec<RlpItem> = children.iter().map(ChildRef::to_rlp_item).collect();
                items.push(RlpItem::bytes(value.clone().unwrap_or_default()));
                RlpItem::List(items)
            }
        }
    }

    /// Encode this node and return its child/root reference: the node's
    /// own RLP item, embedded structurally, if its encoding is `< 32`
    /// bytes; otherwise hashed and written to the store under that hash.
    pub fn encode_ref(&self, store: &dyn TrieStore) -> Result<ChildRef, TrieError> {
        if matches!(self, TrieNode::Empty) {
            return Ok(ChildRef::empty());
        }
        let item = self.to_rlp_item();
        let encoded = item.encode();
        if encoded.len() < 32 {
            Ok(ChildRef::Inline(item))
        } else {
            let hash = keccak256(&encoded);
            store.put(hash, encoded)?;
            Ok(ChildRef::Hash(hash))
        }
    }

    /// Encode this node and return its *root* reference: always a hash,
    /// even when the encoding would otherwise be short enough to inline.
    /// The empty trie's root is the well-known Keccak-256-of-empty-RLP
    /// constant.
    pub fn encode_root(&self, store: &dyn TrieStore) -> Result<Hash, TrieError> {
        if matches!(self, TrieNode::Empty) {
            return Ok(EMPTY_TRIE_ROOT);
        }
        let encoded = self.rlp_encode();
        let hash = keccak256(&encoded);
        store.put(hash, encoded)?;
        Ok(hash)
    }

    /// Resolve a child reference into its node, reading through the store
    /// when the reference is a hash.
    pub fn decode_child(reference: &ChildRef, store: &dyn TrieStore) -> Result<TrieNode, TrieError> {
        match reference {
            ChildRef::Inline(item) => decode_node_item(item.clone()),
            ChildRef::Hash(hash) => {
                let bytes = store
                    .get(hash)?
                    .ok_or(TrieError::StoreMissing(*hash))?;
                decode_node_bytes(&bytes)
            }
        }
    }

    /// Resolve a root reference into its node. A root equal to the
    /// well-known empty constant is the empty trie without a store lookup;
    /// any other root is resolved as a hash reference.
    pub fn decode_root(root: &Hash, store: &dyn TrieStore) -> Result<TrieNode, TrieError> {
        if *root == EMPTY_TRIE_ROOT {
            return Ok(TrieNode::Empty);
        }
        TrieNode::decode_child(&ChildRef::Hash(*root), store)
    }
}

/// RLP-decode raw node bytes into a `TrieNode`.
fn decode_node_bytes(bytes: &[u8]) -> Result<TrieNode, TrieError> {
    decode_node_item(RlpItem::decode(bytes)?)
}

/// Interpret an already-decoded RLP item as a `TrieNode`. Shared by the
/// store-backed path (bytes decoded fresh from the store) and the inline
/// path (an item spliced structurally into a parent's list).
fn decode_node_item(item: RlpItem) -> Result<TrieNode, TrieError> {
    match item {
        RlpItem::Bytes(b) if b.is_empty() => Ok(TrieNode::Empty),
        RlpItem::Bytes(_) => Err(TrieError::MalformedEncoding(
            "node bytes decoded to a non-empty byte string".into(),
        )),
        RlpItem::List(items) => match items.len() {
            2 => decode_two_item_node(items),
            17 => decode_branch(items),
            n => Err(TrieError::MalformedEncoding(format!(
                "node list has {n} items, expected 2 or 17"
            ))),
        },
    }
}

fn decode_two_item_node(mut items: Vec<RlpItem>) -> Result<TrieNode, TrieError> {
    let value_or_child = items.pop().unwrap();
    let encoded_path = items.pop().unwrap();
    let encoded_path = encoded_path
        .as_bytes()
        .ok_or_else(|| TrieError::MalformedEncoding("node path is not a byte string".into()))?;
    let (path, is_leaf) = Nibbles::decode_hex_prefix(encoded_path);

    if is_leaf {
        let value = value_or_child
            .as_bytes()
            .ok_or_else(|| TrieError::MalformedEncoding("leaf value is not a byte string".into()))?
            .to_vec();
        Ok(TrieNode::Leaf { path, value })
    } else {
        if path.is_empty() {
            return Err(TrieError::InvariantViolation(
                "decoded extension node with empty path".into(),
            ));
        }
        Ok(TrieNode::Extension {
            path,
            child: ChildRef::from_rlp_item(value_or_child)?,
        })
    }
}

fn decode_branch(mut items: Vec<RlpItem>) -> Result<TrieNode, TrieError> {
    let value_item = items.pop().unwrap();
    let value = value_item
        .as_bytes()
        .ok_or_else(|| TrieError::MalformedEncoding("branch value is not a byte string".into()))?;
    let value = if value.is_empty() {
        None
    } else {
        Some(value.to_vec())
    };

    let mut children: [ChildRef; 16] = std::array::from_fn(|_| ChildRef::empty());
    for (slot, item) in children.iter_mut().zip(items.into_iter()) {
        *slot = ChildRef::from_rlp_item(item)?;
    }

    Ok(TrieNode::Branch {
        children: Box::new(children),
        value,
    })
}
