//! # Hasher
//!
//! Wraps Keccak-256 over byte strings, producing a 32-byte digest. This is
//! the pre-standardization Keccak (padding byte `0x01`), not SHA3-256.

use sha3::{Digest, Keccak256};

use super::Hash;

/// Compute the Keccak-256 digest of `data`.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_matches_known_constant() {
        let expected =
            hex::decode("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
                .unwrap();
        assert_eq!(keccak256(&[]).to_vec(), expected);
    }

    #[test]
    fn deterministic() {
        assert_eq!(keccak256(b"hello"), keccak256(b"hello"));
    }

    #[test]
    fn distinguishes_inputs() {
        assert_ne!(keccak256(b"hello"), keccak256(b"world"));
    }
}
