//! # RLP codec
//!
//! Recursive Length Prefix encoding/decoding, Ethereum's canonical
//! serialization for byte strings and nested lists of byte strings. Pure
//! functions, no I/O.

use super::errors::TrieError;

/// A decoded (or to-be-encoded) RLP item.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RlpItem {
    /// A byte string.
    Bytes(Vec<u8>),
    /// An ordered list of items.
    List(Vec<RlpItem>),
}

impl RlpItem {
    /// Convenience constructor for a byte-string item.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        RlpItem::Bytes(data.into())
    }

    /// Returns the inner bytes if this is a `Bytes` item.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RlpItem::Bytes(b) => Some(b),
            RlpItem::List(_) => None,
        }
    }

    /// Returns the inner list if this is a `List` item.
    pub fn as_list(&self) -> Option<&[RlpItem]> {
        match self {
            RlpItem::List(items) => Some(items),
            RlpItem::Bytes(_) => None,
        }
    }

    /// Encode this item per the canonical RLP rules.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            RlpItem::Bytes(data) => encode_bytes(data),
            RlpItem::List(items) => {
                let encoded_items: Vec<Vec<u8>> = items.iter().map(RlpItem::encode).collect();
                encode_list_payload(&encoded_items)
            }
        }
    }

    /// Decode a single top-level item, rejecting trailing bytes.
    pub fn decode(input: &[u8]) -> Result<RlpItem, TrieError> {
        let (item, consumed) = decode_item(input)?;
        if consumed != input.len() {
            return Err(TrieError::MalformedEncoding(format!(
                "trailing bytes after top-level item: consumed {consumed} of {}",
                input.len()
            )));
        }
        Ok(item)
    }
}

/// RLP-encode a single byte string.
pub fn encode_bytes(data: &[u8]) -> Vec<u8> {
    if data.len() == 1 && data[0] < 0x80 {
        vec![data[0]]
    } else if data.len() <= 55 {
        let mut result = Vec::with_capacity(1 + data.len());
        result.push(0x80 + data.len() as u8);
        result.extend_from_slice(data);
        result
    } else {
        let len_bytes = encode_length(data.len());
        let mut result = Vec::with_capacity(1 + len_bytes.len() + data.len());
        result.push(0xb7 + len_bytes.len() as u8);
        result.extend_from_slice(&len_bytes);
        result.extend_from_slice(data);
        result
    }
}

/// RLP-encode a list from its already-encoded child items.
fn encode_list_payload(encoded_items: &[Vec<u8>]) -> Vec<u8> {
    let total_len: usize = encoded_items.iter().map(Vec::len).sum();
    let mut result = Vec::with_capacity(total_len + 9);
    if total_len <= 55 {
        result.push(0xc0 + total_len as u8);
    } else {
        let len_bytes = encode_length(total_len);
        result.push(0xf7 + len_bytes.len() as u8);
        result.extend_from_slice(&len_bytes);
    }
    for encoded in encoded_items {
        result.extend_from_slice(encoded);
    }
    result
}

/// Encode a length as a minimal (no leading zero) big-endian byte string.
fn encode_length(len: usize) -> Vec<u8> {
    let bytes = len.to_be_bytes();
    let start = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len() - 1);
    bytes[start..].to_vec()
}

/// Decode the minimal big-endian length prefix at the start of `input`,
/// rejecting leading zero bytes (non-minimal encoding).
fn decode_length(input: &[u8]) -> Result<usize, TrieError> {
    if input.is_empty() {
        return Err(TrieError::MalformedEncoding("empty length prefix".into()));
    }
    if input[0] == 0 {
        return Err(TrieError::MalformedEncoding(
            "non-minimal length encoding: leading zero byte".into(),
        ));
    }
    if input.len() > std::mem::size_of::<usize>() {
        return Err(TrieError::MalformedEncoding("length prefix overflow".into()));
    }
    let mut buf = [0u8; std::mem::size_of::<usize>()];
    buf[std::mem::size_of::<usize>() - input.len()..].copy_from_slice(input);
    Ok(usize::from_be_bytes(buf))
}

/// Decode one item from the front of `input`, returning the item and the
/// number of bytes consumed.
fn decode_item(input: &[u8]) -> Result<(RlpItem, usize), TrieError> {
    let prefix = *input
        .first()
        .ok_or_else(|| TrieError::MalformedEncoding("empty input".into()))?;

    match prefix {
        0x00..=0x7f => Ok((RlpItem::Bytes(vec![prefix]), 1)),

        0x80..=0xb7 => {
            let len = (prefix - 0x80) as usize;
            let body = slice_checked(input, 1, len)?;
            if len == 1 && body[0] < 0x80 {
                return Err(TrieError::MalformedEncoding(
                    "non-minimal encoding: single byte < 0x80 used long form".into(),
                ));
            }
            Ok((RlpItem::Bytes(body.to_vec()), 1 + len))
        }

        0xb8..=0xbf => {
            let len_of_len = (prefix - 0xb7) as usize;
            let len_bytes = slice_checked(input, 1, len_of_len)?;
            let len = decode_length(len_bytes)?;
            if len <= 55 {
                return Err(TrieError::MalformedEncoding(
                    "non-minimal length-of-length encoding for short string".into(),
                ));
            }
            let body = slice_checked(input, 1 + len_of_len, len)?;
            Ok((RlpItem::Bytes(body.to_vec()), 1 + len_of_len + len))
        }

        0xc0..=0xf7 => {
            let len = (prefix - 0xc0) as usize;
            let body = slice_checked(input, 1, len)?;
            let items = decode_list_items(body)?;
            Ok((RlpItem::List(items), 1 + len))
        }

        0xf8..=0xff => {
            let len_of_len = (prefix - 0xf7) as usize;
            let len_bytes = slice_checked(input, 1, len_of_len)?;
            let len = decode_length(len_bytes)?;
            if len <= 55 {
                return Err(TrieError::MalformedEncoding(
                    "non-minimal length-of-length encoding for short list".into(),
                ));
            }
            let body = slice_checked(input, 1 + len_of_len, len)?;
            let items = decode_list_items(body)?;
            Ok((RlpItem::List(items), 1 + len_of_len + len))
        }
    }
}

/// Decode a fully-consumed run of items (a list's payload).
fn decode_list_items(mut body: &[u8]) -> Result<Vec<RlpItem>, TrieError> {
    let mut items = Vec::new();
    while !body.is_empty() {
        let (item, consumed) = decode_item(body)?;
        items.push(item);
        body = &body[consumed..];
    }
    Ok(items)
}

/// Slice `input[offset..offset+len]`, failing with `MalformedEncoding` on
/// truncated input rather than panicking.
fn slice_checked(input: &[u8], offset: usize, len: usize) -> Result<&[u8], TrieError> {
    input
        .get(offset..offset + len)
        .ok_or_else(|| TrieError::MalformedEncoding("truncated RLP input".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_byte_below_0x80_is_itself() {
        assert_eq!(encode_bytes(&[0x00]), vec![0x00]);
        assert_eq!(encode_bytes(&[0x7f]), vec![0x7f]);
    }

    #[test]
    fn short_string_prefix() {
        assert_eq!(encode_bytes(b"dog"), vec![0x83, b'd', b'o', b'g']);
    }

    #[test]
    fn empty_string_is_0x80() {
        assert_eq!(encode_bytes(b""), vec![0x80]);
    }

    #[test]
    fn long_string_prefix() {
        let data = vec![b'a'; 56];
        let encoded = encode_bytes(&data);
        assert_eq!(encoded[0], 0xb8);
        assert_eq!(encoded[1], 56);
        assert_eq!(&encoded[2..], &data[..]);
    }

    #[test]
    fn list_round_trip() {
        let item = RlpItem::List(vec![
            RlpItem::bytes(b"do".to_vec()),
            RlpItem::bytes(b"verb".to_vec()),
        ]);
        let encoded = item.encode();
        let decoded = RlpItem::decode(&encoded).unwrap();
        assert_eq!(decoded, item);
    }

    #[test]
    fn round_trip_every_well_formed_item() {
        let items = vec![
            RlpItem::bytes(vec![]),
            RlpItem::bytes(vec![0x00]),
            RlpItem::bytes(vec![0x7f]),
            RlpItem::bytes(b"dog".to_vec()),
            RlpItem::bytes(vec![b'x'; 100]),
            RlpItem::List(vec![]),
            RlpItem::List(vec![RlpItem::bytes(b"cat".to_vec())]),
            RlpItem::List(vec![RlpItem::List(vec![RlpItem::bytes(vec![1, 2, 3])])]),
            RlpItem::List((0..20).map(|i| RlpItem::bytes(vec![i as u8; 5])).collect()),
        ];
        for item in items {
            let encoded = item.encode();
            let decoded = RlpItem::decode(&encoded).unwrap();
            assert_eq!(decoded, item);
        }
    }

    #[test]
    fn rejects_truncated_input() {
        let encoded = encode_bytes(b"dog");
        let truncated = &encoded[..encoded.len() - 1];
        assert!(matches!(
            RlpItem::decode(truncated),
            Err(TrieError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut encoded = encode_bytes(b"dog");
        encoded.push(0xff);
        assert!(matches!(
            RlpItem::decode(&encoded),
            Err(TrieError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn rejects_non_minimal_single_byte_long_form() {
        // 0x00 encoded via the long-string form (0x81 0x00) instead of
        // the canonical single-byte form.
        let malformed = vec![0x81, 0x00];
        assert!(matches!(
            RlpItem::decode(&malformed),
            Err(TrieError::MalformedEncoding(_))
        ));
    }

    #[test]
    fn rejects_non_minimal_length_of_length() {
        // A short string masquerading as a long string (length-of-length
        // form used for a length <= 55).
        let mut malformed = vec![0xb8, 5];
        malformed.extend_from_slice(b"hello");
        assert!(matches!(
            RlpItem::decode(&malformed),
            Err(TrieError::MalformedEncoding(_))
        ));
    }
}
