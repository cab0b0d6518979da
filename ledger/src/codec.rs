//! # Canonical Encoding
//!
//! Every hash and every signature in the ledger is computed over the output
//! of [`encode`]. The encoding is `bincode` 1.x with its default options:
//! fields in declaration order, fixed-width little-endian integers, and
//! `u64` length prefixes for sequences and strings. Two records with equal
//! field values always encode to the same bytes, and
//! `encode(decode(encode(x))) == encode(x)` for every well-formed record.
//!
//! Records that must be hashed without some of their own fields (a hash
//! cannot cover itself, a signature cannot sign itself) are encoded through
//! borrowed *preimage views*: small `Serialize` structs that reference the
//! covered fields and simply leave the excluded ones out. See
//! [`crate::transaction::trx`] and [`crate::block::types`].
//!
//! Do not reorder fields of any type reachable from [`crate::Trx`] or
//! [`crate::Block`]. That is a hard fork.

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// A record could not be encoded or decoded.
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("canonical encoding failed: {0}")]
    Encode(String),

    #[error("canonical decoding failed: {0}")]
    Decode(String),
}

/// Encode a record into its canonical byte form.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, EncodingError> {
    bincode::serialize(value).map_err(|e| EncodingError::Encode(e.to_string()))
}

/// Decode a record from its canonical byte form.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, EncodingError> {
    bincode::deserialize(bytes).map_err(|e| EncodingError::Decode(e.to_string()))
}

/// Encoded size of a record without materializing the bytes.
pub fn encoded_len<T: Serialize + ?Sized>(value: &T) -> Result<usize, EncodingError> {
    bincode::serialized_size(value)
        .map(|n| n as usize)
        .map_err(|e| EncodingError::Encode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Sample {
        id: String,
        n: u64,
        data: Vec<u8>,
        link: Option<[u8; 32]>,
    }

    fn sample() -> Sample {
        Sample {
            id: "a1".into(),
            n: 7,
            data: vec![1, 2, 3],
            link: Some([9u8; 32]),
        }
    }

    #[test]
    fn encoding_is_stable_across_roundtrip() {
        let bytes = encode(&sample()).unwrap();
        let back: Sample = decode(&bytes).unwrap();
        assert_eq!(back, sample());
        assert_eq!(encode(&back).unwrap(), bytes);
    }

    #[test]
    fn encoding_is_field_sensitive() {
        let mut other = sample();
        other.data[2] ^= 0x01;
        assert_ne!(encode(&sample()).unwrap(), encode(&other).unwrap());
    }

    #[test]
    fn fixed_width_integers() {
        // u64 is always eight bytes, regardless of magnitude.
        assert_eq!(encode(&1u64).unwrap().len(), 8);
        assert_eq!(encode(&u64::MAX).unwrap().len(), 8);
    }

    #[test]
    fn encoded_len_matches_encode() {
        let s = sample();
        assert_eq!(encoded_len(&s).unwrap(), encode(&s).unwrap().len());
    }

    #[test]
    fn truncated_input_is_decode_error() {
        let bytes = encode(&sample()).unwrap();
        let err = decode::<Sample>(&bytes[..bytes.len() - 4]).unwrap_err();
        assert!(matches!(err, EncodingError::Decode(_)));
    }
}
