//! Transaction signature verification.
//!
//! Verification only answers "did the holder of `sender_pubkey` sign these
//! exact fields". Expiry, nonce ordering and membership are upstream
//! policy and are not checked here.

use super::error::TransactionError;
use super::trx::Trx;
use crate::crypto::keys::KeyCodecs;

/// Verify a trx's signature under whichever key scheme decodes its sender.
///
/// Returns `Ok(false)` when the signature does not match, including when
/// the trx was never signed.
///
/// # Errors
///
/// - [`TransactionError::KeyDecode`] if no supported scheme decodes
///   `sender_pubkey`.
/// - [`TransactionError::Encoding`] if the signing preimage cannot be
///   encoded.
pub fn verify_trx(trx: &Trx) -> Result<bool, TransactionError> {
    verify_trx_with(&KeyCodecs::default(), trx)
}

/// [`verify_trx`] against an explicit codec list.
pub fn verify_trx_with(codecs: &KeyCodecs, trx: &Trx) -> Result<bool, TransactionError> {
    let hash = trx.signing_hash()?;
    let verdict = codecs
        .verify(&trx.sender_pubkey, &hash, &trx.sender_sign)
        .map_err(|source| TransactionError::KeyDecode {
            trx_id: trx.trx_id.clone(),
            source,
        })?;
    if !verdict {
        tracing::warn!(trx_id = %trx.trx_id, group_id = %trx.group_id, "trx signature rejected");
    }
    Ok(verdict)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::{KeyScheme, Libp2pCodec, SigningKey};
    use crate::transaction::types::TrxType;

    fn signed_trx(scheme: KeyScheme) -> Trx {
        let key = SigningKey::generate(scheme);
        let mut trx = Trx {
            trx_id: "trx-1".into(),
            trx_type: TrxType::Post,
            group_id: "g".into(),
            sender_pubkey: key.public_key_encoded(),
            nonce: 1,
            data: b"ciphertext".to_vec(),
            timestamp: 1,
            version: "2.0.0".into(),
            expired: 2,
            sender_sign: Vec::new(),
        };
        let hash = trx.signing_hash().unwrap();
        trx.sender_sign = key.sign(&hash).unwrap();
        trx
    }

    #[test]
    fn both_schemes_verify() {
        assert!(verify_trx(&signed_trx(KeyScheme::Secp256k1)).unwrap());
        assert!(verify_trx(&signed_trx(KeyScheme::Libp2p)).unwrap());
    }

    #[test]
    fn any_field_change_breaks_the_signature() {
        let mut trx = signed_trx(KeyScheme::Secp256k1);
        trx.data[0] ^= 0x01;
        assert!(!verify_trx(&trx).unwrap());

        let mut trx = signed_trx(KeyScheme::Libp2p);
        trx.nonce += 1;
        assert!(!verify_trx(&trx).unwrap());
    }

    #[test]
    fn trailing_signature_bytes_are_rejected() {
        for scheme in [KeyScheme::Secp256k1, KeyScheme::Libp2p] {
            let mut trx = signed_trx(scheme);
            trx.sender_sign.extend_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
            assert!(!verify_trx(&trx).unwrap(), "{scheme} accepted a padded signature");
        }
    }

    #[test]
    fn unsigned_trx_is_false_not_error() {
        let mut trx = signed_trx(KeyScheme::Secp256k1);
        trx.sender_sign.clear();
        assert!(!verify_trx(&trx).unwrap());
    }

    #[test]
    fn undecodable_sender_is_error() {
        let mut trx = signed_trx(KeyScheme::Secp256k1);
        trx.sender_pubkey = "not a key!".into();
        assert!(matches!(
            verify_trx(&trx),
            Err(TransactionError::KeyDecode { .. })
        ));
    }

    #[test]
    fn restricted_codec_list_rejects_other_schemes() {
        let codecs = KeyCodecs::new(vec![Box::new(Libp2pCodec)]);
        let trx = signed_trx(KeyScheme::Secp256k1);
        assert!(verify_trx_with(&codecs, &trx).is_err());
    }
}
