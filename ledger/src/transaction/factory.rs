//! A per-group façade that produces every kind of transaction.
//!
//! [`TrxFactory`] knows the group, the local signing identity and where
//! nonces come from. Each method encodes a typed item, picks the nonce,
//! and hands off to [`TrxEngine::create_trx`].

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use super::engine::TrxEngine;
use super::error::TransactionError;
use super::items::{
    AnnounceItem, AppConfigItem, ChainConfigItem, ProducerItem, ReqBlkResult, ReqBlock,
    ReqBlockResp, SchemaItem, UserItem,
};
use super::trx::Trx;
use super::types::TrxType;
use crate::block::Block;
use crate::codec::{self, EncodingError};
use crate::config::OUT_OF_STREAM_NONCE;
use crate::group::GroupDescriptor;
use crate::keystore::SignerRef;
use crate::nonce::{NonceError, NonceSource};

/// Errors raised by the factory.
#[derive(Debug, Error)]
pub enum FactoryError {
    /// A post payload exceeds the configured limit. Raised before any
    /// nonce is consumed or any crypto runs.
    #[error("post payload is {size} bytes, limit is {limit}")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error(transparent)]
    Nonce(#[from] NonceError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

/// Produces signed transactions for one group and one local identity.
pub struct TrxFactory {
    group: GroupDescriptor,
    node_name: String,
    signer: SignerRef,
    nonces: Arc<dyn NonceSource>,
    engine: TrxEngine,
}

impl TrxFactory {
    /// Bind a factory to `group`. Trxs are signed with the key registered
    /// under the group id unless an alias method is used.
    pub fn new(
        group: GroupDescriptor,
        node_name: impl Into<String>,
        nonces: Arc<dyn NonceSource>,
        engine: TrxEngine,
    ) -> Self {
        let signer = SignerRef::group(group.group_id.clone());
        Self {
            group,
            node_name: node_name.into(),
            signer,
            nonces,
            engine,
        }
    }

    pub fn group(&self) -> &GroupDescriptor {
        &self.group
    }

    // -- nonce stream ----------------------------------------------------

    /// Build and sign a trx with the next nonce from the nonce source.
    /// Out-of-stream types always carry nonce 0 and leave the stream alone.
    pub fn create_trx(
        &self,
        trx_type: TrxType,
        data: &[u8],
        recipients: Option<&[String]>,
    ) -> Result<Trx, FactoryError> {
        let signer = self.signer.clone();
        self.create_trx_as(&signer, trx_type, data, recipients)
    }

    /// As [`create_trx`](Self::create_trx) but signed with the key stored
    /// under `alias`.
    pub fn create_trx_with_alias(
        &self,
        alias: &str,
        trx_type: TrxType,
        data: &[u8],
        recipients: Option<&[String]>,
    ) -> Result<Trx, FactoryError> {
        self.create_trx_as(&SignerRef::alias(alias), trx_type, data, recipients)
    }

    fn create_trx_as(
        &self,
        signer: &SignerRef,
        trx_type: TrxType,
        data: &[u8],
        recipients: Option<&[String]>,
    ) -> Result<Trx, FactoryError> {
        let nonce = if trx_type.is_out_of_stream() {
            OUT_OF_STREAM_NONCE
        } else {
            self.nonces
                .next_nonce(&self.group.group_id, &self.node_name)?
        };
        Ok(self
            .engine
            .create_trx(&self.group, trx_type, nonce, data, recipients, signer)?)
    }

    fn item_trx<T: Serialize>(&self, trx_type: TrxType, item: &T) -> Result<Trx, FactoryError> {
        let encoded = codec::encode(item)?;
        self.create_trx(trx_type, &encoded, None)
    }

    pub fn app_config_trx(&self, item: &AppConfigItem) -> Result<Trx, FactoryError> {
        self.item_trx(TrxType::AppConfig, item)
    }

    pub fn chain_config_trx(&self, item: &ChainConfigItem) -> Result<Trx, FactoryError> {
        self.item_trx(TrxType::ChainConfig, item)
    }

    pub fn reg_producer_trx(&self, item: &ProducerItem) -> Result<Trx, FactoryError> {
        self.item_trx(TrxType::Producer, item)
    }

    pub fn reg_user_trx(&self, item: &UserItem) -> Result<Trx, FactoryError> {
        self.item_trx(TrxType::User, item)
    }

    pub fn announce_trx(&self, item: &AnnounceItem) -> Result<Trx, FactoryError> {
        self.item_trx(TrxType::Announce, item)
    }

    pub fn schema_trx(&self, item: &SchemaItem) -> Result<Trx, FactoryError> {
        self.item_trx(TrxType::Schema, item)
    }

    /// Post arbitrary content. In a private group `recipients` are the hex
    /// X25519 keys the post is sealed to.
    ///
    /// # Errors
    ///
    /// [`FactoryError::PayloadTooLarge`] if the encoded content exceeds
    /// the configured limit.
    pub fn post_trx<T: Serialize + ?Sized>(
        &self,
        content: &T,
        recipients: Option<&[String]>,
    ) -> Result<Trx, FactoryError> {
        let encoded = self.encode_post(content)?;
        self.create_trx(TrxType::Post, &encoded, recipients)
    }

    pub fn post_trx_with_alias<T: Serialize + ?Sized>(
        &self,
        alias: &str,
        content: &T,
        recipients: Option<&[String]>,
    ) -> Result<Trx, FactoryError> {
        let encoded = self.encode_post(content)?;
        self.create_trx_with_alias(alias, TrxType::Post, &encoded, recipients)
    }

    fn encode_post<T: Serialize + ?Sized>(&self, content: &T) -> Result<Vec<u8>, FactoryError> {
        let encoded = codec::encode(content)?;
        let limit = self.engine.config().max_post_payload;
        if encoded.len() > limit {
            tracing::warn!(
                group_id = %self.group.group_id,
                size = encoded.len(),
                limit,
                "post rejected, payload too large"
            );
            return Err(FactoryError::PayloadTooLarge {
                size: encoded.len(),
                limit,
            });
        }
        Ok(encoded)
    }

    // -- out of stream ---------------------------------------------------

    fn out_of_stream_trx(&self, trx_type: TrxType, data: &[u8]) -> Result<Trx, FactoryError> {
        Ok(self.engine.create_trx(
            &self.group,
            trx_type,
            OUT_OF_STREAM_NONCE,
            data,
            None,
            &self.signer,
        )?)
    }

    fn req_block(&self, block: &Block) -> Result<Vec<u8>, FactoryError> {
        let req = ReqBlock {
            group_id: block.group_id.clone(),
            epoch: block.epoch,
            user_id: self.group.user_sign_pubkey.clone(),
        };
        Ok(codec::encode(&req)?)
    }

    /// Ask peers for the block following `block`.
    pub fn req_block_forward_trx(&self, block: &Block) -> Result<Trx, FactoryError> {
        let data = self.req_block(block)?;
        self.out_of_stream_trx(TrxType::ReqBlockForward, &data)
    }

    /// Ask peers for the block preceding `block`.
    pub fn req_block_backward_trx(&self, block: &Block) -> Result<Trx, FactoryError> {
        let data = self.req_block(block)?;
        self.out_of_stream_trx(TrxType::ReqBlockBackward, &data)
    }

    /// Answer `requester` with `block`.
    pub fn req_block_resp_trx(
        &self,
        requester: &str,
        block: &Block,
        result: ReqBlkResult,
    ) -> Result<Trx, FactoryError> {
        let resp = ReqBlockResp {
            result,
            provider_pubkey: self.group.user_sign_pubkey.clone(),
            requester_pubkey: requester.to_string(),
            group_id: block.group_id.clone(),
            epoch: block.epoch,
            block: block.to_bytes()?,
        };
        let data = codec::encode(&resp)?;
        self.out_of_stream_trx(TrxType::ReqBlockResp, &data)
    }

    /// Announce that `block` was produced.
    pub fn block_produced_trx(&self, block: &Block) -> Result<Trx, FactoryError> {
        let data = block.to_bytes()?;
        self.out_of_stream_trx(TrxType::BlockProduced, &data)
    }
}

impl std::fmt::Debug for TrxFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrxFactory")
            .field("group_id", &self.group.group_id)
            .field("node_name", &self.node_name)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::{BlockEngine, Producer};
    use crate::config::LedgerConfig;
    use crate::crypto::keys::KeyScheme;
    use crate::group::GroupEncryptMode;
    use crate::keystore::{KeyStore, KeyStoreError, LocalKeyStore};
    use crate::nonce::MemoryNonceSource;
    use crate::transaction::verify_trx;
    use crate::transaction::items::{Action, AnnounceRole};

    const CIPHER: [u8; 32] = [9; 32];

    struct Fixture {
        ks: Arc<LocalKeyStore>,
        nonces: Arc<MemoryNonceSource>,
        factory: TrxFactory,
    }

    fn fixture(mode: GroupEncryptMode, config: LedgerConfig) -> Fixture {
        let ks = Arc::new(LocalKeyStore::new());
        let pubkey = ks.generate_signing_key(SignerRef::group("g1"), KeyScheme::Secp256k1);
        let group = GroupDescriptor::new("g1", mode, hex::encode(CIPHER), pubkey);
        let nonces = Arc::new(MemoryNonceSource::new());
        let engine = TrxEngine::new(ks.clone(), config);
        let factory = TrxFactory::new(group, "node-a", nonces.clone(), engine);
        Fixture { ks, nonces, factory }
    }

    fn genesis(ks: &Arc<LocalKeyStore>) -> Block {
        let signer = SignerRef::alias("producer");
        let pubkey = ks.generate_signing_key(signer.clone(), KeyScheme::Secp256k1);
        BlockEngine::new(ks.clone())
            .build_genesis("g1", &Producer { pubkey, signer })
            .unwrap()
    }

    fn announce() -> AnnounceItem {
        AnnounceItem {
            group_id: "g1".into(),
            sign_pubkey: "sign".into(),
            encrypt_pubkey: "enc".into(),
            role: AnnounceRole::User,
            action: Action::Add,
            memo: String::new(),
            timestamp: 0,
        }
    }

    #[test]
    fn stream_trxs_take_consecutive_nonces() {
        let f = fixture(GroupEncryptMode::Public, LedgerConfig::default());
        let a = f.factory.announce_trx(&announce()).unwrap();
        let b = f.factory.post_trx("hello", None).unwrap();
        assert_eq!((a.nonce, b.nonce), (1, 2));
        assert_eq!(a.trx_type, TrxType::Announce);
        assert_eq!(b.trx_type, TrxType::Post);
        assert!(verify_trx(&a).unwrap());
        assert!(verify_trx(&b).unwrap());
        assert_eq!(f.nonces.current("g1", "node-a"), Some(2));
    }

    #[test]
    fn item_is_the_sealed_plaintext() {
        let f = fixture(GroupEncryptMode::Public, LedgerConfig::default());
        let item = announce();
        let trx = f.factory.announce_trx(&item).unwrap();
        let plain = f.ks.decrypt_symmetric(&trx.data, &CIPHER).unwrap();
        assert_eq!(codec::decode::<AnnounceItem>(&plain).unwrap(), item);
    }

    #[test]
    fn oversize_post_is_rejected_before_nonce() {
        let f = fixture(
            GroupEncryptMode::Public,
            LedgerConfig::default().with_max_post_payload(64),
        );
        let err = f.factory.post_trx(&vec![0u8; 64], None).unwrap_err();
        assert!(matches!(err, FactoryError::PayloadTooLarge { limit: 64, .. }));
        assert_eq!(f.nonces.current("g1", "node-a"), None);
    }

    #[test]
    fn alias_post_signs_with_alias_key() {
        let f = fixture(GroupEncryptMode::Public, LedgerConfig::default());
        let bot = f.ks.generate_signing_key(SignerRef::alias("bot"), KeyScheme::Libp2p);

        // The sender field always carries the group descriptor's key.
        let trx = f.factory.post_trx_with_alias("bot", "hi", None).unwrap();
        assert!(!verify_trx(&trx).unwrap());

        let mut group = f.factory.group().clone();
        group.user_sign_pubkey = bot;
        let engine = TrxEngine::new(f.ks.clone(), LedgerConfig::default());
        let bot_factory = TrxFactory::new(group, "node-a", f.nonces.clone(), engine);
        let trx = bot_factory.post_trx_with_alias("bot", "hi", None).unwrap();
        assert!(verify_trx(&trx).unwrap());
        assert_eq!(trx.nonce, 2);

        let err = f.factory.post_trx_with_alias("missing", "hi", None).unwrap_err();
        assert!(matches!(err, FactoryError::Transaction(TransactionError::KeyStore(_))));
    }

    #[test]
    fn private_post_goes_to_recipients() {
        let f = fixture(GroupEncryptMode::Private, LedgerConfig::default());
        let alice = f.ks.generate_encrypt_key("alice");
        let trx = f.factory.post_trx("psst", Some(&[alice][..])).unwrap();
        let plain = f.ks.decrypt_for("alice", &trx.data).unwrap();
        assert_eq!(codec::decode::<String>(&plain).unwrap(), "psst");
    }

    #[test]
    fn out_of_stream_trxs_use_nonce_zero() {
        let f = fixture(GroupEncryptMode::Private, LedgerConfig::default());
        let block = genesis(&f.ks);

        let trxs = [
            f.factory.req_block_forward_trx(&block).unwrap(),
            f.factory.req_block_backward_trx(&block).unwrap(),
            f.factory
                .req_block_resp_trx("requester", &block, ReqBlkResult::BlockInTrx)
                .unwrap(),
            f.factory.block_produced_trx(&block).unwrap(),
        ];
        for trx in &trxs {
            assert_eq!(trx.nonce, 0);
            assert!(verify_trx(trx).unwrap());
            // Private group, yet never recipient-sealed.
            assert!(f.ks.decrypt_symmetric(&trx.data, &CIPHER).is_ok());
        }
        assert_eq!(f.nonces.current("g1", "node-a"), None);

        let plain = f.ks.decrypt_symmetric(&trxs[2].data, &CIPHER).unwrap();
        let resp: ReqBlockResp = codec::decode(&plain).unwrap();
        assert_eq!(resp.requester_pubkey, "requester");
        assert_eq!(Block::from_bytes(&resp.block).unwrap(), block);
    }

    #[test]
    fn generic_path_keeps_out_of_stream_types_off_the_stream() {
        let f = fixture(GroupEncryptMode::Public, LedgerConfig::default());
        f.ks.generate_signing_key(SignerRef::alias("bot"), KeyScheme::Secp256k1);
        for trx_type in [
            TrxType::BlockProduced,
            TrxType::ReqBlockForward,
            TrxType::ReqBlockBackward,
            TrxType::ReqBlockResp,
        ] {
            let trx = f.factory.create_trx(trx_type, b"x", None).unwrap();
            assert_eq!(trx.nonce, 0, "{trx_type} took a stream nonce");
            let trx = f
                .factory
                .create_trx_with_alias("bot", trx_type, b"x", None)
                .unwrap();
            assert_eq!(trx.nonce, 0);
        }
        assert_eq!(f.nonces.current("g1", "node-a"), None);

        let post = f.factory.create_trx(TrxType::Post, b"x", None).unwrap();
        assert_eq!(post.nonce, 1);
    }

    #[test]
    fn nonce_exhaustion_propagates() {
        let f = fixture(GroupEncryptMode::Public, LedgerConfig::default());
        f.nonces.resume_from("g1", "node-a", u64::MAX);
        let err = f.factory.announce_trx(&announce()).unwrap_err();
        assert!(matches!(err, FactoryError::Nonce(NonceError::Exhausted { .. })));
    }

    struct SilentSigner(LocalKeyStore);

    impl KeyStore for SilentSigner {
        fn sign(&self, _: &SignerRef, _: &[u8]) -> Result<Vec<u8>, KeyStoreError> {
            Ok(Vec::new())
        }
        fn encrypt_symmetric(&self, pt: &[u8], key: &[u8]) -> Result<Vec<u8>, KeyStoreError> {
            self.0.encrypt_symmetric(pt, key)
        }
        fn encrypt_to(&self, pt: &[u8], r: &[String]) -> Result<Vec<u8>, KeyStoreError> {
            self.0.encrypt_to(pt, r)
        }
    }

    #[test]
    fn empty_signature_is_fatal() {
        let engine = TrxEngine::new(
            Arc::new(SilentSigner(LocalKeyStore::new())),
            LedgerConfig::default(),
        );
        let group = GroupDescriptor::new("g1", GroupEncryptMode::Public, hex::encode(CIPHER), "pk");
        let factory = TrxFactory::new(group, "n", Arc::new(MemoryNonceSource::new()), engine);
        let err = factory.post_trx("x", None).unwrap_err();
        assert!(matches!(
            err,
            FactoryError::Transaction(TransactionError::EmptySignature { .. })
        ));
    }
}
