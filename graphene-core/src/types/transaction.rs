use crate::{
    codec,
    types::{serde_helpers::chain_time, DynamicGlobalProperties, Operation, Signature},
};
use chrono::{Duration, NaiveDateTime};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use thiserror::Error;

/// How long past the head-block time a transaction stays valid. Long
/// enough for network latency, short enough to bound replay.
pub const TX_EXPIRATION_SECONDS: i64 = 30;

/// An unsigned transaction bound to a recent chain state.
///
/// `ref_block_num`/`ref_block_prefix` tie the transaction to the head
/// block it was built against and `expiration` bounds its validity
/// window. All of these fields, the operation order and the chain id
/// are part of the signed payload; changing any of them changes the
/// digest.
#[derive(Debug)]
pub struct Transaction {
    /// The 32-byte id of the target chain. Prefixed to the encoding
    /// before hashing, never broadcast in the JSON body.
    pub chain_id: Vec<u8>,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    pub expiration: NaiveDateTime,
    /// Caller-supplied order, preserved verbatim.
    pub operations: Vec<Box<dyn Operation>>,
}

/// A [`Transaction`] plus the signatures collected so far, in the
/// order the keys were supplied. Zero signatures is a legal state used
/// for structural-only construction.
#[derive(Debug)]
pub struct SignedTransaction {
    pub transaction: Transaction,
    pub signatures: Vec<Signature>,
}

#[derive(Debug, Error)]
/// Error thrown when binding a transaction to head-block metadata
pub enum TransactionError {
    #[error("head block id is not valid hex: {0}")]
    InvalidBlockId(#[from] hex::FromHexError),

    #[error("head block id must be at least 8 bytes, got {0}")]
    BlockIdTooShort(usize),
}

impl Transaction {
    /// Binds a new transaction to the given head-block metadata.
    ///
    /// `ref_block_num` is the low 16 bits of the head block number and
    /// `ref_block_prefix` the little-endian word at bytes 4..8 of the
    /// head block id; this is the reference-block scheme the chain
    /// uses to prove a transaction was built against a known fork.
    pub fn new(
        chain_id: impl Into<Vec<u8>>,
        head: &DynamicGlobalProperties,
        operations: Vec<Box<dyn Operation>>,
    ) -> Result<Self, TransactionError> {
        let block_id = hex::decode(&head.head_block_id)?;
        if block_id.len() < 8 {
            return Err(TransactionError::BlockIdTooShort(block_id.len()));
        }
        let prefix: [u8; 4] = block_id[4..8].try_into().expect("slice is four bytes");

        Ok(Self {
            chain_id: chain_id.into(),
            ref_block_num: (head.head_block_number & 0xffff) as u16,
            ref_block_prefix: u32::from_le_bytes(prefix),
            expiration: head.time + Duration::seconds(TX_EXPIRATION_SECONDS),
            operations,
        })
    }

    /// The 32-byte signing digest: SHA-256 over the chain id followed
    /// by the canonical encoding for `protocol_version`.
    pub fn digest(&self, protocol_version: u32) -> [u8; 32] {
        codec::signing_digest(self, protocol_version)
    }

    /// Wraps the transaction without attaching any signatures.
    pub fn into_unsigned(self) -> SignedTransaction {
        SignedTransaction { transaction: self, signatures: Vec::new() }
    }
}

fn serialize_fields<S: SerializeStruct>(tx: &Transaction, s: &mut S) -> Result<(), S::Error> {
    s.serialize_field("ref_block_num", &tx.ref_block_num)?;
    s.serialize_field("ref_block_prefix", &tx.ref_block_prefix)?;
    s.serialize_field(
        "expiration",
        &tx.expiration.format(chain_time::FORMAT).to_string(),
    )?;
    let operations: Vec<(&str, serde_json::Value)> =
        tx.operations.iter().map(|op| (op.name(), op.to_json())).collect();
    s.serialize_field("operations", &operations)?;
    // always present and always empty; reserved by the protocol
    s.serialize_field("extensions", &[(); 0])?;
    Ok(())
}

impl Serialize for Transaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("transaction", 5)?;
        serialize_fields(self, &mut s)?;
        s.end()
    }
}

impl Serialize for SignedTransaction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("signed_transaction", 6)?;
        serialize_fields(&self.transaction, &mut s)?;
        s.serialize_field("signatures", &self.signatures)?;
        s.end()
    }
}
