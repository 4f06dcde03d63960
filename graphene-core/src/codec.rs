//! The canonical (consensus) binary encoding of transactions.
//!
//! This layout is what network nodes hash when they check signatures,
//! so it must match the node software byte for byte: fixed-width
//! little-endian integers, unsigned varints for lengths and operation
//! ids, UTF-8 string bytes behind a varint length, and a trailing
//! varint extension count that is always zero.

use crate::types::Transaction;
use sha2::{Digest, Sha256};

/// Appends an unsigned LEB128 varint.
pub fn write_varint(buf: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Appends a string as varint byte length followed by UTF-8 bytes.
pub fn write_string(buf: &mut Vec<u8>, s: &str) {
    write_varint(buf, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}

/// Produces the canonical byte encoding of an unsigned transaction.
///
/// Implementations must be deterministic: identical inputs yield
/// identical bytes, with operation order preserved verbatim. The
/// default [`WireEncoder`] implements the current chain layout;
/// alternative encoders exist so hardforks that change the layout can
/// be supported without touching transaction construction.
pub trait TransactionEncoder {
    fn encode(&self, tx: &Transaction, protocol_version: u32) -> Vec<u8>;
}

/// The chain's wire encoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct WireEncoder;

impl TransactionEncoder for WireEncoder {
    fn encode(&self, tx: &Transaction, protocol_version: u32) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        buf.extend_from_slice(&tx.ref_block_num.to_le_bytes());
        buf.extend_from_slice(&tx.ref_block_prefix.to_le_bytes());
        buf.extend_from_slice(&(tx.expiration.and_utc().timestamp() as u32).to_le_bytes());

        write_varint(&mut buf, tx.operations.len() as u64);
        for op in &tx.operations {
            write_varint(&mut buf, op.wire_id(protocol_version) as u64);
            op.encode(&mut buf, protocol_version);
        }

        // extensions, reserved and always empty
        write_varint(&mut buf, 0);
        buf
    }
}

/// SHA-256 of `bytes`, the chain's message-hash primitive.
pub fn sha256(bytes: &[u8]) -> [u8; 32] {
    Sha256::digest(bytes).into()
}

/// The 32-byte digest all signatures commit to: SHA-256 over the chain
/// id followed by the canonical transaction encoding.
pub fn signing_digest(tx: &Transaction, protocol_version: u32) -> [u8; 32] {
    let encoded = WireEncoder.encode(tx, protocol_version);
    let mut hasher = Sha256::new();
    hasher.update(&tx.chain_id);
    hasher.update(&encoded);
    hasher.finalize().into()
}
