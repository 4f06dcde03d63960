//! Graphene-chain data types, cryptographic digests and the canonical
//! wire encoding shared by Steem-descended networks.
//!
//! The consensus rules sign a transaction over the SHA-256 digest of
//! `chain_id ++ canonical_encoding(transaction)`. Any deviation in the
//! encoding silently produces a digest the network attributes to
//! nobody, so the codec in [`codec`] is bit-for-bit the layout the
//! node software uses.

pub mod codec;

pub mod types;

pub use codec::{TransactionEncoder, WireEncoder};
pub use types::*;
