//! Typed representations of chain data: money, versions, global
//! properties, operations, transactions and signatures.

mod asset;
pub use asset::{Asset, ParseAssetError};

mod hardfork;
pub use hardfork::{HardforkVersion, ParseVersionError};

mod properties;
pub use properties::{ChainConfig, DynamicGlobalProperties};

mod operation;
pub use operation::{Operation, TransferOperation, VoteOperation};

mod signature;
pub use signature::{Signature, SignatureError, SIGNATURE_LENGTH};

mod transaction;
pub use transaction::{
    SignedTransaction, Transaction, TransactionError, TX_EXPIRATION_SECONDS,
};

pub mod serde_helpers;
