//! Provides a unified interface for signing transaction digests.
//!
//! You can implement the [`Signer`] trait to extend signing to other
//! backends such as Hardware Security Modules or remote KMS services.
//!
//! The exposed interface returns the chain's compact recoverable
//! signature so that network nodes can recover the signing identity
//! from the signature alone.
//!
//! ```no_run
//! use graphene_signers::{Signer, Wallet};
//!
//! # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
//! // instantiate the wallet from a WIF key
//! let wallet = "5JRaypasxMx1L97ZUX7YuC5Psb5EAbF821kkAGtBj7xCJFQcbLg"
//!     .parse::<Wallet>()?;
//!
//! // sign a 32-byte digest
//! let signature = wallet.sign_digest(&[0u8; 32]).await?;
//! # Ok(())
//! # }
//! ```

mod wallet;
pub use wallet::{Wallet, WalletError};

use async_trait::async_trait;
use graphene_core::types::Signature;
use secp256k1::PublicKey;
use std::error::Error;

/// Trait for signing transaction digests.
///
/// Implement this trait to support different signing modes, e.g.
/// hardware wallets or hosted key services.
#[async_trait]
pub trait Signer: std::fmt::Debug + Send + Sync {
    type Error: Error + Send + Sync + 'static;

    /// Signs the 32-byte digest, producing a canonical recoverable
    /// signature. Must be deterministic per `(digest, key)` input.
    async fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature, Self::Error>;

    /// Returns the signer's public key.
    fn public_key(&self) -> PublicKey;
}
