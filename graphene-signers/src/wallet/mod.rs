mod private_key;
pub use private_key::WalletError;

use crate::Signer;
use async_trait::async_trait;
use graphene_core::types::{Signature, SIGNATURE_LENGTH};
use secp256k1::{ecdsa::RecoveryId, All, Message, PublicKey, Secp256k1, SecretKey};
use std::fmt;

/// A secp256k1 key pair which can sign transaction digests in the
/// chain's compact recoverable format.
///
/// Signatures are deterministic (RFC 6979) and *canonical*: nodes
/// reject signatures whose `r`/`s` encoding is ambiguous, so signing
/// retries with an extra-entropy counter until the canonicity
/// predicate holds. The retry counter is itself deterministic, keeping
/// the whole scheme reproducible per `(digest, key)`.
///
/// # Examples
///
/// ```
/// use graphene_signers::{Signer, Wallet};
///
/// # async fn foo() -> Result<(), Box<dyn std::error::Error>> {
/// let wallet = Wallet::new(&mut rand::thread_rng());
/// let signature = wallet.sign_digest(&[7u8; 32]).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Wallet {
    /// The wallet's private key
    pub(crate) signer: SecretKey,
    /// The matching public key
    pub(crate) public: PublicKey,
    pub(crate) secp: Secp256k1<All>,
}

#[async_trait]
impl Signer for Wallet {
    type Error = std::convert::Infallible;

    async fn sign_digest(&self, digest: &[u8; 32]) -> Result<Signature, Self::Error> {
        Ok(self.sign_canonical(digest))
    }

    fn public_key(&self) -> PublicKey {
        self.public
    }
}

impl Wallet {
    /// Creates a wallet with a random private key.
    pub fn new<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        let secp = Secp256k1::new();
        let signer = SecretKey::new(rng);
        let public = PublicKey::from_secret_key(&secp, &signer);
        Self { signer, public, secp }
    }

    /// Signs `digest`, retrying with an incrementing extra-entropy
    /// counter until the signature is canonical.
    pub fn sign_canonical(&self, digest: &[u8; 32]) -> Signature {
        let message = Message::from_slice(digest).expect("digest is 32 bytes");

        let mut extra = [0u8; 32];
        for attempt in 0u32.. {
            let signature = if attempt == 0 {
                self.secp.sign_ecdsa_recoverable(&message, &self.signer)
            } else {
                extra[..4].copy_from_slice(&attempt.to_le_bytes());
                self.secp
                    .sign_ecdsa_recoverable_with_noncedata(&message, &self.signer, &extra)
            };

            let (recovery_id, compact) = signature.serialize_compact();
            if is_canonical(&compact) {
                return encode_compact(recovery_id, &compact);
            }
        }
        unreachable!("a canonical nonce always exists")
    }

    /// Gets the wallet's public key.
    pub fn public_key(&self) -> PublicKey {
        self.public
    }
}

/// The chain accepts a signature only if neither `r` nor `s` could be
/// mistaken for a shorter or negative big-endian integer.
fn is_canonical(compact: &[u8; 64]) -> bool {
    compact[0] & 0x80 == 0
        && !(compact[0] == 0 && compact[1] & 0x80 == 0)
        && compact[32] & 0x80 == 0
        && !(compact[32] == 0 && compact[33] & 0x80 == 0)
}

fn encode_compact(recovery_id: RecoveryId, compact: &[u8; 64]) -> Signature {
    let mut out = [0u8; SIGNATURE_LENGTH];
    // 27 for recoverable, + 4 for a compressed public key
    out[0] = 27 + 4 + recovery_id.to_i32() as u8;
    out[1..].copy_from_slice(compact);
    Signature(out)
}

// do not log the private key
impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet").field("public", &self.public).finish()
    }
}
