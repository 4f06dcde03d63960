use super::Wallet;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use std::str::FromStr;
use thiserror::Error;

/// The WIF version byte for a raw private key.
const WIF_VERSION: u8 = 0x80;

#[derive(Debug, Error)]
/// Error thrown by [`Wallet`] key handling
pub enum WalletError {
    /// Underlying secp256k1 error
    #[error(transparent)]
    Secp256k1Error(#[from] secp256k1::Error),

    /// Thrown when the WIF base58/checksum decoding fails
    #[error(transparent)]
    Base58Error(#[from] bs58::decode::Error),

    #[error("WIF payload must be a version byte plus 32 key bytes, got {0} bytes")]
    InvalidWifLength(usize),
}

impl Wallet {
    /// Creates a wallet from a raw 32-byte private key.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, WalletError> {
        let secp = Secp256k1::new();
        let signer = SecretKey::from_slice(bytes)?;
        let public = PublicKey::from_secret_key(&secp, &signer);
        Ok(Self { signer, public, secp })
    }

    /// Exports the private key in Wallet Import Format.
    pub fn to_wif(&self) -> String {
        let mut payload = Vec::with_capacity(33);
        payload.push(WIF_VERSION);
        payload.extend_from_slice(&self.signer.secret_bytes());
        bs58::encode(payload).with_check().into_string()
    }
}

impl FromStr for Wallet {
    type Err = WalletError;

    /// Parses a private key in Wallet Import Format, the form chain
    /// frontends hand out (`5...`).
    fn from_str(src: &str) -> Result<Self, Self::Err> {
        let payload = bs58::decode(src).with_check(Some(WIF_VERSION)).into_vec()?;
        if payload.len() != 33 {
            return Err(WalletError::InvalidWifLength(payload.len()));
        }
        Wallet::from_bytes(&payload[1..])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wif_round_trip() {
        let wallet = Wallet::from_bytes(&[0x42u8; 32]).unwrap();
        let wif = wallet.to_wif();
        assert!(wif.starts_with('5'), "mainnet WIF keys start with 5: {wif}");

        let parsed: Wallet = wif.parse().unwrap();
        assert_eq!(parsed.public_key(), wallet.public_key());
    }

    #[test]
    fn rejects_corrupted_wif() {
        let wallet = Wallet::from_bytes(&[0x42u8; 32]).unwrap();
        let mut wif = wallet.to_wif();
        // flip one character; base58check must catch it
        let tail = if wif.ends_with('x') { 'y' } else { 'x' };
        wif.pop();
        wif.push(tail);
        assert!(wif.parse::<Wallet>().is_err());
    }

    #[test]
    fn rejects_zero_key() {
        assert!(Wallet::from_bytes(&[0u8; 32]).is_err());
    }
}
