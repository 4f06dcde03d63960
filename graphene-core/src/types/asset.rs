use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Width of the symbol field in the binary asset layout.
const SYMBOL_BYTES: usize = 7;

/// An amount of some chain asset, e.g. `"0.001 GOLOS"` or `"1.000 GBG"`.
///
/// The chain transmits assets as strings with a fixed number of decimal
/// places; the number of places *is* the asset precision and is part of
/// the consensus encoding, so it is preserved exactly on round trips.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Asset {
    /// Amount in the smallest unit (`1.000` with precision 3 is `1000`).
    pub amount: i64,
    /// Number of decimal places the symbol uses on-chain.
    pub precision: u8,
    /// Upper-case asset symbol, at most seven ASCII characters.
    pub symbol: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
/// Error thrown when parsing an asset string
pub enum ParseAssetError {
    #[error("asset must be \"<amount> <symbol>\", got {0:?}")]
    MalformedInput(String),

    #[error("invalid asset amount {0:?}")]
    InvalidAmount(String),

    #[error("asset symbol {0:?} is empty or longer than seven characters")]
    InvalidSymbol(String),
}

impl Asset {
    pub fn new(amount: i64, precision: u8, symbol: impl Into<String>) -> Self {
        Self { amount, precision, symbol: symbol.into() }
    }

    /// Appends the binary consensus layout: amount as `i64` LE,
    /// precision byte, then the symbol NUL-padded to seven bytes.
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.amount.to_le_bytes());
        buf.push(self.precision);
        let mut symbol = [0u8; SYMBOL_BYTES];
        let bytes = self.symbol.as_bytes();
        symbol[..bytes.len().min(SYMBOL_BYTES)]
            .copy_from_slice(&bytes[..bytes.len().min(SYMBOL_BYTES)]);
        buf.extend_from_slice(&symbol);
    }
}

impl FromStr for Asset {
    type Err = ParseAssetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split_whitespace();
        let (amount, symbol) = match (parts.next(), parts.next(), parts.next()) {
            (Some(amount), Some(symbol), None) => (amount, symbol),
            _ => return Err(ParseAssetError::MalformedInput(s.to_owned())),
        };

        if symbol.is_empty() || symbol.len() > SYMBOL_BYTES {
            return Err(ParseAssetError::InvalidSymbol(symbol.to_owned()));
        }

        let precision = match amount.split_once('.') {
            Some((_, frac)) if frac.contains('.') => {
                return Err(ParseAssetError::InvalidAmount(amount.to_owned()));
            }
            Some((_, frac)) => frac.len() as u8,
            None => 0,
        };
        let digits: String = amount.chars().filter(|c| *c != '.').collect();
        let value = digits
            .parse::<i64>()
            .map_err(|_| ParseAssetError::InvalidAmount(amount.to_owned()))?;

        Ok(Self { amount: value, precision, symbol: symbol.to_owned() })
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // sign is carried separately so sub-unit negatives like
        // `-0.500` keep it even when the integral part is zero
        let sign = if self.amount < 0 { "-" } else { "" };
        let divisor = 10u64.pow(self.precision as u32);
        let magnitude = self.amount.unsigned_abs();
        if self.precision == 0 {
            return write!(f, "{}{} {}", sign, magnitude, self.symbol);
        }
        write!(
            f,
            "{}{}.{:0width$} {}",
            sign,
            magnitude / divisor,
            magnitude % divisor,
            self.symbol,
            width = self.precision as usize
        )
    }
}

impl Serialize for Asset {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Asset {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
