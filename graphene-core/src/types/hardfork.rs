use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// A chain hardfork version, reported by nodes as `"0.19.3"`.
///
/// The middle component is the hardfork number and doubles as the
/// protocol version that parameterizes the consensus encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct HardforkVersion {
    pub major: u32,
    pub hardfork: u32,
    pub patch: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("hardfork version must be \"major.hardfork.patch\", got {0:?}")]
pub struct ParseVersionError(String);

impl HardforkVersion {
    /// The integer protocol version used to select the wire encoding.
    ///
    /// Nodes reporting a zero hardfork number are treated as invalid
    /// by the endpoint prober; see `graphene-providers`.
    pub fn protocol_version(&self) -> u32 {
        self.hardfork
    }
}

impl FromStr for HardforkVersion {
    type Err = ParseVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.').map(|p| p.parse::<u32>());
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(major)), Some(Ok(hardfork)), Some(Ok(patch)), None) => {
                Ok(Self { major, hardfork, patch })
            }
            _ => Err(ParseVersionError(s.to_owned())),
        }
    }
}

impl fmt::Display for HardforkVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.hardfork, self.patch)
    }
}

impl Serialize for HardforkVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HardforkVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_extracts_protocol_version() {
        let v: HardforkVersion = "0.19.3".parse().unwrap();
        assert_eq!((v.major, v.hardfork, v.patch), (0, 19, 3));
        assert_eq!(v.protocol_version(), 19);
    }

    #[test]
    fn rejects_malformed_versions() {
        for s in ["", "19", "0.19", "0.19.3.1", "a.b.c"] {
            assert!(s.parse::<HardforkVersion>().is_err(), "{s:?}");
        }
    }

    #[test]
    fn deserializes_from_json_string() {
        let v: HardforkVersion = serde_json::from_str("\"0.22.1\"").unwrap();
        assert_eq!(v.protocol_version(), 22);
    }
}
