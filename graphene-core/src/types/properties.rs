use crate::types::serde_helpers::chain_time;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// The subset of `get_dynamic_global_properties` a transaction is bound
/// to: the current head block and chain time.
///
/// Never cached — the expiration window is only 30 seconds, so values
/// are fetched fresh per transaction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicGlobalProperties {
    pub head_block_number: u64,

    /// Hex-encoded 20-byte block id of the head block.
    pub head_block_id: String,

    /// Chain time of the head block.
    #[serde(with = "chain_time")]
    pub time: NaiveDateTime,
}

impl DynamicGlobalProperties {
    /// A synthetic head for calls that validate signatures only and
    /// ignore ref-block freshness (`verify_authority`).
    pub fn placeholder(now: NaiveDateTime) -> Self {
        Self {
            head_block_number: 0,
            head_block_id: "0".repeat(40),
            time: now,
        }
    }
}

/// The two `get_config` fields that identify a chain: its 32-byte chain
/// id and the minimum payout, whose symbol names the stable asset.
///
/// Responses are validated at this deserialization boundary; both
/// fields are optional in the wire shape so a foreign or broken node
/// yields `None` instead of a parse failure for the whole response.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ChainConfig {
    #[serde(rename = "STEEMIT_CHAIN_ID")]
    pub chain_id: Option<String>,

    #[serde(rename = "STEEMIT_MIN_PAYOUT_SBD")]
    pub min_payout_sbd: Option<String>,
}
