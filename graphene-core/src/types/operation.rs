use crate::{
    codec,
    types::Asset,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt::Debug;

/// A chain operation: the unit of intent inside a transaction.
///
/// Every operation has three faces that must agree: a JSON name and
/// payload (what goes over JSON-RPC), a numeric wire id and a binary
/// body (what the consensus encoding signs). The wire id and body may
/// legitimately differ across protocol versions, which is why both
/// hooks receive the active version.
///
/// The full catalog is large; this crate ships the operations needed
/// to exercise the pipeline and downstream crates add their own by
/// implementing this trait.
pub trait Operation: Debug + Send + Sync {
    /// JSON-RPC wire name, e.g. `"vote"`.
    fn name(&self) -> &'static str;

    /// Numeric id used in the binary encoding.
    fn wire_id(&self, protocol_version: u32) -> u8;

    /// Appends the binary consensus layout of the operation body.
    fn encode(&self, buf: &mut Vec<u8>, protocol_version: u32);

    /// The JSON payload broadcast alongside [`Operation::name`].
    fn to_json(&self) -> serde_json::Value;
}

/// Upvote or downvote a post or comment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOperation {
    pub voter: String,
    pub author: String,
    pub permlink: String,
    /// Vote strength in basis points, `-10000..=10000`.
    pub weight: i16,
}

impl Operation for VoteOperation {
    fn name(&self) -> &'static str {
        "vote"
    }

    fn wire_id(&self, _protocol_version: u32) -> u8 {
        0
    }

    fn encode(&self, buf: &mut Vec<u8>, _protocol_version: u32) {
        codec::write_string(buf, &self.voter);
        codec::write_string(buf, &self.author);
        codec::write_string(buf, &self.permlink);
        buf.extend_from_slice(&self.weight.to_le_bytes());
    }

    fn to_json(&self) -> serde_json::Value {
        json!({
            "voter": self.voter,
            "author": self.author,
            "permlink": self.permlink,
            "weight": self.weight,
        })
    }
}

/// Move an asset from one account to another.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferOperation {
    pub from: String,
    pub to: String,
    pub amount: Asset,
    pub memo: String,
}

impl Operation for TransferOperation {
    fn name(&self) -> &'static str {
        "transfer"
    }

    fn wire_id(&self, _protocol_version: u32) -> u8 {
        2
    }

    fn encode(&self, buf: &mut Vec<u8>, _protocol_version: u32) {
        codec::write_string(buf, &self.from);
        codec::write_string(buf, &self.to);
        self.amount.encode(buf);
        codec::write_string(buf, &self.memo);
    }

    fn to_json(&self) -> serde_json::Value {
        json!({
            "from": self.from,
            "to": self.to,
            "amount": self.amount,
            "memo": self.memo,
        })
    }
}
