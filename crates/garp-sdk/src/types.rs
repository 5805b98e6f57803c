//! Domain types decoded from node responses.
//!
//! RPC results are built field by field in `rpc::parsing`; REST payloads of
//! the bridge and chat services derive `serde` directly.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

// ==============================================================================
// Blocks & Transactions
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockInfo {
    pub slot: u64,
    pub hash: String,
    pub parent_hash: Option<String>,
    pub timestamp_ms: Option<i64>,
    pub leader: Option<String>,
    pub transactions: Option<Vec<BlockTx>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockTx {
    pub id: String,
    pub submitter: Option<String>,
    pub command_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransactionInfo {
    pub id: String,
    pub submitter: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<i64>,
    pub error: Option<String>,
}

/// Outcome of `simulateTransaction`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulationResult {
    pub ok: bool,
    pub logs: Option<Vec<String>>,
    pub error: Option<String>,
}

// ==============================================================================
// Balance
// ==============================================================================

/// A non-negative integer balance of arbitrary size.
///
/// Node balances may exceed `u64`, so the value is kept as its canonical
/// decimal text (no sign, no leading zeros). Serializes as a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Balance(String);

impl Balance {
    /// Parse a plain decimal integer. Rejects signs, fractions, exponents and
    /// surrounding whitespace.
    pub fn from_decimal_str(s: &str) -> Option<Self> {
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        let trimmed = s.trim_start_matches('0');
        if trimmed.is_empty() {
            Some(Self("0".to_owned()))
        } else {
            Some(Self(trimmed.to_owned()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The exact value if it fits in a `u128`.
    pub fn to_u128(&self) -> Option<u128> {
        self.0.parse().ok()
    }

    pub fn is_zero(&self) -> bool {
        self.0 == "0"
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Balance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_decimal_str(s).ok_or_else(|| format!("`{s}` is not a non-negative integer"))
    }
}

impl From<u64> for Balance {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl From<u128> for Balance {
    fn from(value: u128) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for Balance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

// ==============================================================================
// Bridge
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeTransferRequest {
    pub source_chain: String,
    pub source_tx_id: String,
    pub target_chain: String,
    pub amount: i64,
    pub source_address: String,
    pub target_address: String,
    pub asset_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetMappingRequest {
    pub source_asset_id: String,
    pub source_chain: String,
    pub target_asset_id: String,
    pub target_chain: String,
    pub conversion_rate: f64,
}

// ==============================================================================
// Chat
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMessage {
    pub sender: String,
    pub recipient: String,
    pub content_ciphertext: String,
    pub content_nonce: String,
}

/// Server acknowledgement for a stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    pub id: i64,
    pub hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub sender: String,
    pub recipient: String,
    pub content_ciphertext: String,
    pub content_nonce: String,
    pub hash: String,
    pub created_at: String,
    pub anchored: bool,
    #[serde(default)]
    pub block_hash: Option<String>,
    #[serde(default)]
    pub block_number: Option<i64>,
}

/// Filter for listing the conversation between `address` and `peer`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageQuery {
    pub address: String,
    pub peer: String,
    pub since: Option<String>,
    /// Ignored unless greater than zero.
    pub limit: Option<u32>,
}

/// Signaling envelope relayed to `to`'s stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub payload: BTreeMap<String, serde_json::Value>,
}
