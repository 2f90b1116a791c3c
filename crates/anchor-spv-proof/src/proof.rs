//! The SPV proof record handed to the sidechain contract.
//!
//! Field names and hex encoding are a wire contract shared with remote
//! verifiers. Chain identifiers (`tx_id`, `hash`, `prevhash`, `merkle_root`)
//! are the byte-reversal of a node's display form, i.e. internal byte order.

use serde::{Deserialize, Serialize};

use crate::codec::Hash256;
use crate::serialize::{hex_bytes, hex_hash};
use crate::tx::TxSections;

/// Header of the block that includes the proven transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmingHeader {
    /// Raw 80-byte header
    #[serde(with = "hex_bytes")]
    pub raw: Vec<u8>,
    #[serde(with = "hex_hash")]
    pub hash: Hash256,
    pub height: u32,
    #[serde(with = "hex_hash")]
    pub prevhash: Hash256,
    #[serde(with = "hex_hash")]
    pub merkle_root: Hash256,
}

/// Self-contained proof that a transaction is included in a block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpvProof {
    #[serde(with = "hex_bytes")]
    pub version: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub vin: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub vout: Vec<u8>,
    #[serde(with = "hex_bytes")]
    pub locktime: Vec<u8>,
    /// Concatenated Merkle branch, bottom to top
    #[serde(with = "hex_bytes")]
    pub intermediate_nodes: Vec<u8>,
    /// Position of the transaction in the block
    pub index: u32,
    #[serde(with = "hex_hash")]
    pub tx_id: Hash256,
    pub confirming_header: ConfirmingHeader,
    pub confirming_height: u32,
}

impl SpvProof {
    /// Transaction sections carried by the proof
    pub fn sections(&self) -> TxSections {
        TxSections {
            version: self.version.clone(),
            vin: self.vin.clone(),
            vout: self.vout.clone(),
            locktime: self.locktime.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }
}
