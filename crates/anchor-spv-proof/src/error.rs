//! Error taxonomy shared by proof construction and proof validation.

use thiserror::Error;

/// Errors produced while building or validating an SPV proof.
///
/// Every variant is terminal for the proof operation in progress.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpvError {
    /// Hex input is not well formed or has an unexpected length
    #[error("Malformed hex: {0}")]
    MalformedHex(String),
    /// Raw transaction bytes could not be split into sections
    #[error("Failed to parse transaction: {0}")]
    TxParse(#[from] TxParseError),
    /// Merkle root requested for an empty leaf set
    #[error("Cannot build a Merkle tree from an empty leaf set")]
    EmptyLeafSet,
    /// Merkle branch requested for a leaf that does not exist
    #[error("Leaf index {index} is out of range for {leaf_count} leaves")]
    IndexOutOfRange { index: usize, leaf_count: usize },
    /// The transaction is unconfirmed or absent from the block
    #[error("Transaction {txid} is not in block {block}")]
    TransactionNotInBlock { txid: String, block: String },
    /// The chain-data source failed to answer
    #[error("Chain data unavailable ({method}): {reason}")]
    ChainDataUnavailable { method: String, reason: String },
    /// Raw block header is not 80 bytes long
    #[error("Invalid block header length: expected 80 bytes, got {0}")]
    InvalidHeaderLength(usize),
    /// Transaction sections do not hash to the claimed transaction id
    #[error("Transaction id mismatch: computed {computed}, claimed {claimed}")]
    TxIdMismatch { computed: String, claimed: String },
    /// Raw header does not hash to the claimed header hash
    #[error("Header hash mismatch: computed {computed}, claimed {claimed}")]
    HeaderHashMismatch { computed: String, claimed: String },
    /// A structured header field disagrees with the raw header
    #[error("Header field `{field}` mismatch: raw header has {expected}, proof has {actual}")]
    HeaderFieldMismatch {
        field: &'static str,
        expected: String,
        actual: String,
    },
    /// Merkle branch does not connect the transaction to the header's Merkle root
    #[error("Merkle inclusion check failed for index {index}")]
    MerkleInclusionFailed { index: u32 },
}

impl SpvError {
    /// Shorthand for a chain-data source failure
    pub fn unavailable(method: &str, reason: impl ToString) -> Self {
        Self::ChainDataUnavailable {
            method: method.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True if the error means "proof rejected" rather than "proof could not be processed"
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            SpvError::TxIdMismatch { .. }
                | SpvError::HeaderHashMismatch { .. }
                | SpvError::HeaderFieldMismatch { .. }
                | SpvError::MerkleInclusionFailed { .. }
        )
    }
}

/// Reasons a raw transaction byte stream is rejected by the decoder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxParseError {
    #[error("transaction is {0} bytes, shorter than the minimum encoding")]
    TooShort(usize),
    #[error("unexpected end of data at offset {offset}: needed {needed} more bytes")]
    InsufficientBytes { offset: usize, needed: usize },
    #[error("invalid input count {0}")]
    InvalidInputCount(u64),
    #[error("invalid output count {0}")]
    InvalidOutputCount(u64),
    #[error("invalid segwit flag {0:#04x}")]
    InvalidSegwitFlag(u8),
    #[error("{0} unexpected trailing bytes after locktime")]
    TrailingBytes(usize),
}

pub type Result<T, E = SpvError> = std::result::Result<T, E>;
