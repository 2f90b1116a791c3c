//! Anchor SPV proof library
//!
//! This crate builds and checks Simplified Payment Verification proofs that a
//! Bitcoin transaction is included in a specific block, using only double
//! SHA-256 Merkle inclusion and the raw block header.

pub mod assemble;
pub mod codec;
pub mod contract;
pub mod error;
pub mod header;
pub mod merkle;
pub mod proof;
pub mod serialize;
pub mod source;
pub mod tx;
pub mod validate;

pub use assemble::{AssemblerConfig, BlockRef, IntermediateNodesPolicy, MerkleProof, ProofAssembler};
pub use contract::ContractCall;
pub use error::{SpvError, TxParseError};
pub use header::RawHeader;
pub use proof::{ConfirmingHeader, SpvProof};
pub use source::{BlockHeaderInfo, BlockInfo, ChainDataSource, RawTransactionInfo};
pub use tx::{decode_transaction, TxSections};
pub use validate::validate_proof;
