//! Builds SPV proofs from live chain data fetched through a `ChainDataSource`.

use tracing::{debug, info};

use crate::codec::{decode_hex, display_to_internal, internal_to_display, Hash256};
use crate::error::{Result, SpvError};
use crate::header::RawHeader;
use crate::merkle::{branch_to_intermediate_nodes, build_branch, build_root};
use crate::proof::{ConfirmingHeader, SpvProof};
use crate::source::{BlockInfo, ChainDataSource};
use crate::tx::decode_transaction;
use crate::validate::validate_proof;

/// How the Merkle branch is written into `intermediate_nodes`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IntermediateNodesPolicy {
    /// Empty iff the branch is empty, otherwise the concatenated branch
    #[default]
    Exact,
    /// Concatenate only when the branch has more than two hashes.
    ///
    /// Reproduces the legacy proof shape byte-for-byte. Proofs for blocks with
    /// two to four transactions come out unverifiable.
    LegacyThreshold,
}

impl IntermediateNodesPolicy {
    pub fn encode(&self, branch: &[Hash256]) -> Vec<u8> {
        match self {
            IntermediateNodesPolicy::Exact => branch_to_intermediate_nodes(branch),
            IntermediateNodesPolicy::LegacyThreshold if branch.len() > 2 => {
                branch_to_intermediate_nodes(branch)
            }
            IntermediateNodesPolicy::LegacyThreshold => Vec::new(),
        }
    }
}

/// Configuration parameters for proof construction
#[derive(Debug, Clone)]
pub struct AssemblerConfig {
    pub intermediate_nodes: IntermediateNodesPolicy,
    /// Validate every assembled proof before returning it
    pub verify: bool,
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            intermediate_nodes: IntermediateNodesPolicy::Exact,
            verify: true,
        }
    }
}

/// Block to search for a transaction, by height or by display-order hash
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockRef {
    Height(u32),
    Hash(String),
}

/// Position of a transaction in a block together with its Merkle branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerkleProof {
    pub branch: Vec<Hash256>,
    pub index: u32,
    pub block_hash: String,
    pub block_height: u32,
}

/// Assembles `SpvProof`s; owns nothing beyond the injected source between calls
pub struct ProofAssembler<S> {
    source: S,
    config: AssemblerConfig,
}

impl<S: ChainDataSource> ProofAssembler<S> {
    pub fn new(source: S, config: AssemblerConfig) -> Self {
        Self { source, config }
    }

    /// Locate `txid` in the referenced block and build its Merkle branch
    pub async fn merkle_proof(&self, txid: &str, block: BlockRef) -> Result<MerkleProof> {
        let block_hash = match block {
            BlockRef::Height(height) => self.source.get_block_hash(height).await?,
            BlockRef::Hash(hash) => hash,
        };
        let block = self.source.get_block(&block_hash).await?;
        locate_in_block(txid, &block)
    }

    /// Fetch everything needed and compose the proof for `txid` (display order hex)
    pub async fn assemble(&self, txid: &str) -> Result<SpvProof> {
        info!("Fetching transaction {} ...", txid);
        let tx_info = self.source.get_raw_transaction(txid).await?;
        let block_hash =
            tx_info
                .block_hash
                .ok_or_else(|| SpvError::TransactionNotInBlock {
                    txid: txid.to_string(),
                    block: "mempool".to_string(),
                })?;

        info!("Fetching block {} and its header ...", block_hash);
        let (block, header_info, header_hex) = tokio::try_join!(
            self.source.get_block(&block_hash),
            self.source.get_block_header(&block_hash),
            self.source.get_block_header_raw(&block_hash),
        )?;

        if block.height != header_info.height {
            return Err(SpvError::unavailable(
                "getblockheader",
                format!(
                    "block reports height {} but its header reports {}",
                    block.height, header_info.height
                ),
            ));
        }

        let MerkleProof { branch, index, .. } = locate_in_block(txid, &block)?;
        debug!(
            "Transaction {} is at index {} of {} with a {}-node branch",
            txid,
            index,
            block.tx_ids.len(),
            branch.len()
        );

        let sections = decode_transaction(&decode_hex(&tx_info.hex)?)?;
        let raw_header = RawHeader::from_hex(&header_hex)?;

        // Genesis has no previous block in the verbose header
        let prevhash = match &header_info.previous_block_hash {
            Some(hash) => display_to_internal(hash)?,
            None => raw_header.prev_hash(),
        };

        let proof = SpvProof {
            version: sections.version,
            vin: sections.vin,
            vout: sections.vout,
            locktime: sections.locktime,
            intermediate_nodes: self.config.intermediate_nodes.encode(&branch),
            index,
            tx_id: display_to_internal(txid)?,
            confirming_header: ConfirmingHeader {
                raw: raw_header.as_bytes().to_vec(),
                hash: display_to_internal(&header_info.hash)?,
                height: header_info.height,
                prevhash,
                merkle_root: display_to_internal(&header_info.merkle_root)?,
            },
            confirming_height: header_info.height,
        };

        if self.config.verify {
            info!("Verifying assembled proof ...");
            validate_proof(&proof)?;
        }

        Ok(proof)
    }
}

/// Find `txid` in `block` and build the branch over its little-endian leaves.
///
/// The transaction list must hash to the block's reported Merkle root.
fn locate_in_block(txid: &str, block: &BlockInfo) -> Result<MerkleProof> {
    let index = block
        .tx_ids
        .iter()
        .position(|id| id.eq_ignore_ascii_case(txid))
        .ok_or_else(|| SpvError::TransactionNotInBlock {
            txid: txid.to_string(),
            block: block.hash.clone(),
        })?;

    let leaves = block
        .tx_ids
        .iter()
        .map(|id| display_to_internal(id))
        .collect::<Result<Vec<_>>>()?;
    let root = build_root(&leaves)?;
    if root != display_to_internal(&block.merkle_root)? {
        return Err(SpvError::unavailable(
            "getblock",
            format!(
                "transaction ids of block {} hash to {} but the block reports {}",
                block.hash,
                internal_to_display(&root),
                block.merkle_root
            ),
        ));
    }
    let branch = build_branch(index, &leaves)?;

    Ok(MerkleProof {
        branch,
        index: index as u32,
        block_hash: block.hash.clone(),
        block_height: block.height,
    })
}
