//! Chain-data source consumed by the proof assembler.
//!
//! Hashes crossing this boundary are hex strings in display byte order, as a
//! Bitcoin node prints them.

use async_trait::async_trait;

use crate::error::Result;

/// Block contents relevant to proof construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockInfo {
    pub hash: String,
    pub height: u32,
    /// Transaction ids in block order
    pub tx_ids: Vec<String>,
    pub merkle_root: String,
}

/// Verbose `getrawtransaction` result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawTransactionInfo {
    /// Full serialized transaction, possibly with witness data
    pub hex: String,
    /// Containing block, `None` while the transaction is unconfirmed
    pub block_hash: Option<String>,
}

/// Verbose `getblockheader` result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeaderInfo {
    pub hash: String,
    pub height: u32,
    /// `None` for the genesis block
    pub previous_block_hash: Option<String>,
    pub merkle_root: String,
}

/// Source of Bitcoin chain data.
///
/// Every method fails with `SpvError::ChainDataUnavailable`. Retry, caching
/// and height provenance are the implementor's responsibility.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainDataSource: Send + Sync {
    async fn get_block_hash(&self, height: u32) -> Result<String>;

    async fn get_block(&self, block_hash: &str) -> Result<BlockInfo>;

    async fn get_raw_transaction(&self, txid: &str) -> Result<RawTransactionInfo>;

    async fn get_block_header(&self, block_hash: &str) -> Result<BlockHeaderInfo>;

    /// Non-verbose header: 80 raw bytes as hex
    async fn get_block_header_raw(&self, block_hash: &str) -> Result<String>;
}

#[async_trait]
impl<'a, T: ChainDataSource + ?Sized> ChainDataSource for &'a T {
    async fn get_block_hash(&self, height: u32) -> Result<String> {
        (**self).get_block_hash(height).await
    }

    async fn get_block(&self, block_hash: &str) -> Result<BlockInfo> {
        (**self).get_block(block_hash).await
    }

    async fn get_raw_transaction(&self, txid: &str) -> Result<RawTransactionInfo> {
        (**self).get_raw_transaction(txid).await
    }

    async fn get_block_header(&self, block_hash: &str) -> Result<BlockHeaderInfo> {
        (**self).get_block_header(block_hash).await
    }

    async fn get_block_header_raw(&self, block_hash: &str) -> Result<String> {
        (**self).get_block_header_raw(block_hash).await
    }
}
