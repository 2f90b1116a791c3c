//! Bitcoin RPC client for fetching blocks, headers and transactions with retry logic.
//!
//! Implements [`ChainDataSource`] so it can be injected into a
//! [`anchor_spv_proof::ProofAssembler`].

use std::str::FromStr;
use std::time::Duration;

use anchor_spv_proof::{
    BlockHeaderInfo, BlockInfo, ChainDataSource, RawTransactionInfo, SpvError,
};
use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use bitcoin::{BlockHash, TxMerkleNode, Txid};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ArrayParams;
use jsonrpsee::http_client::{HeaderMap, HeaderValue, HttpClient};
use jsonrpsee::rpc_params;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Error types for Bitcoin RPC client operations
#[derive(Error, Debug)]
pub enum BitcoinClientError {
    /// RPC client errors
    #[error("RPC client error: {0}")]
    RpcClient(#[from] jsonrpsee::core::client::Error),
    /// Invalid HTTP header value
    #[error("Invalid HTTP header value")]
    InvalidHeader,
    /// Response carried a header that is not 80 bytes of hex
    #[error("Malformed block header response: {0}")]
    MalformedHeader(String),
}

/// Default HTTP request timeout
pub const HTTP_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound on the total time spent retrying a single request
pub const MAX_RETRY_ELAPSED: Duration = Duration::from_secs(60);

/// Verbose `getblock` result, reduced to the fields proofs need
#[derive(Debug, Clone, Deserialize)]
pub struct VerboseBlock {
    pub hash: BlockHash,
    pub height: u32,
    pub merkleroot: TxMerkleNode,
    pub tx: Vec<Txid>,
}

/// Verbose `getblockheader` result, reduced to the fields proofs need
#[derive(Debug, Clone, Deserialize)]
pub struct VerboseBlockHeader {
    pub hash: BlockHash,
    pub height: u32,
    pub merkleroot: TxMerkleNode,
    pub previousblockhash: Option<BlockHash>,
}

/// Verbose `getrawtransaction` result, reduced to the fields proofs need
#[derive(Debug, Clone, Deserialize)]
pub struct VerboseTransaction {
    pub txid: Txid,
    pub hex: String,
    pub blockhash: Option<BlockHash>,
}

/// Bitcoin RPC client
pub struct BitcoinClient {
    client: HttpClient,
    backoff: backoff::ExponentialBackoff,
}

impl BitcoinClient {
    /// Create a new Bitcoin RPC client with default retry settings (exponential backoff)
    pub fn new(url: String, userpwd: Option<String>) -> Result<Self, BitcoinClientError> {
        let mut headers = HeaderMap::new();
        if let Some(userpwd) = userpwd {
            let creds = general_purpose::STANDARD.encode(userpwd);
            headers.insert(
                "Authorization",
                HeaderValue::from_str(&format!("Basic {creds}"))
                    .map_err(|_| BitcoinClientError::InvalidHeader)?,
            );
        };

        let client = HttpClient::builder()
            .set_headers(headers)
            .request_timeout(HTTP_REQUEST_TIMEOUT)
            .build(url)?;

        let backoff = backoff::ExponentialBackoff {
            max_elapsed_time: Some(MAX_RETRY_ELAPSED),
            ..Default::default()
        };

        Ok(Self { client, backoff })
    }

    /// Replace the retry policy
    pub fn with_backoff(mut self, backoff: backoff::ExponentialBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: ArrayParams,
    ) -> Result<T, BitcoinClientError> {
        request_with_retry(self.backoff.clone(), || async {
            self.client
                .request(method, params.clone())
                .await
                .map_err(Into::into)
        })
        .await
    }

    /// Get block hash by height
    pub async fn get_block_hash(&self, height: u32) -> Result<BlockHash, BitcoinClientError> {
        self.request("getblockhash", rpc_params![height]).await
    }

    /// Get block with the ordered list of its transaction ids
    pub async fn get_block(&self, hash: &BlockHash) -> Result<VerboseBlock, BitcoinClientError> {
        self.request("getblock", rpc_params![hash.to_string(), 1])
            .await
    }

    /// Get block header by hash with extended data
    pub async fn get_block_header_ex(
        &self,
        hash: &BlockHash,
    ) -> Result<VerboseBlockHeader, BitcoinClientError> {
        self.request("getblockheader", rpc_params![hash.to_string(), true])
            .await
    }

    /// Get the raw 80-byte block header as hex
    pub async fn get_block_header_hex(
        &self,
        hash: &BlockHash,
    ) -> Result<String, BitcoinClientError> {
        let header: String = self
            .request("getblockheader", rpc_params![hash.to_string(), false])
            .await?;
        match hex::decode(&header) {
            Ok(bytes) if bytes.len() == 80 => Ok(header),
            Ok(bytes) => Err(BitcoinClientError::MalformedHeader(format!(
                "{} bytes",
                bytes.len()
            ))),
            Err(err) => Err(BitcoinClientError::MalformedHeader(err.to_string())),
        }
    }

    /// Get transaction by txid together with the hash of its containing block
    pub async fn get_transaction(
        &self,
        txid: &Txid,
    ) -> Result<VerboseTransaction, BitcoinClientError> {
        self.request("getrawtransaction", rpc_params![txid.to_string(), true])
            .await
    }

    /// Get current chain height
    pub async fn get_block_count(&self) -> Result<u32, BitcoinClientError> {
        let result: u64 = self.request("getblockcount", rpc_params![]).await?;
        Ok(result as u32)
    }
}

#[async_trait]
impl ChainDataSource for BitcoinClient {
    async fn get_block_hash(&self, height: u32) -> Result<String, SpvError> {
        let hash = BitcoinClient::get_block_hash(self, height)
            .await
            .map_err(unavailable("getblockhash"))?;
        Ok(hash.to_string())
    }

    async fn get_block(&self, block_hash: &str) -> Result<BlockInfo, SpvError> {
        let hash = parse_hash::<BlockHash>(block_hash)?;
        let block = BitcoinClient::get_block(self, &hash)
            .await
            .map_err(unavailable("getblock"))?;
        debug!("Block {} has {} transactions", block.hash, block.tx.len());
        Ok(BlockInfo {
            hash: block.hash.to_string(),
            height: block.height,
            tx_ids: block.tx.iter().map(ToString::to_string).collect(),
            merkle_root: block.merkleroot.to_string(),
        })
    }

    async fn get_raw_transaction(&self, txid: &str) -> Result<RawTransactionInfo, SpvError> {
        let txid = parse_hash::<Txid>(txid)?;
        let tx = self
            .get_transaction(&txid)
            .await
            .map_err(unavailable("getrawtransaction"))?;
        Ok(RawTransactionInfo {
            hex: tx.hex,
            block_hash: tx.blockhash.map(|hash| hash.to_string()),
        })
    }

    async fn get_block_header(&self, block_hash: &str) -> Result<BlockHeaderInfo, SpvError> {
        let hash = parse_hash::<BlockHash>(block_hash)?;
        let header = self
            .get_block_header_ex(&hash)
            .await
            .map_err(unavailable("getblockheader"))?;
        Ok(BlockHeaderInfo {
            hash: header.hash.to_string(),
            height: header.height,
            previous_block_hash: header.previousblockhash.map(|hash| hash.to_string()),
            merkle_root: header.merkleroot.to_string(),
        })
    }

    async fn get_block_header_raw(&self, block_hash: &str) -> Result<String, SpvError> {
        let hash = parse_hash::<BlockHash>(block_hash)?;
        self.get_block_header_hex(&hash)
            .await
            .map_err(unavailable("getblockheader"))
    }
}

fn unavailable(method: &'static str) -> impl FnOnce(BitcoinClientError) -> SpvError {
    move |err| SpvError::unavailable(method, err)
}

fn parse_hash<T: FromStr>(s: &str) -> Result<T, SpvError>
where
    T::Err: std::fmt::Display,
{
    T::from_str(s).map_err(|err| SpvError::MalformedHex(format!("{err}: {s}")))
}

/// Execute a request with retry logic using exponential backoff
/// Only retries on unexpected HTTP errors (not 200 OK or 400 Bad Request)
async fn request_with_retry<F, Fut, T>(
    backoff: backoff::ExponentialBackoff,
    operation: F,
) -> Result<T, BitcoinClientError>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T, BitcoinClientError>>,
{
    use backoff::{future::retry_notify, Error};

    retry_notify(
        backoff,
        || async {
            match operation().await {
                Ok(result) => Ok(result),
                Err(err) => {
                    if is_retryable_error(&err) {
                        Err(Error::transient(err))
                    } else {
                        Err(Error::permanent(err))
                    }
                }
            }
        },
        |err, duration| {
            info!("Request failed, retrying in {:?}: {}", duration, err);
        },
    )
    .await
}

/// Determines if an error should be retried - only retry HTTP errors (except bad request)
fn is_retryable_error(err: &BitcoinClientError) -> bool {
    match err {
        BitcoinClientError::RpcClient(rpc_err) => {
            use jsonrpsee::core::client::Error as RpcError;
            match rpc_err {
                RpcError::Transport(_) => true,
                RpcError::RequestTimeout => true,
                RpcError::RestartNeeded(_) => true,
                RpcError::ServiceDisconnect => true,
                // JSON-RPC level errors (unknown txid, bad params) are final
                _ => false,
            }
        }
        _ => false,
    }
}
