//! Functions to fetch all components required to construct an SPV proof
//! from a Bitcoin node.

use std::path::{Path, PathBuf};

use anchor_bitcoin_client::BitcoinClient;
use anchor_spv_proof::{AssemblerConfig, IntermediateNodesPolicy, ProofAssembler, SpvProof};
use anyhow::Context;
use bitcoin::Txid;
use tracing::{info, warn};

/// CLI arguments for the `fetch` subcommand
#[derive(Clone, Debug, clap::Args)]
pub struct FetchArgs {
    /// Transaction ID
    #[arg(long)]
    txid: Txid,
    /// Path to save the proof
    #[arg(long)]
    proof_path: PathBuf,
    /// Bitcoin RPC URL
    #[arg(long, env = "BITCOIN_RPC")]
    bitcoin_rpc_url: String,
    /// Bitcoin RPC user:password (optional)
    #[arg(long, env = "USERPWD")]
    bitcoin_rpc_userpwd: Option<String>,
    /// Leave intermediate nodes empty for branches of two hashes or fewer
    #[arg(long, default_value = "false")]
    legacy_intermediate_nodes: bool,
    /// Skip validating the proof before saving it
    #[arg(long, default_value = "false")]
    no_verify: bool,
}

impl FetchArgs {
    fn assembler_config(&self) -> AssemblerConfig {
        let intermediate_nodes = if self.legacy_intermediate_nodes {
            IntermediateNodesPolicy::LegacyThreshold
        } else {
            IntermediateNodesPolicy::Exact
        };
        AssemblerConfig {
            intermediate_nodes,
            verify: !self.no_verify,
        }
    }
}

/// Run the `fetch` subcommand: build a proof and write it to disk
///
/// Returns an error if any network request fails, the proof does not
/// validate, or the proof cannot be written to the specified path.
pub async fn run(args: FetchArgs) -> Result<(), anyhow::Error> {
    let config = args.assembler_config();
    let proof = fetch_proof(
        args.txid,
        args.bitcoin_rpc_url,
        args.bitcoin_rpc_userpwd,
        config,
    )
    .await?;

    save_proof(&proof, &args.proof_path)?;
    info!("Proof saved to {}", args.proof_path.display());

    Ok(())
}

/// Fetch the components of an SPV proof for `txid` from a Bitcoin node
pub async fn fetch_proof(
    txid: Txid,
    bitcoin_rpc_url: String,
    bitcoin_rpc_userpwd: Option<String>,
    config: AssemblerConfig,
) -> Result<SpvProof, anyhow::Error> {
    let bitcoin_client = BitcoinClient::new(bitcoin_rpc_url, bitcoin_rpc_userpwd)?;
    let assembler = ProofAssembler::new(&bitcoin_client, config);
    let proof = assembler
        .assemble(&txid.to_string())
        .await
        .with_context(|| format!("Failed to build proof for {txid}"))?;

    // Confirmation count is informational only
    match bitcoin_client.get_block_count().await {
        Ok(chain_height) => info!(
            "Transaction {} confirmed at height {} ({} confirmations)",
            txid,
            proof.confirming_height,
            chain_height.saturating_sub(proof.confirming_height) + 1
        ),
        Err(err) => warn!(
            "Transaction {} confirmed at height {}; chain height unavailable: {}",
            txid, proof.confirming_height, err
        ),
    }

    Ok(proof)
}

/// Save a proof to disk as pretty-printed JSON
///
/// Missing parent directories are created.
pub fn save_proof(proof: &SpvProof, proof_path: &Path) -> Result<(), anyhow::Error> {
    if let Some(parent) = proof_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(proof_path, proof.to_json()?)
        .with_context(|| format!("Failed to write proof to {}", proof_path.display()))?;
    Ok(())
}

/// Load a proof previously written by [`save_proof`]
pub fn load_proof(proof_path: &Path) -> Result<SpvProof, anyhow::Error> {
    let json = std::fs::read_to_string(proof_path)
        .with_context(|| format!("Failed to read proof from {}", proof_path.display()))?;
    let proof = SpvProof::from_json(&json)
        .with_context(|| format!("Malformed proof in {}", proof_path.display()))?;
    Ok(proof)
}
