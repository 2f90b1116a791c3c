//! CLI wrapper for the verify functionality

use std::path::{Path, PathBuf};

use anchor_spv_proof::{validate_proof, SpvProof};
use anyhow::Context;
use bitcoin::Network;
use clap::Args;
use tracing::info;

use crate::fetch::load_proof;
use crate::format::format_proof;

/// CLI arguments for the `verify` subcommand
#[derive(Clone, Debug, Args)]
pub struct VerifyArgs {
    /// Path to read the proof from
    #[arg(long)]
    proof_path: PathBuf,
    /// Network used to render output addresses
    #[arg(long, default_value = "bitcoin")]
    network: Network,
}

/// Run the `verify` subcommand: read a proof from disk, validate it and
/// display the proven transaction
pub async fn run(args: VerifyArgs) -> Result<(), anyhow::Error> {
    let proof = verify_proof_file(&args.proof_path)?;
    println!("{}", format_proof(&proof, args.network)?);
    Ok(())
}

/// Load a proof and check it offline; returns the proof if it is valid
pub fn verify_proof_file(proof_path: &Path) -> Result<SpvProof, anyhow::Error> {
    let proof = load_proof(proof_path)?;
    validate_proof(&proof)
        .with_context(|| format!("Proof in {} was rejected", proof_path.display()))?;
    info!(
        "Proof is valid: transaction at index {} of block at height {}",
        proof.index, proof.confirming_height
    );
    Ok(proof)
}
