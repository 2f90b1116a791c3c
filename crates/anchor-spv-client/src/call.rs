//! Hand a proof to the sidechain's contract-invocation interface.

use std::path::PathBuf;

use anchor_spv_proof::ContractCall;
use clap::Args;
use serde_json::Value;
use tracing::info;

use crate::fetch::load_proof;

/// CLI arguments for the `call` subcommand
#[derive(Clone, Debug, Args)]
pub struct CallArgs {
    /// Path to read the proof from
    #[arg(long)]
    proof_path: PathBuf,
    /// Identifier of the contract exposing `validateTxProof`
    #[arg(long)]
    contract_id: String,
    /// Contract invocation endpoint; the call is printed when omitted
    #[arg(long, env = "CONTRACT_ENDPOINT")]
    endpoint: Option<String>,
}

/// Run the `call` subcommand
pub async fn run(args: CallArgs) -> Result<(), anyhow::Error> {
    let proof = load_proof(&args.proof_path)?;
    let call = ContractCall::validate_tx_proof(args.contract_id, proof);

    match args.endpoint {
        Some(endpoint) => {
            let response = post_contract_call(&endpoint, &call).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        None => println!("{}", serde_json::to_string_pretty(&call)?),
    }
    Ok(())
}

/// POST a contract call as JSON and return the contract's JSON response
pub async fn post_contract_call(
    endpoint: &str,
    call: &ContractCall,
) -> Result<Value, anyhow::Error> {
    info!(
        "Invoking {} on contract {} ...",
        call.action, call.contract_id
    );
    let client = reqwest::Client::new();
    let response = client.post(endpoint).json(call).send().await?;
    match response.error_for_status() {
        Ok(res) => Ok(res.json().await?),
        Err(e) => Err(e.into()),
    }
}
