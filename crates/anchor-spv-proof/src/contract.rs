//! Envelope used to hand a proof to the sidechain contract-invocation interface.

use serde::{Deserialize, Serialize};

use crate::proof::SpvProof;

/// Contract action that consumes an SPV proof
pub const VALIDATE_TX_PROOF: &str = "validateTxProof";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofPayload {
    pub proof: SpvProof,
}

/// `{ contract_id, action, payload: { proof } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCall {
    #[serde(rename = "contractId")]
    pub contract_id: String,
    pub action: String,
    pub payload: ProofPayload,
}

impl ContractCall {
    pub fn validate_tx_proof(contract_id: impl Into<String>, proof: SpvProof) -> Self {
        Self {
            contract_id: contract_id.into(),
            action: VALIDATE_TX_PROOF.to_string(),
            payload: ProofPayload { proof },
        }
    }
}
