//! All-or-nothing validation of an SPV proof record.

use tracing::debug;

use crate::codec::encode_hex;
use crate::error::{Result, SpvError};
use crate::header::RawHeader;
use crate::merkle::{intermediate_nodes_to_branch, verify};
use crate::proof::SpvProof;

/// Validate `proof`, returning the first failed check.
///
/// 1. The transaction sections hash to `tx_id`.
/// 2. `confirming_header.raw` hashes to `confirming_header.hash`.
/// 3. `merkle_root`, `prevhash` and `confirming_height` agree with the header.
/// 4. `intermediate_nodes` connects `tx_id` at `index` to the Merkle root.
///
/// Known limitation: only the low `depth` bits of `index` are authenticated,
/// where `depth` is the number of branch hashes. Higher bits are never read,
/// so with an empty branch any `index` is accepted. Consumers that need the
/// exact position must bound `index` by the block's transaction count.
pub fn validate_proof(proof: &SpvProof) -> Result<()> {
    let computed = proof.sections().txid();
    if computed != proof.tx_id {
        return Err(SpvError::TxIdMismatch {
            computed: encode_hex(&computed),
            claimed: encode_hex(&proof.tx_id),
        });
    }

    let header = &proof.confirming_header;
    let raw = RawHeader::from_bytes(&header.raw)?;
    let computed = raw.hash();
    if computed != header.hash {
        return Err(SpvError::HeaderHashMismatch {
            computed: encode_hex(&computed),
            claimed: encode_hex(&header.hash),
        });
    }

    check_field("merkle_root", &raw.merkle_root(), &header.merkle_root)?;
    check_field("prevhash", &raw.prev_hash(), &header.prevhash)?;
    if proof.confirming_height != header.height {
        return Err(SpvError::HeaderFieldMismatch {
            field: "confirming_height",
            expected: header.height.to_string(),
            actual: proof.confirming_height.to_string(),
        });
    }

    let inclusion_failed = SpvError::MerkleInclusionFailed { index: proof.index };
    let branch =
        intermediate_nodes_to_branch(&proof.intermediate_nodes).ok_or(inclusion_failed.clone())?;
    if !verify(
        &proof.tx_id,
        proof.index as usize,
        &branch,
        &header.merkle_root,
    ) {
        return Err(inclusion_failed);
    }

    debug!(
        "Proof for tx {} at index {} is valid",
        encode_hex(&proof.tx_id),
        proof.index
    );
    Ok(())
}

fn check_field(field: &'static str, expected: &[u8; 32], actual: &[u8; 32]) -> Result<()> {
    if expected != actual {
        return Err(SpvError::HeaderFieldMismatch {
            field,
            expected: encode_hex(expected),
            actual: encode_hex(actual),
        });
    }
    Ok(())
}
