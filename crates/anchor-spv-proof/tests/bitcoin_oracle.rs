//! Cross-checks against the `bitcoin` crate and real main-net data.

use anchor_spv_proof::codec::{decode_hex, display_to_internal, hash256, internal_to_display};
use anchor_spv_proof::merkle::{build_branch, build_root, verify};
use anchor_spv_proof::{decode_transaction, RawHeader};
use bitcoin::absolute::LockTime;
use bitcoin::hashes::Hash;
use bitcoin::transaction::Version;
use bitcoin::{
    Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxMerkleNode, TxOut, Txid, Witness,
};
use proptest::prelude::*;

const BLOCK_11_HEADER: &str = "010000000508085c47cc849eb80ea905cc7800a3be674ffc57263cf210c59d8d00000000112ba175a1e04b14ba9e7ea5f76ab640affeef5ec98173ac9799a852fa39add320cd6649ffff001d1e2de565";
const BLOCK_11_TXID: &str = "d3ad39fa52a89997ac7381c95eeffeaf40b66af7a57e9eba144be0a175a12b11";

#[test]
fn test_block_11_header() {
    let bytes = decode_hex(BLOCK_11_HEADER).unwrap();
    let header = RawHeader::from_bytes(&bytes).unwrap();
    let oracle: bitcoin::block::Header = bitcoin::consensus::deserialize(&bytes).unwrap();

    assert_eq!(
        internal_to_display(&header.hash()),
        oracle.block_hash().to_string()
    );
    assert_eq!(
        internal_to_display(&header.prev_hash()),
        oracle.prev_blockhash.to_string()
    );
    assert_eq!(
        internal_to_display(&header.merkle_root()),
        oracle.merkle_root.to_string()
    );
    assert_eq!(header.time(), oracle.time);
    assert_eq!(header.nonce(), oracle.nonce);

    // Block 11 holds only its coinbase, so the root is the txid itself
    let leaf = display_to_internal(BLOCK_11_TXID).unwrap();
    assert_eq!(build_root(&[leaf]).unwrap(), header.merkle_root());
    let branch = build_branch(0, &[leaf]).unwrap();
    assert!(branch.is_empty());
    assert!(verify(&leaf, 0, &branch, &header.merkle_root()));
}

fn transaction_strategy() -> impl Strategy<Value = Transaction> {
    let input = (
        any::<[u8; 32]>(),
        any::<u32>(),
        prop::collection::vec(any::<u8>(), 0..80),
        any::<u32>(),
        prop::collection::vec(prop::collection::vec(any::<u8>(), 0..40), 0..3),
    )
        .prop_map(|(txid, vout, script_sig, sequence, witness)| TxIn {
            previous_output: OutPoint {
                txid: Txid::from_byte_array(txid),
                vout,
            },
            script_sig: ScriptBuf::from_bytes(script_sig),
            sequence: Sequence(sequence),
            witness: Witness::from_slice(&witness),
        });
    let output = (0u64..2_100_000_000_000_000, prop::collection::vec(any::<u8>(), 0..300))
        .prop_map(|(value, script)| TxOut {
            value: Amount::from_sat(value),
            script_pubkey: ScriptBuf::from_bytes(script),
        });
    (
        1i32..3,
        prop::collection::vec(input, 1..6),
        prop::collection::vec(output, 1..6),
        any::<u32>(),
    )
        .prop_map(|(version, input, output, lock_time)| Transaction {
            version: Version(version),
            lock_time: LockTime::from_consensus(lock_time),
            input,
            output,
        })
}

proptest! {
    #[test]
    fn prop_decoded_sections_reproduce_txid(tx in transaction_strategy()) {
        let raw = bitcoin::consensus::serialize(&tx);
        let sections = decode_transaction(&raw).unwrap();
        prop_assert_eq!(
            internal_to_display(&sections.txid()),
            tx.compute_txid().to_string()
        );
        prop_assert_eq!(&sections.version, &raw[..4].to_vec());
        prop_assert_eq!(&sections.locktime, &raw[raw.len() - 4..].to_vec());
    }

    #[test]
    fn prop_root_matches_bitcoin_crate(
        txids in prop::collection::vec(any::<[u8; 32]>(), 1..64)
    ) {
        let ours = build_root(&txids).unwrap();
        let theirs = bitcoin::merkle_tree::calculate_root(
            txids.iter().map(|id| TxMerkleNode::from_byte_array(*id)),
        )
        .unwrap();
        prop_assert_eq!(ours, theirs.to_byte_array());
    }

    #[test]
    fn prop_hash256_matches_sha256d(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let theirs = bitcoin::hashes::sha256d::Hash::hash(&data);
        prop_assert_eq!(hash256(&data), theirs.to_byte_array());
    }
}
