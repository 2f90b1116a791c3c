//! Bitcoin transaction Merkle tree: root, inclusion branch and branch verification.
//!
//! At any level with an odd number of nodes the last node is paired with
//! itself. This is Bitcoin's historical rule and it is reproduced bit-exactly.
//! Known limitation: it lets two different transaction lists (one ending in a
//! duplicated pair) produce the same root (CVE-2012-2459). Callers must not
//! treat a root as identifying a unique transaction list.

use crate::codec::{hash256_pair, Hash256};
use crate::error::{Result, SpvError};

/// Compute the Merkle root over `leaves` (internal byte order)
pub fn build_root(leaves: &[Hash256]) -> Result<Hash256> {
    if leaves.is_empty() {
        return Err(SpvError::EmptyLeafSet);
    }

    let mut layer = leaves.to_vec();
    while layer.len() > 1 {
        layer = next_layer(&layer);
    }
    Ok(layer[0])
}

/// Collect the sibling hashes from the leaf at `index` up to, but excluding, the root.
///
/// The branch is ordered bottom to top and is empty for a single leaf.
pub fn build_branch(index: usize, leaves: &[Hash256]) -> Result<Vec<Hash256>> {
    if index >= leaves.len() {
        return Err(SpvError::IndexOutOfRange {
            index,
            leaf_count: leaves.len(),
        });
    }

    let mut branch = Vec::new();
    let mut layer = leaves.to_vec();
    let mut index = index;

    while layer.len() > 1 {
        let sibling = if index % 2 == 1 {
            index - 1
        } else {
            // The last node of an odd layer is its own sibling
            (index + 1).min(layer.len() - 1)
        };
        branch.push(layer[sibling]);

        layer = next_layer(&layer);
        index /= 2;
    }

    Ok(branch)
}

/// Fold `leaf` up through `branch` and compare the result with `root`.
///
/// Concatenation order at each step follows the parity of the current index.
pub fn verify(leaf: &Hash256, index: usize, branch: &[Hash256], root: &Hash256) -> bool {
    let mut current = *leaf;
    let mut index = index;

    for sibling in branch {
        current = if index % 2 == 0 {
            hash256_pair(&current, sibling)
        } else {
            hash256_pair(sibling, &current)
        };
        index /= 2;
    }

    current == *root
}

/// Concatenate branch hashes into the `intermediate_nodes` byte string
pub fn branch_to_intermediate_nodes(branch: &[Hash256]) -> Vec<u8> {
    branch.concat()
}

/// Split an `intermediate_nodes` byte string back into 32-byte hashes.
///
/// Returns `None` if the length is not a multiple of 32.
pub fn intermediate_nodes_to_branch(nodes: &[u8]) -> Option<Vec<Hash256>> {
    if nodes.len() % 32 != 0 {
        return None;
    }
    nodes
        .chunks_exact(32)
        .map(|chunk| chunk.try_into().ok())
        .collect()
}

fn next_layer(layer: &[Hash256]) -> Vec<Hash256> {
    layer
        .chunks(2)
        .map(|chunk| match chunk {
            [left, right] => hash256_pair(left, right),
            [last] => hash256_pair(last, last),
            _ => unreachable!("chunk size is at most 2"),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{display_to_internal, internal_to_display};
    use proptest::prelude::*;

    fn leaf(n: u8) -> Hash256 {
        [n; 32]
    }

    #[test]
    fn test_empty_leaf_set() {
        assert_eq!(build_root(&[]), Err(SpvError::EmptyLeafSet));
    }

    #[test]
    fn test_single_leaf() {
        let leaves = [leaf(7)];
        assert_eq!(build_root(&leaves).unwrap(), leaf(7));
        assert!(build_branch(0, &leaves).unwrap().is_empty());
        assert!(verify(&leaf(7), 0, &[], &leaf(7)));
    }

    #[test]
    fn test_index_out_of_range() {
        assert_eq!(
            build_branch(3, &[leaf(1), leaf(2), leaf(3)]),
            Err(SpvError::IndexOutOfRange {
                index: 3,
                leaf_count: 3
            })
        );
    }

    #[test]
    fn test_odd_level_duplication() {
        let (a, b, c) = (leaf(0xa), leaf(0xb), leaf(0xc));
        let expected = hash256_pair(&hash256_pair(&a, &b), &hash256_pair(&c, &c));
        assert_eq!(build_root(&[a, b, c]).unwrap(), expected);

        // The duplicated last leaf is its own sibling
        let branch = build_branch(2, &[a, b, c]).unwrap();
        assert_eq!(branch, vec![c, hash256_pair(&a, &b)]);
    }

    #[test]
    fn test_block_170_root() {
        // First block with a non-coinbase transaction
        let leaves = [
            display_to_internal("b1fea52486ce0c62bb442b530a3f0132b826c74e473d1f2c220bfa78111c5082")
                .unwrap(),
            display_to_internal("f4184fc596403b9d638783cf57adfe4c75c605f6356fbc91338530e9831e9e16")
                .unwrap(),
        ];
        let root = build_root(&leaves).unwrap();
        assert_eq!(
            internal_to_display(&root),
            "7dac2c5666815c17a3b36427de37bb9d2e2c5ccec3f8633eb91a4205cb4c10ff"
        );

        let branch = build_branch(1, &leaves).unwrap();
        assert_eq!(branch, vec![leaves[0]]);
        assert!(verify(&leaves[1], 1, &branch, &root));
        assert!(!verify(&leaves[1], 0, &branch, &root));
    }

    #[test]
    fn test_branch_length() {
        for (count, expected) in [(1, 0), (2, 1), (3, 2), (4, 2), (5, 3), (8, 3), (9, 4)] {
            let leaves: Vec<Hash256> = (0..count).map(|i| leaf(i as u8)).collect();
            assert_eq!(build_branch(0, &leaves).unwrap().len(), expected, "{count} leaves");
        }
    }

    #[test]
    fn test_intermediate_nodes() {
        let branch = vec![leaf(1), leaf(2)];
        let nodes = branch_to_intermediate_nodes(&branch);
        assert_eq!(nodes.len(), 64);
        assert_eq!(intermediate_nodes_to_branch(&nodes), Some(branch));
        assert_eq!(intermediate_nodes_to_branch(&[]), Some(vec![]));
        assert_eq!(intermediate_nodes_to_branch(&nodes[..40]), None);
    }

    proptest! {
        #[test]
        fn prop_branch_verifies_against_root(
            leaves in prop::collection::vec(any::<[u8; 32]>(), 1..40),
            seed in any::<usize>(),
        ) {
            let index = seed % leaves.len();
            let root = build_root(&leaves).unwrap();
            let branch = build_branch(index, &leaves).unwrap();
            prop_assert!(verify(&leaves[index], index, &branch, &root));
        }

        #[test]
        fn prop_tampered_branch_is_rejected(
            leaves in prop::collection::vec(any::<[u8; 32]>(), 2..40),
            seed in any::<usize>(),
            byte in 0usize..32,
        ) {
            let index = seed % leaves.len();
            let root = build_root(&leaves).unwrap();
            let mut branch = build_branch(index, &leaves).unwrap();
            let level = seed % branch.len();
            branch[level][byte] ^= 0x01;
            prop_assert!(!verify(&leaves[index], index, &branch, &root));
        }
    }
}
