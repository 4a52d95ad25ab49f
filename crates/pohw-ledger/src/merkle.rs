//! Binary Merkle trees over proof hashes.
//!
//! Leaves are taken in arrival order and paired `(0,1), (2,3), ...` at each
//! level. An odd trailing node is promoted unchanged to the next level —
//! never hashed with itself — so independent verifiers can reproduce every
//! root and proof from the leaf set alone.

use pohw_crypto::{hash, Hash};
use serde::{Deserialize, Serialize};

/// Position of a sibling relative to the node being proven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// One step of an inclusion proof: the sibling hash and which side of the
/// pair it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MerkleStep {
    pub sibling: Hash,
    pub side: Side,
}

fn hash_pair(left: &Hash, right: &Hash) -> Hash {
    let mut combined = [0u8; 64];
    combined[..32].copy_from_slice(left);
    combined[32..].copy_from_slice(right);
    hash(&combined)
}

fn next_level(level: &[Hash]) -> Vec<Hash> {
    let mut next = Vec::with_capacity(level.len().div_ceil(2));
    for chunk in level.chunks(2) {
        match chunk {
            [left, right] => next.push(hash_pair(left, right)),
            // Odd trailing node: promoted unchanged.
            [single] => next.push(*single),
            _ => unreachable!(),
        }
    }
    next
}

/// Compute the Merkle root of a leaf set.
///
/// Empty input yields the zero hash; a single leaf is its own root.
pub fn build_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return [0u8; 32];
    }
    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }
    level[0]
}

/// Collect the sibling hashes (bottom to top) proving inclusion of the leaf
/// at `index`. Returns `None` if the index is out of range.
///
/// Levels where the node is an odd promoted trailing node contribute no
/// step, matching the promotion rule in `build_root`.
pub fn inclusion_steps(leaves: &[Hash], index: usize) -> Option<Vec<MerkleStep>> {
    if index >= leaves.len() {
        return None;
    }
    let mut steps = Vec::new();
    let mut level = leaves.to_vec();
    let mut idx = index;
    while level.len() > 1 {
        let sibling_idx = idx ^ 1;
        if sibling_idx < level.len() {
            let side = if sibling_idx > idx {
                Side::Right
            } else {
                Side::Left
            };
            steps.push(MerkleStep {
                sibling: level[sibling_idx],
                side,
            });
        }
        idx /= 2;
        level = next_level(&level);
    }
    Some(steps)
}

/// Consumer-side verification: fold the proof steps with the leaf using the
/// same pairing rule and compare against the root.
pub fn verify_inclusion(leaf: &Hash, steps: &[MerkleStep], root: &Hash) -> bool {
    let mut acc = *leaf;
    for step in steps {
        acc = match step.side {
            Side::Left => hash_pair(&step.sibling, &acc),
            Side::Right => hash_pair(&acc, &step.sibling),
        };
    }
    acc == *root
}
