//! # Merkle Trees
//!
//! Binary Keccak-256 merkle trees over 32-byte leaves.

use crate::hashing::hash_concat;
use crate::CryptoError;
use shared_types::{Hash, ZERO_HASH};

/// Which side of the running hash a sibling sits on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Position {
    /// Sibling is hashed before the running hash.
    Left,
    /// Sibling is hashed after the running hash.
    Right,
}

/// One step of an inclusion proof.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProofNode {
    /// Sibling hash at this level.
    pub hash: Hash,
    /// Side the sibling sits on.
    pub position: Position,
}

fn next_level(level: &[Hash]) -> Vec<Hash> {
    level
        .chunks(2)
        .map(|chunk| {
            let left = &chunk[0];
            let right = chunk.get(1).unwrap_or(left); // Duplicate last if odd
            hash_concat(left, right)
        })
        .collect()
}

/// Compute the merkle root of `leaves`.
pub fn compute_merkle_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return ZERO_HASH;
    }

    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }
    level[0]
}

/// Build an inclusion proof for the leaf at `index`.
pub fn build_merkle_proof(leaves: &[Hash], index: usize) -> Result<Vec<ProofNode>, CryptoError> {
    if index >= leaves.len() {
        return Err(CryptoError::LeafOutOfRange {
            index,
            len: leaves.len(),
        });
    }

    let mut proof = Vec::new();
    let mut level = leaves.to_vec();
    let mut index = index;

    while level.len() > 1 {
        let node = if index % 2 == 0 {
            let sibling = level.get(index + 1).copied().unwrap_or(level[index]);
            ProofNode {
                hash: sibling,
                position: Position::Right,
            }
        } else {
            ProofNode {
                hash: level[index - 1],
                position: Position::Left,
            }
        };
        proof.push(node);
        level = next_level(&level);
        index /= 2;
    }

    Ok(proof)
}

/// Check that `leaf` is committed to by `expected_root` via `proof`.
pub fn verify_merkle_proof(leaf: &Hash, proof: &[ProofNode], expected_root: &Hash) -> bool {
    let computed = proof.iter().fold(*leaf, |current, node| match node.position {
        Position::Left => hash_concat(&node.hash, &current),
        Position::Right => hash_concat(&current, &node.hash),
    });
    computed == *expected_root
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_hash(n: u8) -> Hash {
        let mut h = [0u8; 32];
        h[0] = n;
        h
    }

    #[test]
    fn test_empty_root_is_zero() {
        assert_eq!(compute_merkle_root(&[]), ZERO_HASH);
    }

    #[test]
    fn test_single_leaf_is_root() {
        assert_eq!(compute_merkle_root(&[make_hash(7)]), make_hash(7));
    }

    #[test]
    fn test_odd_level_duplicates_last() {
        let (a, b, c) = (make_hash(1), make_hash(2), make_hash(3));
        let expected = hash_concat(&hash_concat(&a, &b), &hash_concat(&c, &c));
        assert_eq!(compute_merkle_root(&[a, b, c]), expected);
    }

    #[test]
    fn test_root_depends_on_order() {
        let (a, b) = (make_hash(1), make_hash(2));
        assert_ne!(compute_merkle_root(&[a, b]), compute_merkle_root(&[b, a]));
    }

    #[test]
    fn test_proofs_verify_for_every_leaf() {
        let leaves: Vec<Hash> = (0..7).map(make_hash).collect();
        let root = compute_merkle_root(&leaves);
        for (i, leaf) in leaves.iter().enumerate() {
            let proof = build_merkle_proof(&leaves, i).unwrap();
            assert!(verify_merkle_proof(leaf, &proof, &root), "leaf {i}");
        }
    }

    #[test]
    fn test_tampered_proof_fails() {
        let leaves: Vec<Hash> = (0..4).map(make_hash).collect();
        let root = compute_merkle_root(&leaves);
        let mut proof = build_merkle_proof(&leaves, 1).unwrap();
        proof[0].hash = make_hash(99);
        assert!(!verify_merkle_proof(&leaves[1], &proof, &root));
    }

    #[test]
    fn test_proof_index_out_of_range() {
        let leaves = vec![make_hash(1)];
        assert_eq!(
            build_merkle_proof(&leaves, 3),
            Err(CryptoError::LeafOutOfRange { index: 3, len: 1 })
        );
    }
}
