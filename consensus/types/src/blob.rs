use crate::{
    Hash256, KzgCommitment, KzgProof, Slot, ValidatorIndex,
};
use serde::{Deserialize, Serialize};

/// Ordered commitments/proofs/blobs bundle returned alongside a locally-built payload
/// (spec.md §3: "BlobsBundle: ordered `{kzg_commitments[], proofs[], blobs[]}`").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlobsBundle {
    pub commitments: Vec<KzgCommitment>,
    pub proofs: Vec<KzgProof>,
    pub blobs: Vec<Vec<u8>>,
}

impl BlobsBundle {
    /// Invariant from spec.md §3: `len(kzg_commitments) = len(proofs) = len(blobs)`.
    pub fn lengths_agree(&self) -> bool {
        self.commitments.len() == self.proofs.len() && self.proofs.len() == self.blobs.len()
    }

    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

/// A single blob sidecar produced from a `BlobsBundle` per spec.md §4.8.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlobSidecar {
    pub block_root: Hash256,
    pub index: u64,
    pub slot: Slot,
    pub parent_root: Hash256,
    pub proposer_index: ValidatorIndex,
    pub blob: Vec<u8>,
    pub kzg_commitment: KzgCommitment,
    pub kzg_proof: KzgProof,
    /// Merkle proof of the commitment at `index` into the block body (spec.md §4.8). Built by
    /// an external merkleization primitive; stored verbatim here.
    pub commitment_inclusion_proof: Vec<Hash256>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agreeing_lengths() {
        let bundle = BlobsBundle {
            commitments: vec![[0u8; 48]],
            proofs: vec![[0u8; 48]],
            blobs: vec![vec![0u8; 4]],
        };
        assert!(bundle.lengths_agree());
    }

    #[test]
    fn disagreeing_lengths() {
        let bundle = BlobsBundle {
            commitments: vec![[0u8; 48], [1u8; 48]],
            proofs: vec![[0u8; 48]],
            blobs: vec![vec![0u8; 4]],
        };
        assert!(!bundle.lengths_agree());
    }
}
