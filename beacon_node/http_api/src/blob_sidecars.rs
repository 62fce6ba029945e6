use std::fmt;
use types::{BlobSidecar, BlobsBundle, Hash256, SignedBeaconBlock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobSidecarError {
    LengthMismatch,
    PreDeneb,
}

impl fmt::Display for BlobSidecarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobSidecarError::LengthMismatch => write!(f, "blobs bundle commitment/proof/blob lengths disagree"),
            BlobSidecarError::PreDeneb => write!(f, "block predates Deneb, no blob sidecars"),
        }
    }
}

impl std::error::Error for BlobSidecarError {}

/// Wraps a blobs bundle into one sidecar per blob (spec.md §4.8). `commitment_inclusion_proof`
/// is supplied by an external merkleization primitive (spec.md §1 scope note); here it is a
/// fixed-length placeholder since this crate has no SSZ Merkle proof generator.
pub fn construct_blob_sidecars(
    signed_block: &SignedBeaconBlock,
    block_root: Hash256,
    bundle: &BlobsBundle,
    inclusion_proof_for: impl Fn(usize) -> Vec<Hash256>,
) -> Result<Vec<BlobSidecar>, BlobSidecarError> {
    if !bundle.lengths_agree() {
        return Err(BlobSidecarError::LengthMismatch);
    }

    if !matches!(signed_block.message, types::BeaconBlock::Deneb(_)) {
        return Err(BlobSidecarError::PreDeneb);
    }

    let slot = signed_block.message.slot();
    let parent_root = signed_block.message.parent_root();
    let proposer_index = signed_block.message.proposer_index();

    Ok((0..bundle.len())
        .map(|i| BlobSidecar {
            block_root,
            index: i as u64,
            slot,
            parent_root,
            proposer_index,
            blob: bundle.blobs[i].clone(),
            kzg_commitment: bundle.commitments[i],
            kzg_proof: bundle.proofs[i],
            commitment_inclusion_proof: inclusion_proof_for(i),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::{
        BeaconBlock, BeaconBlockBodyDeneb, BeaconBlockDeneb, Eth1Data, Graffiti, SignatureBytes,
        Slot, SyncAggregate,
    };

    fn deneb_block(slot: Slot) -> SignedBeaconBlock {
        SignedBeaconBlock {
            message: BeaconBlock::Deneb(BeaconBlockDeneb {
                slot,
                proposer_index: 4,
                parent_root: Hash256::zero(),
                state_root: Hash256::zero(),
                body: BeaconBlockBodyDeneb {
                    randao_reveal: SignatureBytes::zero(),
                    eth1_data: Eth1Data {
                        deposit_root: Hash256::zero(),
                        deposit_count: 0,
                        block_hash: Hash256::zero(),
                    },
                    graffiti: Graffiti::zero(),
                    proposer_slashings: vec![],
                    attester_slashings: vec![],
                    attestations: vec![],
                    deposits: vec![],
                    voluntary_exits: vec![],
                    sync_aggregate: SyncAggregate {
                        sync_committee_bits: types::AggregationBits::with_capacity(0),
                        sync_committee_signature: SignatureBytes::zero(),
                    },
                    execution_payload: None,
                    execution_payload_header: None,
                    blob_kzg_commitments: vec![[0u8; 48]],
                },
            }),
            signature: SignatureBytes::zero(),
        }
    }

    #[test]
    fn produces_one_sidecar_per_blob() {
        let block = deneb_block(Slot::new(10));
        let bundle = BlobsBundle {
            commitments: vec![[1u8; 48], [2u8; 48]],
            proofs: vec![[3u8; 48], [4u8; 48]],
            blobs: vec![vec![0u8; 4], vec![1u8; 4]],
        };
        let sidecars = construct_blob_sidecars(&block, Hash256::zero(), &bundle, |_| vec![]).unwrap();
        assert_eq!(sidecars.len(), 2);
        assert_eq!(sidecars[0].index, 0);
        assert_eq!(sidecars[1].index, 1);
        assert_eq!(sidecars[1].kzg_commitment, [2u8; 48]);
    }

    #[test]
    fn rejects_length_mismatch() {
        let block = deneb_block(Slot::new(10));
        let bundle = BlobsBundle {
            commitments: vec![[1u8; 48], [2u8; 48]],
            proofs: vec![[3u8; 48]],
            blobs: vec![vec![0u8; 4]],
        };
        let result = construct_blob_sidecars(&block, Hash256::zero(), &bundle, |_| vec![]);
        assert_eq!(result.unwrap_err(), BlobSidecarError::LengthMismatch);
    }

    #[test]
    fn rejects_pre_deneb_block() {
        let block = SignedBeaconBlock {
            message: BeaconBlock::Capella(types::BeaconBlockCapella {
                slot: Slot::new(10),
                proposer_index: 4,
                parent_root: Hash256::zero(),
                state_root: Hash256::zero(),
                body: types::BeaconBlockBodyCapella {
                    randao_reveal: SignatureBytes::zero(),
                    eth1_data: Eth1Data {
                        deposit_root: Hash256::zero(),
                        deposit_count: 0,
                        block_hash: Hash256::zero(),
                    },
                    graffiti: Graffiti::zero(),
                    proposer_slashings: vec![],
                    attester_slashings: vec![],
                    attestations: vec![],
                    deposits: vec![],
                    voluntary_exits: vec![],
                    sync_aggregate: SyncAggregate {
                        sync_committee_bits: types::AggregationBits::with_capacity(0),
                        sync_committee_signature: SignatureBytes::zero(),
                    },
                    execution_payload: None,
                    execution_payload_header: None,
                },
            }),
            signature: SignatureBytes::zero(),
        };
        let bundle = BlobsBundle::default();
        let result = construct_blob_sidecars(&block, Hash256::zero(), &bundle, |_| vec![]);
        assert_eq!(result.unwrap_err(), BlobSidecarError::PreDeneb);
    }
}
