use crate::{Address, ExecutionBlockHash, Hash256, KzgCommitment, Uint256};
use serde::{Deserialize, Serialize};
use superstruct::superstruct;

/// A single execution-layer withdrawal, carried in payload bodies from Capella onwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub index: u64,
    pub validator_index: crate::ValidatorIndex,
    pub address: Address,
    pub amount: crate::Gwei,
}

/// An execution-layer block, opaque to the core except for the fields named in spec.md §3.
///
/// Variants track the forks that changed the payload's shape: Capella added `withdrawals`,
/// Deneb added the blob-gas accounting fields that accompany `blob_kzg_commitments` in the
/// block body (the commitments themselves live on `BeaconBlockBody`, not here).
#[superstruct(
    variants(Bellatrix, Capella, Deneb),
    variant_attributes(derive(Debug, Clone, PartialEq, Serialize, Deserialize)),
)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub struct ExecutionPayload {
    pub parent_hash: ExecutionBlockHash,
    pub fee_recipient: Address,
    pub state_root: Hash256,
    pub receipts_root: Hash256,
    pub logs_bloom: Vec<u8>,
    pub prev_randao: Hash256,
    pub block_number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Vec<u8>,
    pub base_fee_per_gas: Uint256,
    pub block_hash: ExecutionBlockHash,
    /// Transactions as opaque RLP blobs; the core never decodes them (spec.md §1 scope note).
    pub transactions: Vec<Vec<u8>>,
    #[superstruct(only(Capella, Deneb))]
    pub withdrawals: Vec<Withdrawal>,
    #[superstruct(only(Deneb))]
    pub blob_gas_used: u64,
    #[superstruct(only(Deneb))]
    pub excess_blob_gas: u64,
}

impl ExecutionPayload {
    /// True iff this payload carries no transactions and a zero block number, the "empty but
    /// well-formed payload" `setLocalPayload` returns before the activation epoch (spec.md §4.3
    /// step 2).
    pub fn is_default_with_empty_roots(&self) -> bool {
        self.transactions().is_empty() && self.block_number() == 0
    }

    /// SSZ root of the payload's `withdrawals` list, used in the Capella+ builder tie-break
    /// (spec.md §4.2 step 2, §8 invariant). Hashing is delegated to an external primitive in a
    /// full node; here it is a stable content hash suitable for equality comparison in tests and
    /// fakes.
    pub fn withdrawals_root(&self) -> Option<Hash256> {
        match self {
            ExecutionPayload::Bellatrix(_) => None,
            ExecutionPayload::Capella(p) => Some(withdrawals_list_root(&p.withdrawals)),
            ExecutionPayload::Deneb(p) => Some(withdrawals_list_root(&p.withdrawals)),
        }
    }
}

/// Placeholder content hash standing in for the external SSZ-hashing primitive (out of scope,
/// spec.md §1). Deterministic and order-sensitive, which is all the tie-break comparison needs.
fn withdrawals_list_root(withdrawals: &[Withdrawal]) -> Hash256 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    for w in withdrawals {
        w.index.hash(&mut hasher);
        w.validator_index.hash(&mut hasher);
        w.address.as_bytes().hash(&mut hasher);
        w.amount.hash(&mut hasher);
    }
    let digest = hasher.finish();
    let mut bytes = [0u8; 32];
    bytes[..8].copy_from_slice(&digest.to_le_bytes());
    Hash256::from(bytes)
}

/// An execution-layer block *header*, as returned by an external builder in the blinded-block
/// flow (spec.md §4.5, GLOSSARY "Blinded block").
#[superstruct(
    variants(Bellatrix, Capella, Deneb),
    variant_attributes(derive(Debug, Clone, PartialEq, Serialize, Deserialize)),
)]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub struct ExecutionPayloadHeader {
    pub parent_hash: ExecutionBlockHash,
    pub fee_recipient: Address,
    pub state_root: Hash256,
    pub receipts_root: Hash256,
    pub logs_bloom: Vec<u8>,
    pub prev_randao: Hash256,
    pub block_number: u64,
    pub gas_limit: u64,
    pub gas_used: u64,
    pub timestamp: u64,
    pub extra_data: Vec<u8>,
    pub base_fee_per_gas: Uint256,
    pub block_hash: ExecutionBlockHash,
    pub transactions_root: Hash256,
    #[superstruct(only(Capella, Deneb))]
    pub withdrawals_root: Hash256,
    #[superstruct(only(Deneb))]
    pub blob_kzg_commitments_root: Hash256,
    /// Opaque KZG commitments advertised by the builder so the proposer can place them in the
    /// body without fetching blobs (Deneb builder flow).
    #[superstruct(only(Deneb))]
    pub blob_kzg_commitments: Vec<KzgCommitment>,
}

impl ExecutionPayloadHeader {
    /// `withdrawals_root` if this fork carries one, for the same Capella+ tie-break comparison as
    /// `ExecutionPayload::withdrawals_root` (spec.md §4.2 step 2).
    pub fn withdrawals_root(&self) -> Option<Hash256> {
        match self {
            ExecutionPayloadHeader::Bellatrix(_) => None,
            ExecutionPayloadHeader::Capella(h) => Some(h.withdrawals_root),
            ExecutionPayloadHeader::Deneb(h) => Some(h.withdrawals_root),
        }
    }
}

impl<'a> From<&'a ExecutionPayload> for ExecutionPayloadHeader {
    fn from(payload: &'a ExecutionPayload) -> Self {
        match payload {
            ExecutionPayload::Bellatrix(p) => ExecutionPayloadHeader::Bellatrix(
                ExecutionPayloadHeaderBellatrix {
                    parent_hash: p.parent_hash,
                    fee_recipient: p.fee_recipient,
                    state_root: p.state_root,
                    receipts_root: p.receipts_root,
                    logs_bloom: p.logs_bloom.clone(),
                    prev_randao: p.prev_randao,
                    block_number: p.block_number,
                    gas_limit: p.gas_limit,
                    gas_used: p.gas_used,
                    timestamp: p.timestamp,
                    extra_data: p.extra_data.clone(),
                    base_fee_per_gas: p.base_fee_per_gas,
                    block_hash: p.block_hash,
                    transactions_root: Hash256::zero(),
                },
            ),
            ExecutionPayload::Capella(p) => {
                ExecutionPayloadHeader::Capella(ExecutionPayloadHeaderCapella {
                    parent_hash: p.parent_hash,
                    fee_recipient: p.fee_recipient,
                    state_root: p.state_root,
                    receipts_root: p.receipts_root,
                    logs_bloom: p.logs_bloom.clone(),
                    prev_randao: p.prev_randao,
                    block_number: p.block_number,
                    gas_limit: p.gas_limit,
                    gas_used: p.gas_used,
                    timestamp: p.timestamp,
                    extra_data: p.extra_data.clone(),
                    base_fee_per_gas: p.base_fee_per_gas,
                    block_hash: p.block_hash,
                    transactions_root: Hash256::zero(),
                    withdrawals_root: withdrawals_list_root(&p.withdrawals),
                })
            }
            ExecutionPayload::Deneb(p) => ExecutionPayloadHeader::Deneb(ExecutionPayloadHeaderDeneb {
                parent_hash: p.parent_hash,
                fee_recipient: p.fee_recipient,
                state_root: p.state_root,
                receipts_root: p.receipts_root,
                logs_bloom: p.logs_bloom.clone(),
                prev_randao: p.prev_randao,
                block_number: p.block_number,
                gas_limit: p.gas_limit,
                gas_used: p.gas_used,
                timestamp: p.timestamp,
                extra_data: p.extra_data.clone(),
                base_fee_per_gas: p.base_fee_per_gas,
                block_hash: p.block_hash,
                transactions_root: Hash256::zero(),
                withdrawals_root: withdrawals_list_root(&p.withdrawals),
                blob_kzg_commitments_root: Hash256::zero(),
                blob_kzg_commitments: vec![],
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_capella_payload() -> ExecutionPayload {
        ExecutionPayload::Capella(ExecutionPayloadCapella {
            parent_hash: ExecutionBlockHash::zero(),
            fee_recipient: Address::zero(),
            state_root: Hash256::zero(),
            receipts_root: Hash256::zero(),
            logs_bloom: vec![],
            prev_randao: Hash256::zero(),
            block_number: 0,
            gas_limit: 0,
            gas_used: 0,
            timestamp: 0,
            extra_data: vec![],
            base_fee_per_gas: Uint256::zero(),
            block_hash: ExecutionBlockHash::zero(),
            transactions: vec![],
            withdrawals: vec![],
        })
    }

    #[test]
    fn default_payload_has_empty_roots() {
        assert!(empty_capella_payload().is_default_with_empty_roots());
    }

    #[test]
    fn withdrawals_root_matches_for_equal_lists() {
        let payload = empty_capella_payload();
        let header: ExecutionPayloadHeader = (&payload).into();
        match header {
            ExecutionPayloadHeader::Capella(h) => {
                assert_eq!(Some(h.withdrawals_root), payload.withdrawals_root());
            }
            _ => panic!("expected capella header"),
        }
    }
}
