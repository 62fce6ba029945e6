use crate::{CommitteeIndex, Epoch, Hash256, PublicKeyBytes, Slot, SignatureBytes, ValidatorIndex};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    pub epoch: Epoch,
    pub root: Hash256,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttestationData {
    pub slot: Slot,
    pub index: CommitteeIndex,
    pub beacon_block_root: Hash256,
    pub source: Checkpoint,
    pub target: Checkpoint,
}

/// A committee-sized bitfield. Backed by `Vec<bool>` rather than a packed SSZ `BitList` since
/// this crate has no SSZ encoder; equality and hashing still key on bit values, matching the
/// spec's "aggregation_bits-as-set" identity rule (spec.md §3).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregationBits(Vec<bool>);

impl AggregationBits {
    pub fn with_capacity(len: usize) -> Self {
        Self(vec![false; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, i: usize) -> bool {
        self.0.get(i).copied().unwrap_or(false)
    }

    pub fn set(&mut self, i: usize, value: bool) {
        if i >= self.0.len() {
            self.0.resize(i + 1, false);
        }
        self.0[i] = value;
    }

    /// Number of set bits, used by the best-aggregate selection rule (spec.md §4.6 step 6).
    pub fn popcount(&self) -> usize {
        self.0.iter().filter(|&&b| b).count()
    }

    /// True iff no position is set in both `self` and `other` ("aggregable" per spec.md §3).
    pub fn disjoint_from(&self, other: &Self) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(&a, &b)| !(a && b))
    }

    pub fn union(&self, other: &Self) -> Self {
        let len = self.0.len().max(other.0.len());
        let mut out = vec![false; len];
        for i in 0..len {
            out[i] = self.get(i) || other.get(i);
        }
        Self(out)
    }
}

impl From<Vec<bool>> for AggregationBits {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attestation {
    pub aggregation_bits: AggregationBits,
    pub data: AttestationData,
    pub signature: SignatureBytes,
}

impl Attestation {
    /// Two attestations are aggregable iff their data matches and their bits are disjoint
    /// (spec.md §3).
    pub fn is_aggregable_with(&self, other: &Self) -> bool {
        self.data == other.data && self.aggregation_bits.disjoint_from(&other.aggregation_bits)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedAttestation {
    pub attesting_indices: Vec<ValidatorIndex>,
    pub data: AttestationData,
    pub signature: SignatureBytes,
}

/// `{aggregator_index, aggregate, selection_proof}`, returned by `SubmitAggregateSelectionProof`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateAndProof {
    pub aggregator_index: ValidatorIndex,
    pub aggregate: Attestation,
    pub selection_proof: SignatureBytes,
}

/// The signed form submitted to `SubmitSignedAggregateSelectionProof`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedAggregateAndProof {
    pub message: AggregateAndProof,
    pub signature: SignatureBytes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposerSlashing {
    pub signed_header_1: SignedBeaconBlockHeader,
    pub signed_header_2: SignedBeaconBlockHeader,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttesterSlashing {
    pub attestation_1: IndexedAttestation,
    pub attestation_2: IndexedAttestation,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeaconBlockHeader {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: Hash256,
    pub state_root: Hash256,
    pub body_root: Hash256,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedBeaconBlockHeader {
    pub message: BeaconBlockHeader,
    pub signature: SignatureBytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VoluntaryExit {
    pub epoch: Epoch,
    pub validator_index: ValidatorIndex,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignedVoluntaryExit {
    pub message: VoluntaryExit,
    pub signature: SignatureBytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Eth1Data {
    pub deposit_root: Hash256,
    pub deposit_count: u64,
    pub block_hash: Hash256,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositData {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    pub amount: u64,
    pub signature: SignatureBytes,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deposit {
    pub proof: Vec<Hash256>,
    pub data: DepositData,
}

/// Aggregated participation of the sync committee in the previous slot, included in blocks
/// post-Altair (spec.md §4.2 step 1: "sync aggregate ... derived from pool contributions
/// gathered for the previous slot").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncAggregate {
    pub sync_committee_bits: AggregationBits,
    pub sync_committee_signature: SignatureBytes,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bits(set: &[usize], len: usize) -> AggregationBits {
        let mut b = AggregationBits::with_capacity(len);
        for &i in set {
            b.set(i, true);
        }
        b
    }

    #[test]
    fn disjoint_and_popcount() {
        let a = bits(&[0, 2], 4);
        let b = bits(&[1, 3], 4);
        assert!(a.disjoint_from(&b));
        assert_eq!(a.popcount(), 2);
        let union = a.union(&b);
        assert_eq!(union.popcount(), 4);
    }

    #[test]
    fn overlapping_bits_are_not_disjoint() {
        let a = bits(&[0, 1], 4);
        let b = bits(&[1, 2], 4);
        assert!(!a.disjoint_from(&b));
    }
}
