use crate::error::AggregationError;
use crate::pools::AttestationPool;
use metrics::IntCounter;
use slog::{debug, Logger};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use types::{
    AggregateAndProof, Attestation, ChainSpec, CommitteeIndex, Epoch, SignatureBytes,
    SignedAggregateAndProof, Slot, ValidatorIndex,
};

/// `SubmitAggregateSelectionProof` + `SubmitSignedAggregateSelectionProof` (spec.md §4.6).
pub struct AggregationEngine<'a> {
    pool: &'a dyn AttestationPool,
    spec: &'a ChainSpec,
    selection_total: Option<IntCounter>,
    log: Logger,
}

impl<'a> AggregationEngine<'a> {
    pub fn new(
        pool: &'a dyn AttestationPool,
        spec: &'a ChainSpec,
        selection_total: Option<IntCounter>,
        log: Logger,
    ) -> Self {
        Self {
            pool,
            spec,
            selection_total,
            log,
        }
    }

    /// `IsAggregator(committee_size, slot_signature)` (spec.md §4.6 step 4): the slot signature
    /// acts as the VRF-like input; a validator is an aggregator iff the signature hashes below
    /// `2^64 / modulo`, with `modulo = max(1, committee_size / TargetAggregatorsPerCommittee)`.
    /// SSZ/BLS hashing is out of scope (spec.md §1); this is a deterministic stand-in keyed on
    /// the raw signature bytes.
    pub fn is_aggregator(&self, committee_size: usize, slot_signature: &SignatureBytes) -> bool {
        let modulo = std::cmp::max(
            1,
            committee_size as u64 / self.spec.target_aggregators_per_committee,
        );
        let mut hasher = DefaultHasher::new();
        slot_signature.as_bytes().hash(&mut hasher);
        hasher.finish() % modulo == 0
    }

    /// `SubmitAggregateSelectionProof` (spec.md §4.6 steps 5-7). `committee_position` is the
    /// aggregator's index within the committee (`j` in the spec), resolved by the caller from
    /// the committee assignment already computed by the duty scheduler.
    pub fn submit_aggregate_selection_proof(
        &self,
        slot: Slot,
        committee_index: CommitteeIndex,
        committee_size: usize,
        committee_position: usize,
        slot_signature: SignatureBytes,
        aggregator_index: ValidatorIndex,
    ) -> Result<AggregateAndProof, AggregationError> {
        if !self.is_aggregator(committee_size, &slot_signature) {
            return Err(AggregationError::NotAnAggregator);
        }

        let mut candidates = self.pool.aggregated_by_slot_index(slot, committee_index);
        if candidates.is_empty() {
            candidates = self.pool.unaggregated_by_slot_index(slot, committee_index);
        }
        if candidates.is_empty() {
            return Err(AggregationError::NoAggregableAttestation);
        }

        let best = self.select_best(&candidates, committee_index, committee_position);

        if let Some(counter) = &self.selection_total {
            counter.inc();
        }
        debug!(self.log, "selected best aggregate"; "slot" => slot.as_u64(), "popcount" => best.aggregation_bits.popcount());

        Ok(AggregateAndProof {
            aggregator_index,
            aggregate: best,
            selection_proof: slot_signature,
        })
    }

    /// Best-aggregate selection (spec.md §4.6 step 6). Ties resolve to the earlier-seen
    /// candidate: the replacement conditions below are strict `>` on popcount, so an equal-count
    /// later candidate never displaces an earlier one.
    fn select_best(
        &self,
        candidates: &[Attestation],
        committee_index: CommitteeIndex,
        committee_position: usize,
    ) -> Attestation {
        let mut best = candidates[0].clone();
        for candidate in &candidates[1..] {
            let candidate_has_own_bit =
                candidate.data.index == committee_index && candidate.aggregation_bits.get(committee_position);
            let best_has_own_bit = best.aggregation_bits.get(committee_position);

            let replace = if candidate_has_own_bit {
                !best_has_own_bit || candidate.aggregation_bits.popcount() > best.aggregation_bits.popcount()
            } else {
                !best_has_own_bit && candidate.aggregation_bits.popcount() > best.aggregation_bits.popcount()
            };

            if replace {
                best = candidate.clone();
            }
        }
        best
    }

    /// `SubmitSignedAggregateSelectionProof` (spec.md §4.6 second operation). `current_slot` is
    /// the wall-clock-derived slot; the literal rejection message matches spec.md §8 scenario 5.
    pub fn validate_signed_aggregate(
        &self,
        signed: &SignedAggregateAndProof,
        current_slot: Slot,
        current_epoch: Epoch,
    ) -> Result<(), AggregationError> {
        if signed.signature.as_bytes().iter().all(|&b| b == 0) {
            return Err(AggregationError::ZeroSignature);
        }
        if signed.message.selection_proof.as_bytes().iter().all(|&b| b == 0) {
            return Err(AggregationError::ZeroSignature);
        }

        let disparity_slots = self.spec.maximum_gossip_clock_disparity_millis
            / self.spec.milliseconds_per_slot.max(1);
        let lower = current_slot.as_u64().saturating_sub(disparity_slots);
        let upper = current_slot.as_u64() + disparity_slots;
        let attestation_slot = signed.message.aggregate.data.slot.as_u64();

        if attestation_slot < lower || attestation_slot > upper {
            return Err(AggregationError::StaleSlot);
        }

        let _ = current_epoch;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeAttestationPool;
    use types::{AggregationBits, AttestationData, Checkpoint, Hash256};

    fn attestation(bits: &[usize], len: usize, committee_index: CommitteeIndex) -> Attestation {
        let mut b = AggregationBits::with_capacity(len);
        for &i in bits {
            b.set(i, true);
        }
        Attestation {
            aggregation_bits: b,
            data: AttestationData {
                slot: Slot::new(10),
                index: committee_index,
                beacon_block_root: Hash256::zero(),
                source: Checkpoint::default(),
                target: Checkpoint::default(),
            },
            signature: SignatureBytes::zero(),
        }
    }

    fn engine(pool: &FakeAttestationPool, spec: &ChainSpec) -> AggregationEngine<'_> {
        AggregationEngine::new(pool, spec, None, logging::test_logger())
    }

    #[test]
    fn aggregator_prefers_own_attestation() {
        // spec.md §8 scenario 1: committee position 4 is set only on `b` (popcount 3), while `c`
        // has the highest popcount (4) but not the own bit; `b` must still win.
        let spec = ChainSpec::mainnet();
        let a = attestation(&[0, 1, 2], 5, 0);
        let b = attestation(&[0, 3, 4], 5, 0);
        let c = attestation(&[0, 1, 2, 3], 5, 0);

        let pool = FakeAttestationPool {
            aggregated: vec![a, b.clone(), c],
            unaggregated: vec![],
        };
        let best = engine(&pool, &spec).select_best(&pool.aggregated, 0, 4);
        assert_eq!(best.aggregation_bits, b.aggregation_bits);
    }

    #[test]
    fn aggregator_picks_most_bits_when_absent() {
        // spec.md §8 scenario 2: committee position 4 is set on neither candidate, so selection
        // falls back to highest popcount.
        let spec = ChainSpec::mainnet();
        let a = attestation(&[0, 1, 2], 5, 0);
        let b = attestation(&[0, 1, 2, 3], 5, 0);
        let pool = FakeAttestationPool {
            aggregated: vec![a, b.clone()],
            unaggregated: vec![],
        };
        let best = engine(&pool, &spec).select_best(&pool.aggregated, 0, 4);
        assert_eq!(best.aggregation_bits, b.aggregation_bits);
    }

    #[test]
    fn signed_aggregate_stale_slot_rejected() {
        // spec.md §8 scenario 5.
        let spec = ChainSpec::mainnet();
        let pool = FakeAttestationPool::default();
        let e = engine(&pool, &spec);
        let signed = SignedAggregateAndProof {
            message: AggregateAndProof {
                aggregator_index: 1,
                aggregate: attestation(&[0], 5, 0).tap_slot(Slot::new(1000)),
                selection_proof: SignatureBytes([1u8; 96]),
            },
            signature: SignatureBytes([1u8; 96]),
        };
        let result = e.validate_signed_aggregate(&signed, Slot::new(10), Epoch::new(0));
        assert!(matches!(result, Err(AggregationError::StaleSlot)));
    }

    trait TapSlot {
        fn tap_slot(self, slot: Slot) -> Self;
    }

    impl TapSlot for Attestation {
        fn tap_slot(mut self, slot: Slot) -> Self {
            self.data.slot = slot;
            self
        }
    }
}
