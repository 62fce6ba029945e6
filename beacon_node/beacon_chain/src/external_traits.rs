use crate::beacon_state::BeaconStateView;
use crate::error::BeaconChainError;
use std::sync::Arc;
use types::{Epoch, Hash256, PublicKeyBytes, Slot};

/// `StateGen::ProcessSlotsUsingNextSlotCache` (spec.md §6): advances a state to `target_slot`
/// without mutating the canonical head (spec.md §4.1 step 1).
pub trait StateTransition: Send + Sync {
    fn process_slots_using_next_slot_cache(
        &self,
        state: Arc<dyn BeaconStateView>,
        head_root: Hash256,
        target_slot: Slot,
    ) -> Result<Arc<dyn BeaconStateView>, BeaconChainError>;
}

/// A well-formed deposit read from the deposit contract log (spec.md §4.7 step 1).
#[derive(Debug, Clone, PartialEq)]
pub struct DepositRecord {
    pub pubkey: PublicKeyBytes,
    pub amount_gwei: u64,
    pub signature_valid: bool,
}

/// `DepositFetcher::DepositByPubkey` (spec.md §6).
pub trait DepositFetcher: Send + Sync {
    fn deposit_by_pubkey(&self, pubkey: &PublicKeyBytes) -> Option<DepositRecord>;
}

/// External Merkle-proof primitive used by blob sidecar construction (spec.md §4.8,
/// "commitment_inclusion_proof = merkle_proof_of_commitment_i_in_body") and, where a full
/// implementation would need it, by the state-root computation in the proposal pipeline.
pub trait MerkleHasher: Send + Sync {
    fn commitment_inclusion_proof(&self, commitment_index: usize, total: usize) -> Vec<Hash256>;
}

/// `epoch_start_slot` / `epoch` helpers shared across the scheduler and pipeline, parameterised
/// by `slots_per_epoch` so tests can use non-mainnet values.
pub fn epoch_start_slot(epoch: Epoch, slots_per_epoch: u64) -> Slot {
    epoch.start_slot(slots_per_epoch)
}
