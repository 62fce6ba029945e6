use types::{Attestation, CommitteeIndex, Slot};

/// Pull API the core uses against the attestation pool (spec.md §6: "Pools: attestation pool
/// with `AggregatedBySlotIndex(slot, ci)` and `UnaggregatedBySlotIndex(slot, ci)`"). Owned and
/// populated by an external collaborator; the core only reads from it.
pub trait AttestationPool: Send + Sync {
    fn aggregated_by_slot_index(&self, slot: Slot, committee_index: CommitteeIndex) -> Vec<Attestation>;
    fn unaggregated_by_slot_index(&self, slot: Slot, committee_index: CommitteeIndex) -> Vec<Attestation>;

    /// Attestations for `parent_slot` suitable for inclusion in a block's skeleton (spec.md §4.2
    /// step 1), pool-wide rather than filtered to one committee.
    fn for_block_inclusion(&self, parent_slot: Slot) -> Vec<Attestation>;
}

/// Analogous pull API for the slashing pool (spec.md §6: "slashing, exit, sync-committee pools
/// with analogous pull APIs"), consumed by the proposal pipeline's block skeleton step.
pub trait SlashingPool: Send + Sync {
    fn proposer_slashings(&self) -> Vec<types::ProposerSlashing>;
    fn attester_slashings(&self) -> Vec<types::AttesterSlashing>;
}

pub trait ExitPool: Send + Sync {
    fn voluntary_exits(&self) -> Vec<types::SignedVoluntaryExit>;
}

/// Sync-committee contribution pool, queried by parent slot/root for the previous slot's
/// contributions the skeleton folds into a `SyncAggregate` (spec.md §4.2 step 1).
pub trait SyncCommitteePool: Send + Sync {
    fn get_aggregate(&self, parent_slot: Slot, parent_root: types::Hash256) -> Option<types::SyncAggregate>;
}
