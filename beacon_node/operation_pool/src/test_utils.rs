use crate::pools::{AttestationPool, ExitPool, SlashingPool, SyncCommitteePool};
use types::{Attestation, AttesterSlashing, CommitteeIndex, Hash256, ProposerSlashing, Slot, SignedVoluntaryExit, SyncAggregate};

#[derive(Default)]
pub struct FakeAttestationPool {
    pub aggregated: Vec<Attestation>,
    pub unaggregated: Vec<Attestation>,
}

impl AttestationPool for FakeAttestationPool {
    fn aggregated_by_slot_index(&self, slot: Slot, committee_index: CommitteeIndex) -> Vec<Attestation> {
        self.aggregated
            .iter()
            .filter(|a| a.data.slot == slot && a.data.index == committee_index)
            .cloned()
            .collect()
    }

    fn unaggregated_by_slot_index(&self, slot: Slot, committee_index: CommitteeIndex) -> Vec<Attestation> {
        self.unaggregated
            .iter()
            .filter(|a| a.data.slot == slot && a.data.index == committee_index)
            .cloned()
            .collect()
    }

    fn for_block_inclusion(&self, parent_slot: Slot) -> Vec<Attestation> {
        self.aggregated
            .iter()
            .filter(|a| a.data.slot == parent_slot)
            .cloned()
            .collect()
    }
}

#[derive(Default)]
pub struct FakeSlashingPool {
    pub proposer_slashings: Vec<ProposerSlashing>,
    pub attester_slashings: Vec<AttesterSlashing>,
}

impl SlashingPool for FakeSlashingPool {
    fn proposer_slashings(&self) -> Vec<ProposerSlashing> {
        self.proposer_slashings.clone()
    }

    fn attester_slashings(&self) -> Vec<AttesterSlashing> {
        self.attester_slashings.clone()
    }
}

#[derive(Default)]
pub struct FakeExitPool {
    pub voluntary_exits: Vec<SignedVoluntaryExit>,
}

impl ExitPool for FakeExitPool {
    fn voluntary_exits(&self) -> Vec<SignedVoluntaryExit> {
        self.voluntary_exits.clone()
    }
}

#[derive(Default)]
pub struct FakeSyncCommitteePool {
    pub aggregate: Option<SyncAggregate>,
}

impl SyncCommitteePool for FakeSyncCommitteePool {
    fn get_aggregate(&self, _parent_slot: Slot, _parent_root: Hash256) -> Option<SyncAggregate> {
        self.aggregate.clone()
    }
}
