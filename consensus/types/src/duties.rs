use crate::{CommitteeIndex, Epoch, PublicKeyBytes, Slot, ValidatorIndex};
use serde::{Deserialize, Serialize};

/// A single validator's committee/proposer/sync-committee assignment for one epoch.
///
/// A `DutiesResponse` carries a current-epoch and a next-epoch list of these (spec.md §3,
/// "A response carries current-epoch and next-epoch duty lists").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Duty {
    pub pubkey: PublicKeyBytes,
    pub validator_index: ValidatorIndex,
    pub status: crate::ValidatorStatus,
    /// Ordered committee member indices.
    pub committee: Vec<ValidatorIndex>,
    pub committee_index: CommitteeIndex,
    pub attester_slot: Slot,
    pub proposer_slots: Vec<Slot>,
    pub is_sync_committee: bool,
}

/// Response to `GetDuties`/`StreamDuties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutiesResponse {
    pub current: Vec<Duty>,
    pub next: Vec<Duty>,
}

/// A validator's sync-committee assignment, used internally to derive `Duty::is_sync_committee`
/// and to drive sync-committee-subnet subscriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncDuty {
    pub pubkey: PublicKeyBytes,
    pub validator_index: ValidatorIndex,
    /// The validator's position(s) within the 512-member sync committee.
    pub validator_sync_committee_indices: Vec<u64>,
}

impl SyncDuty {
    /// Builds a `SyncDuty` from the positions of `validator_index` within a sync committee's
    /// index list; returns `None` if the validator holds no position (not a member).
    pub fn from_sync_committee_indices(
        validator_index: ValidatorIndex,
        pubkey: PublicKeyBytes,
        sync_committee_indices: &[ValidatorIndex],
    ) -> Option<Self> {
        let validator_sync_committee_indices: Vec<u64> = sync_committee_indices
            .iter()
            .enumerate()
            .filter_map(|(position, &member)| {
                (member == validator_index).then_some(position as u64)
            })
            .collect();

        if validator_sync_committee_indices.is_empty() {
            None
        } else {
            Some(Self {
                validator_index,
                pubkey,
                validator_sync_committee_indices,
            })
        }
    }
}
