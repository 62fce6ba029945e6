use types::{Epoch, ForkName, PublicKeyBytes, Slot, Validator, ValidatorIndex};

/// Read-only projection of `BeaconState` (spec.md §3): "the authoritative per-epoch view ...
/// the core never mutates it." The core consumes state exclusively through this trait so that a
/// full node's actual state type never needs to live in this crate.
pub trait BeaconStateView: Send + Sync {
    fn slot(&self) -> Slot;

    fn fork_name(&self) -> ForkName;

    fn validators(&self) -> &[Validator];

    fn validator_index(&self, pubkey: &PublicKeyBytes) -> Option<ValidatorIndex>;

    /// Active validator indices at `epoch`, in ascending order. The duty scheduler and
    /// aggregation engine derive committees from this set.
    fn active_validator_indices(&self, epoch: Epoch) -> Vec<ValidatorIndex>;

    /// Committee assigned to `(epoch, slot, committee_index)`, ordered (spec.md §3: "committee
    /// (ordered indices)").
    fn committee(&self, epoch: Epoch, slot: Slot, committee_index: u64) -> Vec<ValidatorIndex>;

    /// Number of committees per slot at `epoch`, needed to enumerate `committee_index` values.
    fn committee_count_at_slot(&self, slot: Slot) -> u64;

    /// Proposer for `slot`, resolved against this state.
    fn proposer_at_slot(&self, slot: Slot) -> ValidatorIndex;

    /// Sync committee members for the period containing `epoch`, post-Altair only.
    fn sync_committee_members(&self, epoch: Epoch) -> Option<Vec<ValidatorIndex>>;

    /// Sync committee members for the *next* period, post-Altair only.
    fn next_sync_committee_members(&self, epoch: Epoch) -> Option<Vec<ValidatorIndex>>;

    /// Whether `validator_index`'s participation bit was set in the target epoch's
    /// participation vector. `None` pre-Altair (spec.md §4.9: "Pre-Altair states exit early").
    fn participated_in_epoch(&self, validator_index: ValidatorIndex, epoch: Epoch) -> Option<bool>;
}

/// `sync_period = epoch / EPOCHS_PER_SYNC_COMMITTEE_PERIOD`, used to detect the sync-committee
/// period boundary (spec.md §4.1 step 5).
pub fn sync_period(epoch: Epoch, epochs_per_sync_committee_period: u64) -> u64 {
    epoch.as_u64() / epochs_per_sync_committee_period
}
