/// Tunables referenced by name throughout the duty scheduler, proposal pipeline and aggregation
/// engine. `spec.md` names these constants without saying where they live; this is that home,
/// in the style of the teacher's own `ChainSpec` (one struct, one `mainnet()` constructor,
/// documented per-field defaults).
#[derive(Debug, Clone, PartialEq)]
pub struct ChainSpec {
    /// Number of slots in one epoch.
    pub slots_per_epoch: u64,
    /// Wall-clock duration of one slot, in milliseconds.
    pub milliseconds_per_slot: u64,
    /// Number of epochs in one sync committee period.
    pub epochs_per_sync_committee_period: u64,
    /// Number of attestation subnets.
    pub attestation_subnet_count: u64,
    /// Number of sync committee subnets.
    pub sync_committee_subnet_count: u64,
    /// Number of random persistent subnets assigned to each active validator.
    pub random_subnets_per_validator: u64,
    /// Minimum lifetime, in epochs, of a persistent random subnet subscription; the maximum is
    /// twice this value (spec.md §4.1: "a duration drawn from `[N, 2N)` epochs").
    pub epochs_per_random_subnet_subscription: u64,
    /// Maximum allowed clock disparity, in milliseconds, when validating gossiped messages
    /// against the wall-clock-derived current slot.
    pub maximum_gossip_clock_disparity_millis: u64,
    /// Consecutive slots a builder may miss payload-header delivery for before being demoted.
    pub max_builder_consecutive_missed_slots: u64,
    /// Slots a builder may miss within a trailing epoch before being demoted.
    pub max_builder_epoch_missed_slots: u64,
    /// Target number of aggregators per attestation committee, used to derive the aggregator
    /// selection probability threshold.
    pub target_aggregators_per_committee: u64,
}

impl ChainSpec {
    /// Mainnet-equivalent defaults; every other profile in this codebase derives from this one.
    pub fn mainnet() -> Self {
        Self {
            slots_per_epoch: 32,
            milliseconds_per_slot: 12_000,
            epochs_per_sync_committee_period: 256,
            attestation_subnet_count: 64,
            sync_committee_subnet_count: 4,
            random_subnets_per_validator: 1,
            epochs_per_random_subnet_subscription: 256,
            maximum_gossip_clock_disparity_millis: 500,
            max_builder_consecutive_missed_slots: 3,
            max_builder_epoch_missed_slots: 8,
            target_aggregators_per_committee: 16,
        }
    }
}

impl Default for ChainSpec {
    fn default() -> Self {
        Self::mainnet()
    }
}
