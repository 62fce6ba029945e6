use parking_lot::RwLock;
use rand::seq::index::sample;
use rand::Rng;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use types::PublicKeyBytes;

/// One validator's persistent-subnet subscription: which subnets, and when the subscription
/// expires (spec.md §3: "`SubnetCache` maps `pubkey → (subnet_ids, expiry_time)`").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubnetEntry {
    pub subnet_ids: Vec<u64>,
    pub expiry: Instant,
}

/// Process-wide persistent-subnet subscription registry (spec.md §2, §3). Entries are replaced,
/// never mutated in place, and expiry only ever moves forward ("Expiry is monotone").
#[derive(Default)]
pub struct SubnetCache {
    entries: RwLock<HashMap<PublicKeyBytes, SubnetEntry>>,
}

impl SubnetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True iff `pubkey` has a subscription that has not yet expired.
    pub fn has_live_entry(&self, pubkey: &PublicKeyBytes, now: Instant) -> bool {
        self.entries
            .read()
            .get(pubkey)
            .is_some_and(|entry| entry.expiry > now)
    }

    /// Assigns `random_subnets_per_validator` distinct subnet ids drawn uniformly from
    /// `[0, attestation_subnet_count)`, with an expiry drawn from
    /// `[epochs_per_random_subnet_subscription, 2 * epochs_per_random_subnet_subscription)`
    /// epochs from `now` (spec.md §4.1, "SubnetCache policy"). No-op if a live entry exists.
    pub fn subscribe_if_absent(
        &self,
        pubkey: PublicKeyBytes,
        attestation_subnet_count: u64,
        random_subnets_per_validator: u64,
        epochs_per_random_subnet_subscription: u64,
        slot_duration: Duration,
        slots_per_epoch: u64,
        now: Instant,
        rng: &mut impl Rng,
    ) {
        if self.has_live_entry(&pubkey, now) {
            return;
        }

        let subnet_ids: Vec<u64> =
            sample(rng, attestation_subnet_count as usize, random_subnets_per_validator as usize)
                .iter()
                .map(|i| i as u64)
                .collect();

        let min_epochs = epochs_per_random_subnet_subscription;
        let max_epochs = 2 * epochs_per_random_subnet_subscription;
        let duration_epochs = rng.gen_range(min_epochs..max_epochs);
        let epoch_duration = slot_duration * slots_per_epoch as u32;
        let expiry = now + epoch_duration * duration_epochs as u32;

        self.entries
            .write()
            .insert(pubkey, SubnetEntry { subnet_ids, expiry });
    }

    pub fn get(&self, pubkey: &PublicKeyBytes) -> Option<SubnetEntry> {
        self.entries.read().get(pubkey).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// A validator's sync-committee subnet subscription, scoped to a sync-committee period
/// (spec.md §3: "`SyncSubnetCache` adds the start epoch").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSubnetEntry {
    pub subnet_ids: Vec<u64>,
    pub period_start_epoch: u64,
    pub expiry: Instant,
}

/// Process-wide sync-committee subnet registry.
#[derive(Default)]
pub struct SyncSubnetCache {
    entries: RwLock<HashMap<PublicKeyBytes, SyncSubnetEntry>>,
}

impl SyncSubnetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_live_entry(&self, pubkey: &PublicKeyBytes, now: Instant) -> bool {
        self.entries
            .read()
            .get(pubkey)
            .is_some_and(|entry| entry.expiry > now)
    }

    /// Derives subnet indices from the validator's positions within the sync committee:
    /// `position / (committee_size / subnet_count)` (spec.md §4.1, "SyncSubnetCache derives
    /// subnet indices from the validator's committee positions"). Lives until the end of the
    /// sync-committee period starting at `period_start_epoch`.
    pub fn subscribe_if_absent(
        &self,
        pubkey: PublicKeyBytes,
        sync_committee_positions: &[u64],
        sync_committee_size: u64,
        sync_committee_subnet_count: u64,
        period_start_epoch: u64,
        epochs_per_sync_committee_period: u64,
        slot_duration: Duration,
        slots_per_epoch: u64,
        now: Instant,
    ) {
        if sync_committee_positions.is_empty() || self.has_live_entry(&pubkey, now) {
            return;
        }

        let positions_per_subnet = sync_committee_size / sync_committee_subnet_count;
        let mut subnet_ids: Vec<u64> = sync_committee_positions
            .iter()
            .map(|position| position / positions_per_subnet.max(1))
            .collect();
        subnet_ids.sort_unstable();
        subnet_ids.dedup();

        let epoch_duration = slot_duration * slots_per_epoch as u32;
        let expiry =
            now + epoch_duration * epochs_per_sync_committee_period as u32;

        self.entries.write().insert(
            pubkey,
            SyncSubnetEntry {
                subnet_ids,
                period_start_epoch,
                expiry,
            },
        );
    }

    pub fn get(&self, pubkey: &PublicKeyBytes) -> Option<SyncSubnetEntry> {
        self.entries.read().get(pubkey).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn subscribes_exactly_once_while_live() {
        let cache = SubnetCache::new();
        let mut rng = rand::rngs::StdRng::seed_from_u64(1);
        let pubkey = PublicKeyBytes::zero();
        let now = Instant::now();

        cache.subscribe_if_absent(pubkey, 64, 1, 256, Duration::from_secs(12), 32, now, &mut rng);
        let first = cache.get(&pubkey).unwrap();

        cache.subscribe_if_absent(pubkey, 64, 1, 256, Duration::from_secs(12), 32, now, &mut rng);
        let second = cache.get(&pubkey).unwrap();

        assert_eq!(first, second, "a live entry must not be replaced");
    }

    #[test]
    fn subnet_ids_within_bounds_and_correct_count() {
        let cache = SubnetCache::new();
        let mut rng = rand::rngs::StdRng::seed_from_u64(2);
        let pubkey = PublicKeyBytes::zero();
        let now = Instant::now();
        cache.subscribe_if_absent(pubkey, 64, 1, 256, Duration::from_secs(12), 32, now, &mut rng);

        let entry = cache.get(&pubkey).unwrap();
        assert_eq!(entry.subnet_ids.len(), 1);
        assert!(entry.subnet_ids.iter().all(|&id| id < 64));
    }

    #[test]
    fn sync_subnet_derives_from_positions() {
        let cache = SyncSubnetCache::new();
        let pubkey = PublicKeyBytes::zero();
        let now = Instant::now();
        cache.subscribe_if_absent(pubkey, &[0, 1, 130], 512, 4, 10, 256, Duration::from_secs(12), 32, now);

        let entry = cache.get(&pubkey).unwrap();
        // positions_per_subnet = 512 / 4 = 128; positions 0,1 -> subnet 0; 130 -> subnet 1.
        assert_eq!(entry.subnet_ids, vec![0, 1]);
        assert_eq!(entry.period_start_epoch, 10);
    }
}
