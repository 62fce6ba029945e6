use parking_lot::RwLock;
use std::collections::HashMap;
use types::{Hash256, PayloadId, Slot, ValidatorIndex};

/// Key into the payload-id cache: spec.md §3, "`(slot, head_root) → (proposer_index,
/// payload_id)`".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayloadIdKey {
    pub slot: Slot,
    pub head_root: Hash256,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadIdEntry {
    pub proposer_index: ValidatorIndex,
    pub payload_id: Option<PayloadId>,
}

/// Maps `(slot, head_root) → (proposer_index, payload_id)` so a proposer's slot does not miss an
/// engine pre-build (spec.md §2). Pruned of stale entries on every duty computation
/// (spec.md §4.1 step 7).
#[derive(Default)]
pub struct PayloadIdCache {
    entries: RwLock<HashMap<PayloadIdKey, PayloadIdEntry>>,
}

impl PayloadIdCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a placeholder entry for a known future proposer slot, with no payload id yet, so
    /// a later `ForkchoiceUpdated` callback can claim it (spec.md §4.1 step 4: "insert a
    /// placeholder entry `(slot, index, payload_id=0, head_root=0)`").
    pub fn insert_placeholder(&self, slot: Slot, head_root: Hash256, proposer_index: ValidatorIndex) {
        self.entries.write().insert(
            PayloadIdKey { slot, head_root },
            PayloadIdEntry {
                proposer_index,
                payload_id: None,
            },
        );
    }

    /// Records a payload id obtained from a successful `ForkchoiceUpdated` call.
    pub fn set_payload_id(
        &self,
        slot: Slot,
        head_root: Hash256,
        proposer_index: ValidatorIndex,
        payload_id: PayloadId,
    ) {
        self.entries.write().insert(
            PayloadIdKey { slot, head_root },
            PayloadIdEntry {
                proposer_index,
                payload_id: Some(payload_id),
            },
        );
    }

    pub fn get(&self, slot: Slot, head_root: Hash256) -> Option<PayloadIdEntry> {
        self.entries
            .read()
            .get(&PayloadIdKey { slot, head_root })
            .copied()
    }

    /// Prunes entries with `slot < epoch_start_slot` (spec.md §4.1 step 7).
    pub fn prune(&self, epoch_start_slot: Slot) {
        self.entries
            .write()
            .retain(|key, _| key.slot >= epoch_start_slot);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_then_claim() {
        let cache = PayloadIdCache::new();
        let root = Hash256::zero();
        cache.insert_placeholder(Slot::new(10), root, 7);
        assert_eq!(
            cache.get(Slot::new(10), root),
            Some(PayloadIdEntry {
                proposer_index: 7,
                payload_id: None
            })
        );

        cache.set_payload_id(Slot::new(10), root, 7, [1u8; 8]);
        assert_eq!(
            cache.get(Slot::new(10), root).unwrap().payload_id,
            Some([1u8; 8])
        );
    }

    #[test]
    fn prune_removes_entries_below_epoch_start() {
        let cache = PayloadIdCache::new();
        let root = Hash256::zero();
        cache.insert_placeholder(Slot::new(5), root, 1);
        cache.insert_placeholder(Slot::new(35), root, 2);

        cache.prune(Slot::new(32));

        assert!(cache.get(Slot::new(5), root).is_none());
        assert!(cache.get(Slot::new(35), root).is_some());
    }
}
