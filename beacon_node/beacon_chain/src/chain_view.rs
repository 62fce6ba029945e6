use crate::beacon_state::BeaconStateView;
use crate::error::BeaconChainError;
use std::sync::Arc;
use types::{ExecutionBlockHash, Hash256, Slot};

/// Read-only projection of the node's head (spec.md §2, "Components" table): "head state, head
/// root, current slot, finalized checkpoint, optimistic flag." Every RPC component is built
/// against this trait rather than a concrete chain implementation.
pub trait ChainView: Send + Sync {
    fn head_state(&self) -> Arc<dyn BeaconStateView>;

    fn head_root(&self) -> Hash256;

    fn head_block_parent_hash(&self) -> ExecutionBlockHash;

    fn current_slot(&self) -> Option<Slot>;

    fn genesis_time(&self) -> u64;

    fn finalized_block_hash(&self) -> Option<ExecutionBlockHash>;

    fn unrealized_justified_payload_block_hash(&self) -> Option<ExecutionBlockHash>;

    /// True while the head is optimistic, i.e. imported without full execution validation
    /// (spec.md §4.2: fails `FailedPrecondition` while optimistic, post-Bellatrix).
    fn optimistic(&self) -> bool;

    /// True while the node is syncing (spec.md §4.1: "Fails with `Unavailable` while syncing").
    fn is_syncing(&self) -> bool;
}

/// Standard "reject if syncing" / "reject if optimistic" guards, shared by every RPC entry point
/// that the spec gates on sync/optimistic status (spec.md §4.1, §4.2, §4.6).
pub fn require_synced(chain: &dyn ChainView) -> Result<(), BeaconChainError> {
    if chain.is_syncing() {
        Err(BeaconChainError::Unavailable)
    } else {
        Ok(())
    }
}
