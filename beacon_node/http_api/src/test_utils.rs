use crate::p2p::{BlockReceiver, GossipMessage, P2P, TransportError};
use crate::proposal_pipeline::StateRootCalculator;
use beacon_chain::BeaconStateView;
use parking_lot::Mutex;
use types::{BeaconBlock, Hash256, SignedBeaconBlock};

/// Records every broadcast message; never fails unless `fail` is set (spec.md §6, "P2P:
/// Broadcast(message)").
#[derive(Default)]
pub struct FakeP2P {
    pub broadcasts: Mutex<Vec<GossipMessage>>,
    pub fail: bool,
}

impl P2P for FakeP2P {
    fn broadcast(&self, message: GossipMessage) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError("broadcast failed".into()));
        }
        self.broadcasts.lock().push(message);
        Ok(())
    }
}

/// Records every block handed off for import (spec.md §6, "BlockReceiver::ReceiveBlock").
#[derive(Default)]
pub struct FakeBlockReceiver {
    pub received: Mutex<Vec<Hash256>>,
    pub fail: bool,
}

impl BlockReceiver for FakeBlockReceiver {
    fn receive_block(&self, _signed_block: &SignedBeaconBlock, root: Hash256) -> Result<(), TransportError> {
        if self.fail {
            return Err(TransportError("import failed".into()));
        }
        self.received.lock().push(root);
        Ok(())
    }
}

/// Returns a fixed state root regardless of input, standing in for the external state-transition
/// function (spec.md §4.2 step 4, out of scope per spec.md §1).
pub struct FakeStateRootCalculator {
    pub state_root: Hash256,
}

impl StateRootCalculator for FakeStateRootCalculator {
    fn calculate_state_root(
        &self,
        _state: &dyn BeaconStateView,
        _block: &BeaconBlock,
    ) -> Result<Hash256, String> {
        Ok(self.state_root)
    }
}

/// Fixed-length placeholder Merkle proof, standing in for the external merkleization primitive
/// (spec.md §4.8).
pub struct FakeMerkleHasher {
    pub proof: Vec<Hash256>,
}

impl beacon_chain::MerkleHasher for FakeMerkleHasher {
    fn commitment_inclusion_proof(&self, _commitment_index: usize, _total: usize) -> Vec<Hash256> {
        self.proof.clone()
    }
}
