use std::fmt;
use types::{BlobSidecar, Hash256, SignedAggregateAndProof, SignedBeaconBlock};

#[derive(Debug)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TransportError {}

/// Gossip payloads the pipeline broadcasts (spec.md §6: "P2P: `Broadcast(message)`").
pub enum GossipMessage {
    Block(SignedBeaconBlock),
    SignedAggregateAndProof(SignedAggregateAndProof),
    BlobSidecar(BlobSidecar),
}

/// Fire-and-forget broadcast with transient error propagation (spec.md §6).
pub trait P2P: Send + Sync {
    fn broadcast(&self, message: GossipMessage) -> Result<(), TransportError>;
}

/// `BlockReceiver::ReceiveBlock(ctx, signed_block, root)` (spec.md §6), the import path a
/// proposed block is handed to after broadcast.
pub trait BlockReceiver: Send + Sync {
    fn receive_block(&self, signed_block: &SignedBeaconBlock, root: Hash256) -> Result<(), TransportError>;
}
