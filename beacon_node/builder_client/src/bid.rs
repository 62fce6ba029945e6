use types::{ExecutionBlockHash, ExecutionPayloadHeader, Gwei, PublicKeyBytes, SignatureBytes};

/// A builder's bid for a slot: an execution payload header plus the value it is willing to pay
/// the proposer (spec.md §4.5 step 3, GLOSSARY "Builder / MEV-Boost").
#[derive(Debug, Clone)]
pub struct BuilderBid {
    pub header: ExecutionPayloadHeader,
    pub value: Gwei,
    pub pubkey: PublicKeyBytes,
}

impl BuilderBid {
    pub fn parent_hash(&self) -> ExecutionBlockHash {
        self.header.parent_hash()
    }

    pub fn timestamp(&self) -> u64 {
        self.header.timestamp()
    }
}

#[derive(Debug, Clone)]
pub struct SignedBuilderBid {
    pub message: BuilderBid,
    pub signature: SignatureBytes,
}
