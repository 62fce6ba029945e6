use crate::bid::SignedBuilderBid;
use std::fmt;
use types::{ExecutionBlockHash, ExecutionPayload, PublicKeyBytes, Slot};

#[derive(Debug)]
pub enum BuilderError {
    Unavailable(String),
    DeadlineExceeded,
}

impl fmt::Display for BuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuilderError::Unavailable(msg) => write!(f, "builder unavailable: {msg}"),
            BuilderError::DeadlineExceeded => write!(f, "builder call exceeded its 1-second deadline"),
        }
    }
}

impl std::error::Error for BuilderError {}

/// External block-builder transport (spec.md §6: "Builder: `Status()`, `GetHeader(slot,
/// parent_hash, pubkey) → signed_bid`, `SubmitBlindedBlock(signed_blinded) → payload`"). The HTTP
/// transport itself is out of scope (spec.md §1); this trait is the builder's entire contract
/// with the core.
pub trait Builder: Send + Sync {
    fn status(&self) -> Result<(), BuilderError>;

    fn get_header(
        &self,
        slot: Slot,
        parent_hash: ExecutionBlockHash,
        pubkey: PublicKeyBytes,
    ) -> Result<Option<SignedBuilderBid>, BuilderError>;

    /// Exchanges a signed blinded block for the full execution payload it was built from
    /// (spec.md §4.2, "unblindBuilderBlock"). The blinded block itself is represented opaquely by
    /// callers; only the fields this trait needs to hand off are named here.
    fn submit_blinded_block(
        &self,
        block_root: types::Hash256,
        header: &types::ExecutionPayloadHeader,
    ) -> Result<ExecutionPayload, BuilderError>;
}
