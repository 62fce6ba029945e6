use std::fmt;
use types::{
    Address, BlobsBundle, ExecutionBlockHash, ExecutionPayload, Gwei, Hash256, PayloadId, Slot,
    Withdrawal,
};

/// `{head, safe, finalized}` passed to `ForkchoiceUpdated` (spec.md §4.3 step 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForkchoiceState {
    pub head_block_hash: ExecutionBlockHash,
    pub safe_block_hash: ExecutionBlockHash,
    pub finalized_block_hash: ExecutionBlockHash,
}

/// Version-appropriate payload attributes passed alongside a `ForkchoiceState` (spec.md §4.3
/// step 3: "`{timestamp, prev_randao, fee_recipient, withdrawals?, parent_beacon_block_root?}`").
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadAttributes {
    pub timestamp: u64,
    pub prev_randao: Hash256,
    pub fee_recipient: Address,
    /// Present from Capella onwards.
    pub withdrawals: Option<Vec<Withdrawal>>,
    /// Present from Deneb onwards.
    pub parent_beacon_block_root: Option<Hash256>,
}

/// `GetPayload(id, slot) → (payload, bid, blobs_bundle, override_builder)` (spec.md §6).
#[derive(Debug, Clone)]
pub struct GetPayloadResponse {
    pub payload: ExecutionPayload,
    /// The local payload's value, used in the Capella+ builder tie-break (spec.md §4.2 step 2).
    pub block_value: Gwei,
    pub blobs_bundle: Option<BlobsBundle>,
    /// Engine hint that this payload should be used regardless of a builder bid, surfaced
    /// verbatim from the engine response (spec.md §6).
    pub should_override_builder: bool,
}

#[derive(Debug)]
pub enum EngineError {
    /// The call did not complete within the caller's deadline (spec.md §5: "Execution-engine
    /// `GetPayload` uses the request deadline; deadline-exceeded on a cache hit triggers
    /// fallthrough to a fresh build").
    DeadlineExceeded,
    Unavailable(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::DeadlineExceeded => write!(f, "execution engine call exceeded its deadline"),
            EngineError::Unavailable(msg) => write!(f, "execution engine unavailable: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

/// `ExecutionEngine` (spec.md §6): `ForkchoiceUpdated`, `GetPayload`, `GetTerminalBlockHash`.
/// Drives the execution engine via its JSON-RPC surface; the transport itself is out of scope
/// (spec.md §1) so this trait is the engine's entire contract with the core.
pub trait ExecutionEngine: Send + Sync {
    fn forkchoice_updated(
        &self,
        state: ForkchoiceState,
        payload_attributes: Option<PayloadAttributes>,
    ) -> Result<Option<PayloadId>, EngineError>;

    fn get_payload(&self, payload_id: PayloadId, slot: Slot) -> Result<GetPayloadResponse, EngineError>;

    /// `TerminalBlockHash` override lookup or total-difficulty search, used when the head state
    /// predates the merge (spec.md §4.3 step 2).
    fn get_terminal_block_hash(
        &self,
        terminal_total_difficulty_timestamp: u64,
    ) -> Result<Option<ExecutionBlockHash>, EngineError>;
}
