//! The execution-layer boundary: the engine RPC contract, the builder circuit breaker, the
//! payload-id cache, fee-recipient resolution, and the payload builder that drives them together
//! (spec.md §2 components table).

pub mod circuit_breaker;
pub mod engine;
pub mod fee_recipient;
pub mod payload_builder;
pub mod payload_id_cache;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use circuit_breaker::{CircuitBreaker, ForkChoiceView};
pub use engine::{EngineError, ExecutionEngine, ForkchoiceState, GetPayloadResponse, PayloadAttributes};
pub use fee_recipient::FeeRecipientResolver;
pub use payload_builder::{
    ExecutionPayloadBuilder, LocalPayloadRequest, LocalPayloadResult, ParentContext,
    PayloadBuilderError,
};
pub use payload_id_cache::{PayloadIdCache, PayloadIdEntry, PayloadIdKey};
