//! The validator-facing RPC core: duty scheduling, block proposal, attestation aggregation, and
//! validator status/doppelganger checks, wired behind `ValidatorRpc` (spec.md §2, §6).

mod blob_sidecars;
mod error;
mod p2p;
mod proposal_pipeline;
mod validator_rpc;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use blob_sidecars::{construct_blob_sidecars, BlobSidecarError};
pub use error::RpcError;
pub use p2p::{BlockReceiver, GossipMessage, P2P, TransportError};
pub use proposal_pipeline::{
    choose_execution_data, BuilderRegistration, ExecutionDataChoice, GetBeaconBlockRequest,
    ProposalPipeline, StateRootCalculator,
};
pub use validator_rpc::{AggregateSelectionRequest, DutyStreamEvent, ValidatorRpc};
