mod attestation;
mod beacon_block;
mod blob;
mod chain_spec;
mod duties;
mod execution_payload;
mod fork_name;
mod primitives;
mod slot_epoch;
mod validator;

pub use attestation::{
    AggregateAndProof, AggregationBits, Attestation, AttestationData, AttesterSlashing,
    BeaconBlockHeader, Checkpoint, Deposit, DepositData, Eth1Data, IndexedAttestation,
    ProposerSlashing, SignedAggregateAndProof, SignedBeaconBlockHeader, SignedVoluntaryExit,
    SyncAggregate, VoluntaryExit,
};
pub use beacon_block::{
    BeaconBlock, BeaconBlockAltair, BeaconBlockBase, BeaconBlockBellatrix, BeaconBlockBody,
    BeaconBlockBodyAltair, BeaconBlockBodyBase, BeaconBlockBodyBellatrix, BeaconBlockBodyCapella,
    BeaconBlockBodyDeneb, BeaconBlockCapella, BeaconBlockDeneb, SignedBeaconBlock,
};
pub use blob::{BlobSidecar, BlobsBundle};
pub use chain_spec::ChainSpec;
pub use duties::{Duty, DutiesResponse, SyncDuty};
pub use execution_payload::{
    ExecutionPayload, ExecutionPayloadBellatrix, ExecutionPayloadCapella, ExecutionPayloadDeneb,
    ExecutionPayloadHeader, ExecutionPayloadHeaderBellatrix, ExecutionPayloadHeaderCapella,
    ExecutionPayloadHeaderDeneb, Withdrawal,
};
pub use fork_name::ForkName;
pub use primitives::{
    Address, ExecutionBlockHash, Graffiti, Hash256, KzgCommitment, KzgProof, PublicKeyBytes,
    SignatureBytes, Uint256,
};
pub use slot_epoch::{Epoch, Slot};
pub use validator::{Validator, ValidatorStatus, ValidatorStatusResponse, FAR_FUTURE_EPOCH};

/// `Slot`/`Epoch`-scale scalars that are plain `u64` newtypes around a validator/committee
/// position rather than a time unit (spec.md §3: "Slot (u64), Epoch (u64), ValidatorIndex (u64),
/// CommitteeIndex (u64), Gwei (u64)").
pub type ValidatorIndex = u64;
pub type CommitteeIndex = u64;
pub type Gwei = u64;
/// 8-byte handle identifying an in-progress execution-layer build (spec.md §3, GLOSSARY).
pub type PayloadId = [u8; 8];
