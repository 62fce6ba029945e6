use crate::engine::{EngineError, ExecutionEngine, ForkchoiceState, PayloadAttributes};
use crate::fee_recipient::FeeRecipientResolver;
use crate::payload_id_cache::PayloadIdCache;
use slog::{debug, warn, Logger};
use std::fmt;
use std::sync::Arc;
use types::{
    Address, BlobsBundle, ExecutionBlockHash, ExecutionPayload, ExecutionPayloadBellatrix,
    ExecutionPayloadCapella, ExecutionPayloadDeneb, ForkName, Gwei, Hash256, Slot,
    ValidatorIndex, Withdrawal,
};

#[derive(Debug)]
pub enum PayloadBuilderError {
    /// `ForkchoiceUpdated` returned no payload id; fatal (spec.md §4.3 step 4: "A nil
    /// `payload_id` is fatal").
    NoPayloadId,
    Engine(EngineError),
}

impl fmt::Display for PayloadBuilderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadBuilderError::NoPayloadId => {
                write!(f, "forkchoiceUpdated returned no payload id")
            }
            PayloadBuilderError::Engine(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for PayloadBuilderError {}

impl From<EngineError> for PayloadBuilderError {
    fn from(e: EngineError) -> Self {
        PayloadBuilderError::Engine(e)
    }
}

/// Parent-block context needed to compose a `ForkchoiceState` and resolve the terminal block
/// hash (spec.md §4.3 step 2-3).
pub struct ParentContext {
    pub parent_beacon_root: Hash256,
    pub merge_transition_complete: bool,
    /// Post-merge: the parent's latest execution payload header block hash.
    pub post_merge_parent_hash: Option<ExecutionBlockHash>,
    pub safe_block_hash: ExecutionBlockHash,
    pub finalized_block_hash: ExecutionBlockHash,
    /// `TerminalBlockHash` config override (spec.md §4.3 step 2).
    pub terminal_block_hash_override: Option<ExecutionBlockHash>,
    pub bellatrix_activation_epoch_reached: bool,
}

pub struct LocalPayloadRequest {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub parent_root: Hash256,
    pub parent: ParentContext,
    pub fork_name: ForkName,
    pub timestamp: u64,
    pub prev_randao: Hash256,
    pub withdrawals: Option<Vec<Withdrawal>>,
    pub parent_beacon_block_root: Option<Hash256>,
}

pub struct LocalPayloadResult {
    pub payload: ExecutionPayload,
    /// The local payload's value, compared against a builder bid's value in the Capella+
    /// tie-break (spec.md §4.2 step 2). Zero for the empty pre-activation payload.
    pub block_value: Gwei,
    pub blobs_bundle: Option<BlobsBundle>,
    pub should_override_builder: bool,
}

/// `ExecutionPayloadBuilder::setLocalPayload` (spec.md §4.3): drives the execution engine via
/// forkchoice-updated/get-payload, preferring a cached payload id when one is already in flight
/// for `(slot, parent_root)`.
pub struct ExecutionPayloadBuilder {
    engine: Arc<dyn ExecutionEngine>,
    payload_id_cache: Arc<PayloadIdCache>,
    fee_recipients: Arc<FeeRecipientResolver>,
    log: Logger,
}

impl ExecutionPayloadBuilder {
    pub fn new(
        engine: Arc<dyn ExecutionEngine>,
        payload_id_cache: Arc<PayloadIdCache>,
        fee_recipients: Arc<FeeRecipientResolver>,
        log: Logger,
    ) -> Self {
        Self {
            engine,
            payload_id_cache,
            fee_recipients,
            log,
        }
    }

    pub fn set_local_payload(
        &self,
        request: LocalPayloadRequest,
    ) -> Result<LocalPayloadResult, PayloadBuilderError> {
        let fee_recipient = self.fee_recipients.resolve(request.proposer_index);

        // Step 1: a cached payload id already in flight for this (slot, parent_root).
        if let Some(entry) = self.payload_id_cache.get(request.slot, request.parent_root) {
            if entry.proposer_index == request.proposer_index {
                if let Some(payload_id) = entry.payload_id {
                    match self.engine.get_payload(payload_id, request.slot) {
                        Ok(response) => {
                            self.fee_recipients.check_mismatch(
                                request.proposer_index,
                                fee_recipient,
                                response.payload.fee_recipient(),
                            );
                            return Ok(LocalPayloadResult {
                                payload: response.payload,
                                block_value: response.block_value,
                                blobs_bundle: response.blobs_bundle,
                                should_override_builder: response.should_override_builder,
                            });
                        }
                        Err(EngineError::DeadlineExceeded) => {
                            debug!(self.log, "payload id cache hit timed out, rebuilding"; "slot" => request.slot.as_u64());
                        }
                        Err(e) => return Err(e.into()),
                    }
                }
            }
        }

        // Step 2: resolve the parent block hash and check merge activation.
        let parent_hash = if request.parent.merge_transition_complete {
            request
                .parent
                .post_merge_parent_hash
                .unwrap_or_else(ExecutionBlockHash::zero)
        } else {
            match request.parent.terminal_block_hash_override {
                Some(hash) => hash,
                None => self
                    .engine
                    .get_terminal_block_hash(request.timestamp)?
                    .unwrap_or_else(ExecutionBlockHash::zero),
            }
        };

        if !request.parent.bellatrix_activation_epoch_reached {
            return Ok(LocalPayloadResult {
                payload: empty_payload(request.fork_name, parent_hash),
                block_value: 0,
                blobs_bundle: None,
                should_override_builder: false,
            });
        }

        // Step 3: compose the forkchoice state and payload attributes.
        let forkchoice_state = ForkchoiceState {
            head_block_hash: parent_hash,
            safe_block_hash: request.parent.safe_block_hash,
            finalized_block_hash: request.parent.finalized_block_hash,
        };
        let attributes = PayloadAttributes {
            timestamp: request.timestamp,
            prev_randao: request.prev_randao,
            fee_recipient,
            withdrawals: if request.fork_name.withdrawals_enabled() {
                Some(request.withdrawals.unwrap_or_default())
            } else {
                None
            },
            parent_beacon_block_root: if request.fork_name.blobs_enabled() {
                request.parent_beacon_block_root
            } else {
                None
            },
        };

        // Step 4: forkchoiceUpdated. A nil payload id is fatal.
        let payload_id = self
            .engine
            .forkchoice_updated(forkchoice_state, Some(attributes))?
            .ok_or(PayloadBuilderError::NoPayloadId)?;

        self.payload_id_cache.set_payload_id(
            request.slot,
            request.parent_root,
            request.proposer_index,
            payload_id,
        );

        // Step 5: getPayload.
        let response = self.engine.get_payload(payload_id, request.slot)?;
        self.fee_recipients.check_mismatch(
            request.proposer_index,
            fee_recipient,
            response.payload.fee_recipient(),
        );

        if response.payload.fee_recipient() != fee_recipient {
            warn!(self.log, "execution engine returned a different fee recipient than requested");
        }

        Ok(LocalPayloadResult {
            payload: response.payload,
            block_value: response.block_value,
            blobs_bundle: response.blobs_bundle,
            should_override_builder: response.should_override_builder,
        })
    }
}

/// An empty-but-well-formed payload, returned before the Bellatrix activation epoch is reached
/// (spec.md §4.3 step 2).
fn empty_payload(fork_name: ForkName, parent_hash: ExecutionBlockHash) -> ExecutionPayload {
    match fork_name {
        ForkName::Base | ForkName::Altair | ForkName::Bellatrix => {
            ExecutionPayload::Bellatrix(ExecutionPayloadBellatrix {
                parent_hash,
                fee_recipient: Address::zero(),
                state_root: Hash256::zero(),
                receipts_root: Hash256::zero(),
                logs_bloom: vec![],
                prev_randao: Hash256::zero(),
                block_number: 0,
                gas_limit: 0,
                gas_used: 0,
                timestamp: 0,
                extra_data: vec![],
                base_fee_per_gas: types::Uint256::zero(),
                block_hash: ExecutionBlockHash::zero(),
                transactions: vec![],
            })
        }
        ForkName::Capella => ExecutionPayload::Capella(ExecutionPayloadCapella {
            parent_hash,
            fee_recipient: Address::zero(),
            state_root: Hash256::zero(),
            receipts_root: Hash256::zero(),
            logs_bloom: vec![],
            prev_randao: Hash256::zero(),
            block_number: 0,
            gas_limit: 0,
            gas_used: 0,
            timestamp: 0,
            extra_data: vec![],
            base_fee_per_gas: types::Uint256::zero(),
            block_hash: ExecutionBlockHash::zero(),
            transactions: vec![],
            withdrawals: vec![],
        }),
        ForkName::Deneb => ExecutionPayload::Deneb(ExecutionPayloadDeneb {
            parent_hash,
            fee_recipient: Address::zero(),
            state_root: Hash256::zero(),
            receipts_root: Hash256::zero(),
            logs_bloom: vec![],
            prev_randao: Hash256::zero(),
            block_number: 0,
            gas_limit: 0,
            gas_used: 0,
            timestamp: 0,
            extra_data: vec![],
            base_fee_per_gas: types::Uint256::zero(),
            block_hash: ExecutionBlockHash::zero(),
            transactions: vec![],
            withdrawals: vec![],
            blob_gas_used: 0,
            excess_blob_gas: 0,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeExecutionEngine;
    use parking_lot::Mutex;

    fn request(slot: Slot, parent_root: Hash256, activation_reached: bool) -> LocalPayloadRequest {
        LocalPayloadRequest {
            slot,
            proposer_index: 3,
            parent_root,
            parent: ParentContext {
                parent_beacon_root: Hash256::zero(),
                merge_transition_complete: true,
                post_merge_parent_hash: Some(ExecutionBlockHash::zero()),
                safe_block_hash: ExecutionBlockHash::zero(),
                finalized_block_hash: ExecutionBlockHash::zero(),
                terminal_block_hash_override: None,
                bellatrix_activation_epoch_reached: activation_reached,
            },
            fork_name: ForkName::Capella,
            timestamp: 12,
            prev_randao: Hash256::zero(),
            withdrawals: Some(vec![]),
            parent_beacon_block_root: None,
        }
    }

    fn builder(engine: Arc<FakeExecutionEngine>) -> ExecutionPayloadBuilder {
        ExecutionPayloadBuilder::new(
            engine,
            Arc::new(PayloadIdCache::new()),
            Arc::new(FeeRecipientResolver::new(None, logging::test_logger())),
            logging::test_logger(),
        )
    }

    #[test]
    fn returns_empty_payload_before_activation_epoch() {
        let engine = Arc::new(FakeExecutionEngine::default());
        let result = builder(engine)
            .set_local_payload(request(Slot::new(10), Hash256::zero(), false))
            .unwrap();
        assert!(result.payload.is_default_with_empty_roots());
        assert!(!result.should_override_builder);
    }

    #[test]
    fn cache_miss_drives_forkchoice_updated_then_get_payload() {
        let engine = Arc::new(FakeExecutionEngine::default());
        let result = builder(engine.clone())
            .set_local_payload(request(Slot::new(10), Hash256::zero(), true))
            .unwrap();
        assert!(!result.payload.is_default_with_empty_roots() || result.payload.block_number() == 0);
        assert_eq!(*engine.forkchoice_updated_calls.lock(), 1);
        assert_eq!(*engine.get_payload_calls.lock(), 1);
    }

    #[test]
    fn nil_payload_id_is_fatal() {
        let engine = Arc::new(FakeExecutionEngine {
            payload_id: Mutex::new(None),
            ..Default::default()
        });
        let err = builder(engine)
            .set_local_payload(request(Slot::new(10), Hash256::zero(), true))
            .unwrap_err();
        assert!(matches!(err, PayloadBuilderError::NoPayloadId));
    }

    #[test]
    fn deadline_exceeded_on_cache_hit_falls_through_to_fresh_build() {
        let engine = Arc::new(FakeExecutionEngine {
            fail_first_get_payload: Mutex::new(true),
            ..Default::default()
        });
        let b = builder(engine.clone());
        let cache = &b.payload_id_cache;
        cache.insert_placeholder(Slot::new(10), Hash256::zero(), 3);
        cache.set_payload_id(Slot::new(10), Hash256::zero(), 3, [9u8; 8]);

        let result = b
            .set_local_payload(request(Slot::new(10), Hash256::zero(), true))
            .unwrap();
        assert_eq!(result.payload.block_number(), 0);
        assert_eq!(*engine.forkchoice_updated_calls.lock(), 1);
        assert_eq!(*engine.get_payload_calls.lock(), 2);
    }
}
