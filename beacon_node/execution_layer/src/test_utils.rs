use crate::circuit_breaker::ForkChoiceView;
use crate::engine::{EngineError, ExecutionEngine, ForkchoiceState, GetPayloadResponse, PayloadAttributes};
use parking_lot::Mutex;
use types::{
    Address, ExecutionBlockHash, ExecutionPayload, ExecutionPayloadCapella, Hash256, PayloadId,
    Slot, Uint256,
};

/// A fake `ExecutionEngine` for exercising `ExecutionPayloadBuilder` without a real execution
/// client (mirrors the teacher's `test_utils` convention of one hand-rolled fake per external
/// trait).
pub struct FakeExecutionEngine {
    pub payload_id: Mutex<Option<PayloadId>>,
    pub terminal_block_hash: Mutex<Option<ExecutionBlockHash>>,
    pub forkchoice_updated_calls: Mutex<u32>,
    pub get_payload_calls: Mutex<u32>,
    /// When true, the first `get_payload` call returns `DeadlineExceeded`; subsequent calls
    /// succeed.
    pub fail_first_get_payload: Mutex<bool>,
}

impl Default for FakeExecutionEngine {
    fn default() -> Self {
        Self {
            payload_id: Mutex::new(Some([1u8; 8])),
            terminal_block_hash: Mutex::new(Some(ExecutionBlockHash::zero())),
            forkchoice_updated_calls: Mutex::new(0),
            get_payload_calls: Mutex::new(0),
            fail_first_get_payload: Mutex::new(false),
        }
    }
}

impl ExecutionEngine for FakeExecutionEngine {
    fn forkchoice_updated(
        &self,
        _state: ForkchoiceState,
        _payload_attributes: Option<PayloadAttributes>,
    ) -> Result<Option<PayloadId>, EngineError> {
        *self.forkchoice_updated_calls.lock() += 1;
        Ok(*self.payload_id.lock())
    }

    fn get_payload(&self, _payload_id: PayloadId, _slot: Slot) -> Result<GetPayloadResponse, EngineError> {
        let mut calls = self.get_payload_calls.lock();
        *calls += 1;
        let mut fail_first = self.fail_first_get_payload.lock();
        if *fail_first && *calls == 1 {
            *fail_first = false;
            return Err(EngineError::DeadlineExceeded);
        }
        Ok(GetPayloadResponse {
            payload: ExecutionPayload::Capella(ExecutionPayloadCapella {
                parent_hash: ExecutionBlockHash::zero(),
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
                base_fee_per_gas: Uint256::zero(),
                block_hash: ExecutionBlockHash::zero(),
                transactions: vec![],
                withdrawals: vec![],
            }),
            block_value: 100,
            blobs_bundle: None,
            should_override_builder: false,
        })
    }

    fn get_terminal_block_hash(
        &self,
        _terminal_total_difficulty_timestamp: u64,
    ) -> Result<Option<ExecutionBlockHash>, EngineError> {
        Ok(*self.terminal_block_hash.lock())
    }
}

/// A fake `ForkChoiceView` for `CircuitBreaker` tests in downstream crates.
pub struct FakeForkChoiceView {
    pub highest_received_slot: Option<Slot>,
    pub blocks_received_in_last_epoch: u64,
}

impl ForkChoiceView for FakeForkChoiceView {
    fn highest_received_slot(&self) -> Option<Slot> {
        self.highest_received_slot
    }

    fn blocks_received_in_last_epoch(&self, _current_slot: Slot, _slots_per_epoch: u64) -> u64 {
        self.blocks_received_in_last_epoch
    }
}
