use crate::error::RpcError;
use crate::p2p::{BlockReceiver, GossipMessage, P2P};
use beacon_chain::{require_synced, BeaconStateView, ChainView, MerkleHasher};
use builder_client::{BuilderClient, HeaderRequest};
use execution_layer::{CircuitBreaker, ExecutionPayloadBuilder, ForkChoiceView, LocalPayloadRequest, ParentContext};
use metrics::IntCounter;
use operation_pool::{AttestationPool, ExitPool, SlashingPool, SyncCommitteePool};
use slog::{debug, Logger};
use std::sync::Arc;
use types::{
    Address, BeaconBlock, BeaconBlockAltair, BeaconBlockBase, BeaconBlockBellatrix,
    BeaconBlockBodyAltair, BeaconBlockBodyBase, BeaconBlockBodyBellatrix, BeaconBlockBodyCapella,
    BeaconBlockBodyDeneb, BeaconBlockCapella, BeaconBlockDeneb, BlobsBundle, ChainSpec, Eth1Data,
    ExecutionPayload, ExecutionPayloadHeader, ForkName, Gwei, Graffiti, Hash256, SignatureBytes,
    Slot, SyncAggregate, ValidatorIndex,
};

/// `calculate state root` (spec.md §4.2 step 4), applied to the parent state and an unsigned
/// block whose `state_root` field is still zeroed. SSZ state transition itself is out of scope
/// (spec.md §1); this is the one seam a full node's state-transition function plugs into.
pub trait StateRootCalculator: Send + Sync {
    fn calculate_state_root(
        &self,
        state: &dyn BeaconStateView,
        block: &BeaconBlock,
    ) -> Result<Hash256, String>;
}

/// Per-validator builder registration (spec.md §6, "validator-to-builder registration records").
#[derive(Debug, Clone, Copy)]
pub struct BuilderRegistration {
    pub fee_recipient: Address,
    pub gas_limit: u64,
}

pub struct GetBeaconBlockRequest {
    pub slot: Slot,
    pub proposer_index: ValidatorIndex,
    pub proposer_pubkey: types::PublicKeyBytes,
    pub randao_reveal: SignatureBytes,
    pub graffiti: Graffiti,
    pub eth1_data: Eth1Data,
    pub builder_registration: Option<BuilderRegistration>,
    pub parent_beacon_block_root: Option<Hash256>,
}

pub enum ExecutionDataChoice {
    Local,
    Builder,
}

/// The Capella+ tie-break and pre-Capella preference rule (spec.md §4.2 step 2, §8 invariant and
/// scenario 3), factored out as a pure function so it is directly testable.
pub fn choose_execution_data(
    fork_name: ForkName,
    local_value: Gwei,
    local_withdrawals_root: Option<Hash256>,
    builder: Option<(Gwei, Option<Hash256>)>,
) -> ExecutionDataChoice {
    let Some((builder_value, builder_withdrawals_root)) = builder else {
        return ExecutionDataChoice::Local;
    };

    let use_builder = if fork_name.withdrawals_enabled() {
        builder_value > local_value && builder_withdrawals_root == local_withdrawals_root
    } else {
        true
    };

    if use_builder {
        ExecutionDataChoice::Builder
    } else {
        ExecutionDataChoice::Local
    }
}

/// Orchestrates `GetBeaconBlock`/`ProposeBeaconBlock`/`unblindBuilderBlock` (spec.md §4.2).
pub struct ProposalPipeline {
    chain: Arc<dyn ChainView>,
    payload_builder: Arc<ExecutionPayloadBuilder>,
    builder_client: Option<Arc<BuilderClient>>,
    circuit_breaker: Arc<CircuitBreaker>,
    fork_choice: Option<Arc<dyn ForkChoiceView>>,
    slashing_pool: Arc<dyn SlashingPool>,
    exit_pool: Arc<dyn ExitPool>,
    sync_committee_pool: Arc<dyn SyncCommitteePool>,
    attestation_pool: Arc<dyn AttestationPool>,
    state_root_calculator: Arc<dyn StateRootCalculator>,
    merkle_hasher: Arc<dyn MerkleHasher>,
    p2p: Arc<dyn P2P>,
    block_receiver: Arc<dyn BlockReceiver>,
    spec: ChainSpec,
    proposal_requests_total: Option<IntCounter>,
    proposal_errors_total: Option<IntCounter>,
    log: Logger,
}

impl ProposalPipeline {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chain: Arc<dyn ChainView>,
        payload_builder: Arc<ExecutionPayloadBuilder>,
        builder_client: Option<Arc<BuilderClient>>,
        circuit_breaker: Arc<CircuitBreaker>,
        fork_choice: Option<Arc<dyn ForkChoiceView>>,
        slashing_pool: Arc<dyn SlashingPool>,
        exit_pool: Arc<dyn ExitPool>,
        sync_committee_pool: Arc<dyn SyncCommitteePool>,
        attestation_pool: Arc<dyn AttestationPool>,
        state_root_calculator: Arc<dyn StateRootCalculator>,
        merkle_hasher: Arc<dyn MerkleHasher>,
        p2p: Arc<dyn P2P>,
        block_receiver: Arc<dyn BlockReceiver>,
        spec: ChainSpec,
        proposal_requests_total: Option<IntCounter>,
        proposal_errors_total: Option<IntCounter>,
        log: Logger,
    ) -> Self {
        Self {
            chain,
            payload_builder,
            builder_client,
            circuit_breaker,
            fork_choice,
            slashing_pool,
            exit_pool,
            sync_committee_pool,
            attestation_pool,
            state_root_calculator,
            merkle_hasher,
            p2p,
            block_receiver,
            spec,
            proposal_requests_total,
            proposal_errors_total,
            log,
        }
    }

    pub fn get_beacon_block(
        &self,
        request: GetBeaconBlockRequest,
    ) -> Result<(BeaconBlock, Option<BlobsBundle>), RpcError> {
        self.inc(&self.proposal_requests_total);

        let result = self.get_beacon_block_inner(request);
        if result.is_err() {
            self.inc(&self.proposal_errors_total);
        }
        result
    }

    fn get_beacon_block_inner(
        &self,
        request: GetBeaconBlockRequest,
    ) -> Result<(BeaconBlock, Option<BlobsBundle>), RpcError> {
        require_synced(self.chain.as_ref()).map_err(RpcError::from)?;

        let state = self.chain.head_state();
        let fork_name = state.fork_name();

        if fork_name.execution_enabled() && self.chain.optimistic() {
            return Err(RpcError::FailedPrecondition(
                "head is optimistic, cannot propose".into(),
            ));
        }

        let parent_root = self.chain.head_root();
        let parent_slot = request.slot.saturating_sub(Slot::new(1));

        let attestations = self.attestation_pool.for_block_inclusion(parent_slot);
        let proposer_slashings = self.slashing_pool.proposer_slashings();
        let attester_slashings = self.slashing_pool.attester_slashings();
        let voluntary_exits = self.exit_pool.voluntary_exits();
        let sync_aggregate = self
            .sync_committee_pool
            .get_aggregate(parent_slot, parent_root);

        let (execution_payload, execution_payload_header, blobs_bundle) = if fork_name.execution_enabled() {
            self.resolve_execution_data(&request, fork_name, parent_root)?
        } else {
            (None, None, None)
        };

        let blob_kzg_commitments = blobs_bundle
            .as_ref()
            .map(|b| b.commitments.clone())
            .unwrap_or_default();

        let body = self.build_body(
            fork_name,
            &request,
            proposer_slashings,
            attester_slashings,
            attestations,
            voluntary_exits,
            sync_aggregate,
            execution_payload,
            execution_payload_header,
            blob_kzg_commitments,
        );

        let mut block = self.assemble_block(fork_name, request.slot, request.proposer_index, parent_root, body);

        let state_root = self
            .state_root_calculator
            .calculate_state_root(state.as_ref(), &block)
            .map_err(RpcError::Internal)?;
        set_state_root(&mut block, state_root);

        Ok((block, blobs_bundle))
    }

    fn resolve_execution_data(
        &self,
        request: &GetBeaconBlockRequest,
        fork_name: ForkName,
        head_root: Hash256,
    ) -> Result<(Option<ExecutionPayload>, Option<ExecutionPayloadHeader>, Option<BlobsBundle>), RpcError> {
        let head_parent_hash = self.chain.head_block_parent_hash();
        let slot_timestamp = self.slot_timestamp(request.slot);

        let local_request = LocalPayloadRequest {
            slot: request.slot,
            proposer_index: request.proposer_index,
            parent_root: head_root,
            parent: ParentContext {
                parent_beacon_root: head_root,
                merge_transition_complete: true,
                post_merge_parent_hash: Some(head_parent_hash),
                safe_block_hash: self
                    .chain
                    .unrealized_justified_payload_block_hash()
                    .unwrap_or(head_parent_hash),
                finalized_block_hash: self.chain.finalized_block_hash().unwrap_or(head_parent_hash),
                terminal_block_hash_override: None,
                bellatrix_activation_epoch_reached: true,
            },
            fork_name,
            timestamp: slot_timestamp,
            prev_randao: Hash256::zero(),
            withdrawals: Some(vec![]),
            parent_beacon_block_root: request.parent_beacon_block_root,
        };

        let local = self
            .payload_builder
            .set_local_payload(local_request)
            .map_err(|e| RpcError::Internal(e.to_string()))?;

        let builder_bid = request
            .builder_registration
            .filter(|_| self.circuit_breaker.is_closed(self.fork_choice.as_deref(), request.slot))
            .and_then(|_| {
                self.builder_client.as_ref().and_then(|builder| {
                    builder.get_payload_header(HeaderRequest {
                        slot: request.slot,
                        head_parent_hash,
                        proposer_pubkey: request.proposer_pubkey,
                        slot_timestamp,
                    })
                })
            });

        let choice = choose_execution_data(
            fork_name,
            local.block_value,
            local.payload.withdrawals_root(),
            builder_bid.as_ref().map(|b| (b.value, b.header.withdrawals_root())),
        );

        match choice {
            ExecutionDataChoice::Builder => {
                let bid = builder_bid.expect("builder choice implies a bid was present");
                debug!(self.log, "using builder payload"; "slot" => request.slot.as_u64(), "value" => bid.value);
                Ok((None, Some(bid.header), None))
            }
            ExecutionDataChoice::Local => {
                if builder_bid.is_some() {
                    debug!(self.log, "builder bid present but did not win tie-break"; "slot" => request.slot.as_u64());
                }
                let bundle = if fork_name.blobs_enabled() {
                    local.blobs_bundle.filter(|b| !b.is_empty())
                } else {
                    None
                };
                Ok((Some(local.payload), None, bundle))
            }
        }
    }

    fn slot_timestamp(&self, slot: Slot) -> u64 {
        self.chain.genesis_time()
            + slot.as_u64() * (self.spec.milliseconds_per_slot / 1000)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_body(
        &self,
        fork_name: ForkName,
        request: &GetBeaconBlockRequest,
        proposer_slashings: Vec<types::ProposerSlashing>,
        attester_slashings: Vec<types::AttesterSlashing>,
        attestations: Vec<types::Attestation>,
        voluntary_exits: Vec<types::SignedVoluntaryExit>,
        sync_aggregate: Option<SyncAggregate>,
        execution_payload: Option<ExecutionPayload>,
        execution_payload_header: Option<ExecutionPayloadHeader>,
        blob_kzg_commitments: Vec<types::KzgCommitment>,
    ) -> types::BeaconBlockBody {
        let empty_sync_aggregate = || SyncAggregate {
            sync_committee_bits: types::AggregationBits::with_capacity(0),
            sync_committee_signature: SignatureBytes::zero(),
        };

        match fork_name {
            ForkName::Base => types::BeaconBlockBody::Base(BeaconBlockBodyBase {
                randao_reveal: request.randao_reveal,
                eth1_data: request.eth1_data.clone(),
                graffiti: request.graffiti,
                proposer_slashings,
                attester_slashings,
                attestations,
                deposits: vec![],
                voluntary_exits,
            }),
            ForkName::Altair => types::BeaconBlockBody::Altair(BeaconBlockBodyAltair {
                randao_reveal: request.randao_reveal,
                eth1_data: request.eth1_data.clone(),
                graffiti: request.graffiti,
                proposer_slashings,
                attester_slashings,
                attestations,
                deposits: vec![],
                voluntary_exits,
                sync_aggregate: sync_aggregate.unwrap_or_else(empty_sync_aggregate),
            }),
            ForkName::Bellatrix => types::BeaconBlockBody::Bellatrix(BeaconBlockBodyBellatrix {
                randao_reveal: request.randao_reveal,
                eth1_data: request.eth1_data.clone(),
                graffiti: request.graffiti,
                proposer_slashings,
                attester_slashings,
                attestations,
                deposits: vec![],
                voluntary_exits,
                sync_aggregate: sync_aggregate.unwrap_or_else(empty_sync_aggregate),
                execution_payload,
                execution_payload_header,
            }),
            ForkName::Capella => types::BeaconBlockBody::Capella(BeaconBlockBodyCapella {
                randao_reveal: request.randao_reveal,
                eth1_data: request.eth1_data.clone(),
                graffiti: request.graffiti,
                proposer_slashings,
                attester_slashings,
                attestations,
                deposits: vec![],
                voluntary_exits,
                sync_aggregate: sync_aggregate.unwrap_or_else(empty_sync_aggregate),
                execution_payload,
                execution_payload_header,
            }),
            ForkName::Deneb => types::BeaconBlockBody::Deneb(BeaconBlockBodyDeneb {
                randao_reveal: request.randao_reveal,
                eth1_data: request.eth1_data.clone(),
                graffiti: request.graffiti,
                proposer_slashings,
                attester_slashings,
                attestations,
                deposits: vec![],
                voluntary_exits,
                sync_aggregate: sync_aggregate.unwrap_or_else(empty_sync_aggregate),
                execution_payload,
                execution_payload_header,
                blob_kzg_commitments,
            }),
        }
    }

    fn assemble_block(
        &self,
        fork_name: ForkName,
        slot: Slot,
        proposer_index: ValidatorIndex,
        parent_root: Hash256,
        body: types::BeaconBlockBody,
    ) -> BeaconBlock {
        match (fork_name, body) {
            (ForkName::Base, types::BeaconBlockBody::Base(body)) => BeaconBlock::Base(BeaconBlockBase {
                slot,
                proposer_index,
                parent_root,
                state_root: Hash256::zero(),
                body,
            }),
            (ForkName::Altair, types::BeaconBlockBody::Altair(body)) => {
                BeaconBlock::Altair(BeaconBlockAltair {
                    slot,
                    proposer_index,
                    parent_root,
                    state_root: Hash256::zero(),
                    body,
                })
            }
            (ForkName::Bellatrix, types::BeaconBlockBody::Bellatrix(body)) => {
                BeaconBlock::Bellatrix(BeaconBlockBellatrix {
                    slot,
                    proposer_index,
                    parent_root,
                    state_root: Hash256::zero(),
                    body,
                })
            }
            (ForkName::Capella, types::BeaconBlockBody::Capella(body)) => {
                BeaconBlock::Capella(BeaconBlockCapella {
                    slot,
                    proposer_index,
                    parent_root,
                    state_root: Hash256::zero(),
                    body,
                })
            }
            (ForkName::Deneb, types::BeaconBlockBody::Deneb(body)) => BeaconBlock::Deneb(BeaconBlockDeneb {
                slot,
                proposer_index,
                parent_root,
                state_root: Hash256::zero(),
                body,
            }),
            _ => unreachable!("build_body always produces the body variant matching fork_name"),
        }
    }

    /// `ProposeBeaconBlock` (spec.md §4.2): broadcast then hand off to the block receiver.
    /// Errors from either collaborator surface as `Internal` (spec.md §6).
    pub fn propose_beacon_block(
        &self,
        signed_block: types::SignedBeaconBlock,
        block_root: Hash256,
    ) -> Result<Hash256, RpcError> {
        self.p2p
            .broadcast(GossipMessage::Block(signed_block.clone()))
            .map_err(|e| RpcError::Internal(e.to_string()))?;
        self.block_receiver
            .receive_block(&signed_block, block_root)
            .map_err(|e| RpcError::Internal(e.to_string()))?;
        Ok(block_root)
    }

    /// Blob Sidecar Construction (spec.md §4.8): wraps a Deneb+ blobs bundle into one sidecar per
    /// blob, sourcing each inclusion proof from the configured `MerkleHasher`, then gossips them.
    pub fn construct_and_broadcast_blob_sidecars(
        &self,
        signed_block: &types::SignedBeaconBlock,
        block_root: Hash256,
        bundle: &BlobsBundle,
    ) -> Result<Vec<types::BlobSidecar>, RpcError> {
        let total = bundle.len();
        let sidecars = crate::blob_sidecars::construct_blob_sidecars(
            signed_block,
            block_root,
            bundle,
            |i| self.merkle_hasher.commitment_inclusion_proof(i, total),
        )
        .map_err(|e| RpcError::Internal(e.to_string()))?;

        for sidecar in &sidecars {
            self.p2p
                .broadcast(GossipMessage::BlobSidecar(sidecar.clone()))
                .map_err(|e| RpcError::Internal(e.to_string()))?;
        }

        Ok(sidecars)
    }

    /// `unblindBuilderBlock` (spec.md §4.2): exchanges a blinded signed block for the builder's
    /// full payload and grafts it back into the body.
    pub fn unblind_builder_block(
        &self,
        mut signed_block: types::SignedBeaconBlock,
        block_root: Hash256,
    ) -> Result<types::SignedBeaconBlock, RpcError> {
        let builder = self
            .builder_client
            .as_ref()
            .ok_or_else(|| RpcError::Internal("no builder configured to unblind this block".into()))?;

        let header = extract_header(&signed_block.message)
            .ok_or_else(|| RpcError::Internal("block is not blinded".into()))?
            .clone();

        let full_payload = builder
            .submit_blinded_block(block_root, &header)
            .map_err(|e| RpcError::Internal(e.to_string()))?;

        graft_payload(&mut signed_block.message, full_payload);
        Ok(signed_block)
    }

    fn inc(&self, counter: &Option<IntCounter>) {
        if let Some(c) = counter {
            c.inc();
        }
    }
}

fn extract_header(block: &BeaconBlock) -> Option<&ExecutionPayloadHeader> {
    match block {
        BeaconBlock::Bellatrix(b) => b.body.execution_payload_header.as_ref(),
        BeaconBlock::Capella(b) => b.body.execution_payload_header.as_ref(),
        BeaconBlock::Deneb(b) => b.body.execution_payload_header.as_ref(),
        _ => None,
    }
}

fn graft_payload(block: &mut BeaconBlock, payload: ExecutionPayload) {
    match block {
        BeaconBlock::Bellatrix(b) => {
            b.body.execution_payload = Some(payload);
            b.body.execution_payload_header = None;
        }
        BeaconBlock::Capella(b) => {
            b.body.execution_payload = Some(payload);
            b.body.execution_payload_header = None;
        }
        BeaconBlock::Deneb(b) => {
            b.body.execution_payload = Some(payload);
            b.body.execution_payload_header = None;
        }
        _ => {}
    }
}

fn set_state_root(block: &mut BeaconBlock, state_root: Hash256) {
    match block {
        BeaconBlock::Base(b) => b.state_root = state_root,
        BeaconBlock::Altair(b) => b.state_root = state_root,
        BeaconBlock::Bellatrix(b) => b.state_root = state_root,
        BeaconBlock::Capella(b) => b.state_root = state_root,
        BeaconBlock::Deneb(b) => b.state_root = state_root,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_wins_tie_break_post_capella() {
        // spec.md §8 scenario 3, first case: local=100, builder=150, matching withdrawals root.
        let root = Hash256::repeat_byte(7);
        let choice = choose_execution_data(ForkName::Capella, 100, Some(root), Some((150, Some(root))));
        assert!(matches!(choice, ExecutionDataChoice::Builder));
    }

    #[test]
    fn local_used_when_withdrawals_roots_differ() {
        // spec.md §8 scenario 3, second case.
        let choice = choose_execution_data(
            ForkName::Capella,
            100,
            Some(Hash256::repeat_byte(1)),
            Some((150, Some(Hash256::repeat_byte(2)))),
        );
        assert!(matches!(choice, ExecutionDataChoice::Local));
    }

    #[test]
    fn local_used_when_builder_value_not_greater() {
        let root = Hash256::repeat_byte(7);
        let choice = choose_execution_data(ForkName::Capella, 200, Some(root), Some((150, Some(root))));
        assert!(matches!(choice, ExecutionDataChoice::Local));
    }

    #[test]
    fn pre_capella_prefers_builder_regardless_of_withdrawals() {
        let choice = choose_execution_data(ForkName::Bellatrix, 100, None, Some((1, None)));
        assert!(matches!(choice, ExecutionDataChoice::Builder));
    }

    #[test]
    fn no_builder_bid_uses_local() {
        let choice = choose_execution_data(ForkName::Capella, 100, Some(Hash256::zero()), None);
        assert!(matches!(choice, ExecutionDataChoice::Local));
    }

    use crate::test_utils::{FakeBlockReceiver, FakeMerkleHasher, FakeP2P, FakeStateRootCalculator};
    use beacon_chain::test_utils::{FakeBeaconState, FakeChainView};
    use builder_client::test_utils::{FakeBlsVerifier, FakeBuilder};
    use execution_layer::test_utils::FakeExecutionEngine;
    use execution_layer::{CircuitBreaker, ExecutionPayloadBuilder};
    use execution_layer::fee_recipient::FeeRecipientResolver;
    use execution_layer::payload_id_cache::PayloadIdCache;
    use operation_pool::test_utils::{FakeAttestationPool, FakeExitPool, FakeSlashingPool, FakeSyncCommitteePool};
    use types::{ExecutionBlockHash, SignedBeaconBlock, Validator, FAR_FUTURE_EPOCH};

    fn active_validator(pubkey: types::PublicKeyBytes, index_marker: u8) -> Validator {
        Validator {
            pubkey,
            withdrawal_credentials: Hash256::repeat_byte(index_marker),
            effective_balance: 32_000_000_000,
            slashed: false,
            activation_eligibility_epoch: types::Epoch::new(0),
            activation_epoch: types::Epoch::new(0),
            exit_epoch: FAR_FUTURE_EPOCH,
            withdrawable_epoch: FAR_FUTURE_EPOCH,
        }
    }

    fn fixture_pipeline(
        optimistic: bool,
        state_root: Hash256,
    ) -> (ProposalPipeline, Arc<FakeChainView>, Arc<FakeP2P>, Arc<FakeBlockReceiver>) {
        let pubkey = types::PublicKeyBytes([4u8; 48]);
        let mut state = FakeBeaconState::new(vec![active_validator(pubkey, 1)]).with_proposer(Slot::new(10), 0);
        state.fork_name = ForkName::Capella;
        let mut chain = FakeChainView::new(state);
        chain.optimistic = optimistic;
        let chain = Arc::new(chain);

        let engine = Arc::new(FakeExecutionEngine::default());
        let payload_builder = Arc::new(ExecutionPayloadBuilder::new(
            engine,
            Arc::new(PayloadIdCache::new()),
            Arc::new(FeeRecipientResolver::new(None, logging::test_logger())),
            logging::test_logger(),
        ));

        let p2p = Arc::new(FakeP2P::default());
        let block_receiver = Arc::new(FakeBlockReceiver::default());

        let pipeline = ProposalPipeline::new(
            chain.clone(),
            payload_builder,
            None,
            Arc::new(CircuitBreaker::new(3, 8, 32, None)),
            None,
            Arc::new(FakeSlashingPool::default()),
            Arc::new(FakeExitPool::default()),
            Arc::new(FakeSyncCommitteePool::default()),
            Arc::new(FakeAttestationPool::default()),
            Arc::new(FakeStateRootCalculator { state_root }),
            Arc::new(FakeMerkleHasher { proof: vec![] }),
            p2p.clone(),
            block_receiver.clone(),
            ChainSpec::mainnet(),
            None,
            None,
            logging::test_logger(),
        );

        (pipeline, chain, p2p, block_receiver)
    }

    fn block_request() -> GetBeaconBlockRequest {
        GetBeaconBlockRequest {
            slot: Slot::new(10),
            proposer_index: 0,
            proposer_pubkey: types::PublicKeyBytes::zero(),
            randao_reveal: SignatureBytes::zero(),
            graffiti: Graffiti::zero(),
            eth1_data: Eth1Data {
                deposit_root: Hash256::zero(),
                deposit_count: 0,
                block_hash: Hash256::zero(),
            },
            builder_registration: None,
            parent_beacon_block_root: None,
        }
    }

    #[test]
    fn get_beacon_block_assembles_capella_block_with_local_payload() {
        let expected_root = Hash256::repeat_byte(9);
        let (pipeline, _chain, _p2p, _receiver) = fixture_pipeline(false, expected_root);

        let (block, _blobs) = pipeline.get_beacon_block(block_request()).unwrap();
        assert!(matches!(block, BeaconBlock::Capella(_)));
        assert_eq!(block.state_root(), expected_root);
        assert_eq!(block.slot(), Slot::new(10));
    }

    #[test]
    fn get_beacon_block_rejects_optimistic_head() {
        let (pipeline, _chain, _p2p, _receiver) = fixture_pipeline(true, Hash256::zero());
        let err = pipeline.get_beacon_block(block_request()).unwrap_err();
        assert!(matches!(err, RpcError::FailedPrecondition(_)));
    }

    #[test]
    fn propose_beacon_block_broadcasts_then_imports() {
        let (pipeline, _chain, p2p, receiver) = fixture_pipeline(false, Hash256::repeat_byte(1));
        let (block, _blobs) = pipeline.get_beacon_block(block_request()).unwrap();
        let signed = SignedBeaconBlock {
            message: block,
            signature: SignatureBytes::zero(),
        };

        let root = Hash256::repeat_byte(5);
        pipeline.propose_beacon_block(signed, root).unwrap();

        assert_eq!(p2p.broadcasts.lock().len(), 1);
        assert_eq!(*receiver.received.lock(), vec![root]);
    }

    #[test]
    fn unblind_builder_block_grafts_full_payload() {
        let (pipeline, _chain, _p2p, _receiver) = fixture_pipeline(false, Hash256::zero());
        let builder = Arc::new(builder_client::BuilderClient::new(
            Arc::new(FakeBuilder { bid: None }),
            Arc::new(FakeBlsVerifier { valid: true }),
            None,
            logging::test_logger(),
        ));
        let pipeline = ProposalPipeline { builder_client: Some(builder), ..pipeline };

        let header = ExecutionPayloadHeader::Capella(types::ExecutionPayloadHeaderCapella {
            parent_hash: ExecutionBlockHash::zero(),
            fee_recipient: Address::zero(),
            state_root: Hash256::zero(),
            receipts_root: Hash256::zero(),
            logs_bloom: vec![],
            prev_randao: Hash256::zero(),
            block_number: 1,
            gas_limit: 0,
            gas_used: 0,
            timestamp: 0,
            extra_data: vec![],
            base_fee_per_gas: types::Uint256::zero(),
            block_hash: ExecutionBlockHash::zero(),
            transactions_root: Hash256::zero(),
            withdrawals_root: Hash256::zero(),
        });

        let blinded = SignedBeaconBlock {
            message: BeaconBlock::Capella(BeaconBlockCapella {
                slot: Slot::new(10),
                proposer_index: 0,
                parent_root: Hash256::zero(),
                state_root: Hash256::zero(),
                body: BeaconBlockBodyCapella {
                    randao_reveal: SignatureBytes::zero(),
                    eth1_data: Eth1Data {
                        deposit_root: Hash256::zero(),
                        deposit_count: 0,
                        block_hash: Hash256::zero(),
                    },
                    graffiti: Graffiti::zero(),
                    proposer_slashings: vec![],
                    attester_slashings: vec![],
                    attestations: vec![],
                    deposits: vec![],
                    voluntary_exits: vec![],
                    sync_aggregate: SyncAggregate {
                        sync_committee_bits: types::AggregationBits::with_capacity(0),
                        sync_committee_signature: SignatureBytes::zero(),
                    },
                    execution_payload: None,
                    execution_payload_header: Some(header),
                },
            }),
            signature: SignatureBytes::zero(),
        };

        let unblinded = pipeline.unblind_builder_block(blinded, Hash256::zero()).unwrap();
        match unblinded.message {
            BeaconBlock::Capella(b) => {
                assert!(b.body.execution_payload.is_some());
                assert!(b.body.execution_payload_header.is_none());
            }
            _ => panic!("expected a Capella block"),
        }
    }

    #[test]
    fn construct_and_broadcast_blob_sidecars_wraps_and_gossips_each_blob() {
        let (pipeline, _chain, p2p, _receiver) = fixture_pipeline(false, Hash256::zero());
        let proof = vec![Hash256::repeat_byte(2)];
        let pipeline = ProposalPipeline {
            merkle_hasher: Arc::new(FakeMerkleHasher { proof: proof.clone() }),
            ..pipeline
        };

        let signed = SignedBeaconBlock {
            message: BeaconBlock::Deneb(BeaconBlockDeneb {
                slot: Slot::new(10),
                proposer_index: 0,
                parent_root: Hash256::zero(),
                state_root: Hash256::zero(),
                body: BeaconBlockBodyDeneb {
                    randao_reveal: SignatureBytes::zero(),
                    eth1_data: Eth1Data {
                        deposit_root: Hash256::zero(),
                        deposit_count: 0,
                        block_hash: Hash256::zero(),
                    },
                    graffiti: Graffiti::zero(),
                    proposer_slashings: vec![],
                    attester_slashings: vec![],
                    attestations: vec![],
                    deposits: vec![],
                    voluntary_exits: vec![],
                    sync_aggregate: SyncAggregate {
                        sync_committee_bits: types::AggregationBits::with_capacity(0),
                        sync_committee_signature: SignatureBytes::zero(),
                    },
                    execution_payload: None,
                    execution_payload_header: None,
                    blob_kzg_commitments: vec![[1u8; 48]],
                },
            }),
            signature: SignatureBytes::zero(),
        };

        let bundle = BlobsBundle {
            commitments: vec![[1u8; 48]],
            proofs: vec![[2u8; 48]],
            blobs: vec![vec![0u8; 4]],
        };

        let root = Hash256::repeat_byte(6);
        let sidecars = pipeline
            .construct_and_broadcast_blob_sidecars(&signed, root, &bundle)
            .unwrap();

        assert_eq!(sidecars.len(), 1);
        assert_eq!(sidecars[0].commitment_inclusion_proof, proof);
        assert_eq!(p2p.broadcasts.lock().len(), 1);
    }
}
