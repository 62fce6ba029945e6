use crate::error::RpcError;
use crate::p2p::{GossipMessage, P2P};
use crate::proposal_pipeline::{GetBeaconBlockRequest, ProposalPipeline};
use beacon_chain::{
    BeaconStateView, ChainView, DepositFetcher, DoppelgangerDetector, DoppelgangerQuery,
    DoppelgangerResult, DutyScheduler,
};
use operation_pool::AttestationPool;
use slog::{info, Logger};
use std::sync::Arc;
use types::{
    AggregateAndProof, BlobSidecar, BlobsBundle, ChainSpec, CommitteeIndex, DutiesResponse, Epoch,
    PublicKeyBytes, SignatureBytes, SignedAggregateAndProof, SignedBeaconBlock, Slot,
    ValidatorStatusResponse,
};

/// One `SubmitAggregateSelectionProof` request (spec.md §6: `{slot, committee_index,
/// slot_signature, pubkey}`). `committee_size`/`committee_position`/`aggregator_index` are
/// resolved from head state (spec.md §4.6 steps 2-3), not supplied by the caller.
pub struct AggregateSelectionRequest {
    pub slot: Slot,
    pub committee_index: CommitteeIndex,
    pub slot_signature: SignatureBytes,
    pub pubkey: PublicKeyBytes,
}

/// `StreamDuties`'s per-tick outcome (spec.md §4.10 state machine: "Sending → Waiting →
/// (Ticked | Reorg | Cancelled)").
pub enum DutyStreamEvent {
    Duties(Result<DutiesResponse, RpcError>),
    Cancelled,
}

/// Wires the duty scheduler, proposal pipeline, aggregation engine, status classifier and
/// doppelganger detector behind the single facade the §6 RPC table describes.
pub struct ValidatorRpc {
    chain: Arc<dyn ChainView>,
    duty_scheduler: Arc<DutyScheduler>,
    proposal_pipeline: Arc<ProposalPipeline>,
    attestation_pool: Arc<dyn AttestationPool>,
    deposit_fetcher: Option<Arc<dyn DepositFetcher>>,
    p2p: Arc<dyn P2P>,
    spec: ChainSpec,
    max_effective_balance_gwei: types::Gwei,
    log: Logger,
}

impl ValidatorRpc {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chain: Arc<dyn ChainView>,
        duty_scheduler: Arc<DutyScheduler>,
        proposal_pipeline: Arc<ProposalPipeline>,
        attestation_pool: Arc<dyn AttestationPool>,
        deposit_fetcher: Option<Arc<dyn DepositFetcher>>,
        p2p: Arc<dyn P2P>,
        spec: ChainSpec,
        max_effective_balance_gwei: types::Gwei,
        log: Logger,
    ) -> Self {
        Self {
            chain,
            duty_scheduler,
            proposal_pipeline,
            attestation_pool,
            deposit_fetcher,
            p2p,
            spec,
            max_effective_balance_gwei,
            log,
        }
    }

    /// `GetDuties(public_keys, epoch)` (spec.md §4.1).
    pub fn get_duties(
        &self,
        public_keys: &[PublicKeyBytes],
        epoch: Epoch,
    ) -> Result<DutiesResponse, RpcError> {
        self.duty_scheduler
            .get_duties(public_keys, epoch)
            .map_err(RpcError::from)
    }

    /// `GetBeaconBlock(slot, randao_reveal, graffiti)` (spec.md §4.2).
    pub fn get_beacon_block(
        &self,
        request: GetBeaconBlockRequest,
    ) -> Result<(types::BeaconBlock, Option<BlobsBundle>), RpcError> {
        self.proposal_pipeline.get_beacon_block(request)
    }

    /// `ProposeBeaconBlock` (spec.md §4.2).
    pub fn propose_beacon_block(
        &self,
        signed_block: SignedBeaconBlock,
        block_root: types::Hash256,
    ) -> Result<types::Hash256, RpcError> {
        self.proposal_pipeline
            .propose_beacon_block(signed_block, block_root)
    }

    /// `unblindBuilderBlock` (spec.md §4.2).
    pub fn unblind_builder_block(
        &self,
        signed_block: SignedBeaconBlock,
        block_root: types::Hash256,
    ) -> Result<SignedBeaconBlock, RpcError> {
        self.proposal_pipeline
            .unblind_builder_block(signed_block, block_root)
    }

    /// Blob Sidecar Construction (spec.md §4.8): wraps and gossips the sidecars for a Deneb+
    /// block's blobs bundle, normally called right after `propose_beacon_block` succeeds.
    pub fn construct_and_broadcast_blob_sidecars(
        &self,
        signed_block: &SignedBeaconBlock,
        block_root: types::Hash256,
        bundle: &BlobsBundle,
    ) -> Result<Vec<BlobSidecar>, RpcError> {
        self.proposal_pipeline
            .construct_and_broadcast_blob_sidecars(signed_block, block_root, bundle)
    }

    /// `SubmitAggregateSelectionProof` (spec.md §4.6). Steps 2-3: resolve `pubkey` to a
    /// validator index against head state, then derive `(committee_size, committee_position)`
    /// from that validator's seat in the `DOMAIN_BEACON_ATTESTER`-seeded committee.
    pub fn submit_aggregate_selection_proof(
        &self,
        request: AggregateSelectionRequest,
    ) -> Result<AggregateAndProof, RpcError> {
        let state = self.chain.head_state();
        let validator_index = state
            .validator_index(&request.pubkey)
            .ok_or_else(|| RpcError::Internal("unknown validator".into()))?;

        let epoch = request.slot.epoch(self.spec.slots_per_epoch);
        let committee = state.committee(epoch, request.slot, request.committee_index);
        let committee_position = committee
            .iter()
            .position(|&index| index == validator_index)
            .ok_or_else(|| RpcError::Internal("validator is not a member of this committee".into()))?;

        let engine = operation_pool::AggregationEngine::new(
            self.attestation_pool.as_ref(),
            &self.spec,
            None,
            self.log.clone(),
        );
        engine
            .submit_aggregate_selection_proof(
                request.slot,
                request.committee_index,
                committee.len(),
                committee_position,
                request.slot_signature,
                validator_index,
            )
            .map_err(RpcError::from)
    }

    /// `SubmitSignedAggregateSelectionProof` (spec.md §4.6): validate, then gossip.
    pub fn submit_signed_aggregate_selection_proof(
        &self,
        signed: SignedAggregateAndProof,
    ) -> Result<(), RpcError> {
        let current_slot = self.chain.current_slot().unwrap_or(Slot::new(0));
        let current_epoch = current_slot.epoch(self.spec.slots_per_epoch);

        let engine = operation_pool::AggregationEngine::new(
            self.attestation_pool.as_ref(),
            &self.spec,
            None,
            self.log.clone(),
        );
        engine.validate_signed_aggregate(&signed, current_slot, current_epoch)?;

        self.p2p
            .broadcast(GossipMessage::SignedAggregateAndProof(signed))
            .map_err(|e| RpcError::Internal(e.to_string()))
    }

    /// `ValidatorStatus` (spec.md §4.7).
    pub fn validator_status(
        &self,
        pubkey: &PublicKeyBytes,
        epoch: Epoch,
    ) -> Result<ValidatorStatusResponse, RpcError> {
        let state = self.chain.head_state();
        let classifier = beacon_chain::StatusClassifier::new(
            state.as_ref(),
            self.deposit_fetcher.as_deref(),
            self.max_effective_balance_gwei,
        );
        Ok(classifier.classify(pubkey, epoch))
    }

    /// `MultipleValidatorStatus` (spec.md §4.7).
    pub fn multiple_validator_status(
        &self,
        pubkeys: &[PublicKeyBytes],
        epoch: Epoch,
    ) -> Result<Vec<ValidatorStatusResponse>, RpcError> {
        let state = self.chain.head_state();
        let classifier = beacon_chain::StatusClassifier::new(
            state.as_ref(),
            self.deposit_fetcher.as_deref(),
            self.max_effective_balance_gwei,
        );
        Ok(pubkeys.iter().map(|pk| classifier.classify(pk, epoch)).collect())
    }

    /// `CheckDoppelGanger` (spec.md §4.9).
    pub fn check_doppelganger(
        &self,
        queries: &[DoppelgangerQuery],
    ) -> Vec<DoppelgangerResult> {
        let state = self.chain.head_state();
        let current_epoch = self
            .chain
            .current_slot()
            .map(|s| s.epoch(self.spec.slots_per_epoch))
            .unwrap_or(Epoch::new(0));
        let detector = DoppelgangerDetector::new(state.as_ref(), current_epoch);
        detector.check_all(queries)
    }

    /// `StreamDuties` (spec.md §4.1, §4.10, §5): emits immediately, then re-emits on every
    /// epoch tick and every reorg event, and terminates on cancellation. `epoch_ticks` and
    /// `reorgs` are owned by external collaborators (the real epoch clock and fork-choice
    /// reorg feed); this loop only drains them.
    pub async fn stream_duties(
        &self,
        public_keys: Vec<PublicKeyBytes>,
        epoch: Epoch,
        mut epoch_ticks: tokio::sync::mpsc::Receiver<()>,
        mut reorgs: tokio::sync::mpsc::Receiver<()>,
        mut cancel: tokio::sync::watch::Receiver<bool>,
        sink: tokio::sync::mpsc::Sender<DutyStreamEvent>,
    ) {
        let send = |result: Result<DutiesResponse, RpcError>| {
            let sink = sink.clone();
            async move {
                let _ = sink.send(DutyStreamEvent::Duties(result)).await;
            }
        };

        send(self.get_duties(&public_keys, epoch)).await;

        loop {
            tokio::select! {
                tick = epoch_ticks.recv() => {
                    if tick.is_none() {
                        break;
                    }
                    send(self.get_duties(&public_keys, epoch)).await;
                }
                reorg = reorgs.recv() => {
                    if reorg.is_none() {
                        break;
                    }
                    send(self.get_duties(&public_keys, epoch)).await;
                }
                changed = cancel.changed() => {
                    if changed.is_err() || *cancel.borrow() {
                        info!(self.log, "duty stream cancelled"; "epoch" => epoch.as_u64());
                        let _ = sink.send(DutyStreamEvent::Cancelled).await;
                        break;
                    }
                }
            }
        }
    }
}
