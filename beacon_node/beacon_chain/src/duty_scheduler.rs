use crate::beacon_state::{sync_period, BeaconStateView};
use crate::chain_view::ChainView;
use crate::error::BeaconChainError;
use crate::external_traits::{epoch_start_slot, DepositFetcher, StateTransition};
use execution_layer::payload_id_cache::PayloadIdCache;
use crate::status_classifier::StatusClassifier;
use crate::subnet_cache::{SubnetCache, SyncSubnetCache};
use metrics::IntCounter;
use rand::thread_rng;
use slog::{debug, Logger};
use std::sync::Arc;
use std::time::{Duration, Instant};
use types::{ChainSpec, Duty, DutiesResponse, Epoch, PublicKeyBytes, Slot, SyncDuty, ValidatorStatus};

/// Produces per-validator duty records from `ChainView` + committee assignments, and keeps
/// `SubnetCache`/`PayloadIdCache` up to date (spec.md §4.1).
pub struct DutyScheduler {
    chain: Arc<dyn ChainView>,
    state_transition: Arc<dyn StateTransition>,
    deposit_fetcher: Option<Arc<dyn DepositFetcher>>,
    subnet_cache: Arc<SubnetCache>,
    sync_subnet_cache: Arc<SyncSubnetCache>,
    payload_id_cache: Arc<PayloadIdCache>,
    spec: ChainSpec,
    duties_requests_total: Option<IntCounter>,
    duties_request_errors_total: Option<IntCounter>,
    log: Logger,
}

impl DutyScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        chain: Arc<dyn ChainView>,
        state_transition: Arc<dyn StateTransition>,
        deposit_fetcher: Option<Arc<dyn DepositFetcher>>,
        subnet_cache: Arc<SubnetCache>,
        sync_subnet_cache: Arc<SyncSubnetCache>,
        payload_id_cache: Arc<PayloadIdCache>,
        spec: ChainSpec,
        duties_requests_total: Option<IntCounter>,
        duties_request_errors_total: Option<IntCounter>,
        log: Logger,
    ) -> Self {
        Self {
            chain,
            state_transition,
            deposit_fetcher,
            subnet_cache,
            sync_subnet_cache,
            payload_id_cache,
            spec,
            duties_requests_total,
            duties_request_errors_total,
            log,
        }
    }

    fn inc(&self, counter: &Option<IntCounter>) {
        if let Some(counter) = counter {
            counter.inc();
        }
    }

    /// `GetDuties(public_keys, epoch)` (spec.md §4.1).
    pub fn get_duties(
        &self,
        public_keys: &[PublicKeyBytes],
        epoch: Epoch,
    ) -> Result<DutiesResponse, BeaconChainError> {
        self.inc(&self.duties_requests_total);
        let result = self.get_duties_inner(public_keys, epoch);
        if result.is_err() {
            self.inc(&self.duties_request_errors_total);
        }
        result
    }

    fn get_duties_inner(
        &self,
        public_keys: &[PublicKeyBytes],
        epoch: Epoch,
    ) -> Result<DutiesResponse, BeaconChainError> {
        if public_keys.is_empty() {
            return Ok(DutiesResponse {
                current: vec![],
                next: vec![],
            });
        }

        if self.chain.is_syncing() {
            return Err(BeaconChainError::Unavailable);
        }

        let current_epoch = self
            .chain
            .current_slot()
            .map(|s| s.epoch(self.spec.slots_per_epoch))
            .unwrap_or(Epoch::new(0));

        if epoch.as_u64() > current_epoch.as_u64() + 1 {
            return Err(BeaconChainError::EpochOutOfRange {
                requested: epoch.as_u64(),
                current: current_epoch.as_u64(),
            });
        }

        // Step 1: acquire head state, advancing it (without mutating the canonical head) if it
        // lags the requested epoch's start slot.
        let head_root = self.chain.head_root();
        let mut state = self.chain.head_state();
        let target_slot = epoch_start_slot(epoch, self.spec.slots_per_epoch);
        if state.slot() < target_slot {
            state = self
                .state_transition
                .process_slots_using_next_slot_cache(state, head_root, target_slot)?;
        }

        let current = self.compute_duty_list(state.as_ref(), public_keys, epoch, epoch)?;
        let next = self.compute_duty_list(state.as_ref(), public_keys, epoch.saturating_add(1), epoch)?;

        // Step 6: persistent-subnet bookkeeping for active-or-exiting validators.
        self.update_subnets(state.as_ref(), public_keys, epoch);

        // Step 7: prune stale payload-id entries.
        self.payload_id_cache
            .prune(epoch_start_slot(epoch, self.spec.slots_per_epoch));

        Ok(DutiesResponse { current, next })
    }

    fn compute_duty_list(
        &self,
        state: &dyn BeaconStateView,
        public_keys: &[PublicKeyBytes],
        duty_epoch: Epoch,
        request_epoch: Epoch,
    ) -> Result<Vec<Duty>, BeaconChainError> {
        let classifier = StatusClassifier::new(state, self.deposit_fetcher.as_deref(), 32_000_000_000);
        let epoch_start = epoch_start_slot(duty_epoch, self.spec.slots_per_epoch);
        let epoch_end = epoch_start + (self.spec.slots_per_epoch - 1);

        let mut duties = Vec::with_capacity(public_keys.len());
        for pubkey in public_keys {
            let status_response = classifier.classify(pubkey, duty_epoch);
            let validator_index = match state.validator_index(pubkey) {
                Some(index) => index,
                None => {
                    duties.push(Duty {
                        pubkey: *pubkey,
                        validator_index: u64::MAX,
                        status: status_response.status,
                        committee: vec![],
                        committee_index: 0,
                        attester_slot: Slot::new(0),
                        proposer_slots: vec![],
                        is_sync_committee: false,
                    });
                    continue;
                }
            };

            let (attester_slot, committee_index, committee) =
                self.find_committee_assignment(state, validator_index, duty_epoch, epoch_start);

            let proposer_slots: Vec<Slot> = (epoch_start.as_u64()..=epoch_end.as_u64())
                .map(Slot::new)
                .filter(|&slot| state.proposer_at_slot(slot) == validator_index)
                .collect();

            for &slot in &proposer_slots {
                self.payload_id_cache
                    .insert_placeholder(slot, self.chain.head_root(), validator_index);
            }

            let is_sync_committee =
                self.is_sync_committee_member(state, validator_index, duty_epoch, request_epoch);

            duties.push(Duty {
                pubkey: *pubkey,
                validator_index,
                status: status_response.status,
                committee,
                committee_index,
                attester_slot,
                proposer_slots,
                is_sync_committee,
            });
        }

        Ok(duties)
    }

    /// Scans every slot/committee-index pair in the epoch for `validator_index`'s membership.
    /// Real committee derivation is an external shuffling primitive (out of scope, spec.md §1);
    /// here it is read straight off the `BeaconStateView` projection.
    fn find_committee_assignment(
        &self,
        state: &dyn BeaconStateView,
        validator_index: u64,
        duty_epoch: Epoch,
        epoch_start: Slot,
    ) -> (Slot, u64, Vec<u64>) {
        for slot_offset in 0..self.spec.slots_per_epoch {
            let slot = epoch_start + slot_offset;
            let committee_count = state.committee_count_at_slot(slot).max(1);
            for committee_index in 0..committee_count {
                let committee = state.committee(duty_epoch, slot, committee_index);
                if committee.contains(&validator_index) {
                    return (slot, committee_index, committee);
                }
            }
        }
        (epoch_start, 0, vec![])
    }

    /// Step 5: post-Altair sync-committee membership, with the period-boundary divergence rule
    /// (spec.md §4.1 step 5: "If `slots.sync_period(epoch+1) == slots.sync_period(epoch)+1`, the
    /// next-epoch flag uses the *next* sync committee; else it mirrors current").
    fn is_sync_committee_member(
        &self,
        state: &dyn BeaconStateView,
        validator_index: u64,
        duty_epoch: Epoch,
        request_epoch: Epoch,
    ) -> bool {
        let is_next_epoch_request = duty_epoch.as_u64() == request_epoch.as_u64() + 1;

        if !is_next_epoch_request {
            return state
                .sync_committee_members(duty_epoch)
                .is_some_and(|members| members.contains(&validator_index));
        }

        let period = self.spec.epochs_per_sync_committee_period;
        if sync_period(duty_epoch, period) == sync_period(request_epoch, period) + 1 {
            state
                .next_sync_committee_members(request_epoch)
                .is_some_and(|members| members.contains(&validator_index))
        } else {
            state
                .sync_committee_members(request_epoch)
                .is_some_and(|members| members.contains(&validator_index))
        }
    }

    /// Step 6: assigns persistent/sync subnets to every active-or-exiting requested validator
    /// that lacks a live subscription.
    fn update_subnets(&self, state: &dyn BeaconStateView, public_keys: &[PublicKeyBytes], epoch: Epoch) {
        let now = Instant::now();
        let slot_duration = Duration::from_millis(self.spec.milliseconds_per_slot);
        let mut rng = thread_rng();

        for pubkey in public_keys {
            let Some(index) = state.validator_index(pubkey) else {
                continue;
            };
            let validator = &state.validators()[index as usize];
            let active_or_exiting =
                validator.is_active_at(epoch) || validator.exit_epoch < types::FAR_FUTURE_EPOCH;
            if !active_or_exiting {
                continue;
            }

            self.subnet_cache.subscribe_if_absent(
                *pubkey,
                self.spec.attestation_subnet_count,
                self.spec.random_subnets_per_validator,
                self.spec.epochs_per_random_subnet_subscription,
                slot_duration,
                self.spec.slots_per_epoch,
                now,
                &mut rng,
            );

            if let Some(members) = state.sync_committee_members(epoch) {
                if let Some(duty) = SyncDuty::from_sync_committee_indices(index, *pubkey, &members) {
                    debug!(self.log, "registering sync subnet"; "validator_index" => index);
                    self.sync_subnet_cache.subscribe_if_absent(
                        duty.pubkey,
                        &duty.validator_sync_committee_indices,
                        members.len() as u64,
                        self.spec.sync_committee_subnet_count,
                        epoch.as_u64(),
                        self.spec.epochs_per_sync_committee_period,
                        slot_duration,
                        self.spec.slots_per_epoch,
                        now,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{FakeBeaconState, FakeChainView, NoopStateTransition};
    use logging::test_logger;
    use types::{Hash256, Validator, FAR_FUTURE_EPOCH};

    fn scheduler(state: FakeBeaconState) -> (DutyScheduler, Arc<FakeChainView>) {
        let chain = Arc::new(FakeChainView::new(state));
        let scheduler = DutyScheduler::new(
            chain.clone(),
            Arc::new(NoopStateTransition),
            None,
            Arc::new(SubnetCache::new()),
            Arc::new(SyncSubnetCache::new()),
            Arc::new(PayloadIdCache::new()),
            ChainSpec::mainnet(),
            None,
            None,
            test_logger(),
        );
        (scheduler, chain)
    }

    fn active_validator(pubkey: PublicKeyBytes) -> Validator {
        Validator {
            pubkey,
            withdrawal_credentials: Hash256::zero(),
            effective_balance: 32_000_000_000,
            slashed: false,
            activation_eligibility_epoch: Epoch::new(0),
            activation_epoch: Epoch::new(0),
            exit_epoch: FAR_FUTURE_EPOCH,
            withdrawable_epoch: FAR_FUTURE_EPOCH,
        }
    }

    #[test]
    fn duty_validator_index_resolves_to_requested_pubkey() {
        let pubkey = PublicKeyBytes([7u8; 48]);
        let state = FakeBeaconState::new(vec![active_validator(pubkey)])
            .with_committee(Epoch::new(0), Slot::new(0), 0, vec![0]);
        let (scheduler, _chain) = scheduler(state);

        let response = scheduler.get_duties(&[pubkey], Epoch::new(0)).unwrap();
        assert_eq!(response.current.len(), 1);
        assert_eq!(response.current[0].pubkey, pubkey);
        assert_eq!(response.current[0].validator_index, 0);
    }

    #[test]
    fn empty_key_list_returns_empty_response() {
        let (scheduler, _chain) = scheduler(FakeBeaconState::new(vec![]));
        let response = scheduler.get_duties(&[], Epoch::new(0)).unwrap();
        assert!(response.current.is_empty());
        assert!(response.next.is_empty());
    }

    #[test]
    fn epoch_too_far_ahead_is_rejected() {
        let (scheduler, _chain) = scheduler(FakeBeaconState::new(vec![]));
        let err = scheduler
            .get_duties(&[PublicKeyBytes::zero()], Epoch::new(100))
            .unwrap_err();
        assert!(matches!(err, BeaconChainError::EpochOutOfRange { .. }));
    }

    #[test]
    fn syncing_node_rejects_request() {
        let state = FakeBeaconState::new(vec![]);
        let mut chain = FakeChainView::new(state);
        chain.syncing = true;
        let chain = Arc::new(chain);
        let scheduler = DutyScheduler::new(
            chain.clone(),
            Arc::new(NoopStateTransition),
            None,
            Arc::new(SubnetCache::new()),
            Arc::new(SyncSubnetCache::new()),
            Arc::new(PayloadIdCache::new()),
            ChainSpec::mainnet(),
            None,
            None,
            test_logger(),
        );
        let err = scheduler
            .get_duties(&[PublicKeyBytes::zero()], Epoch::new(0))
            .unwrap_err();
        assert!(matches!(err, BeaconChainError::Unavailable));
    }

    #[test]
    fn payload_id_cache_gets_placeholder_for_proposer_slot() {
        let pubkey = PublicKeyBytes([9u8; 48]);
        let state = FakeBeaconState::new(vec![active_validator(pubkey)]).with_proposer(Slot::new(3), 0);
        let (scheduler, _chain) = scheduler(state);

        scheduler.get_duties(&[pubkey], Epoch::new(0)).unwrap();
        let entry = scheduler.payload_id_cache.get(Slot::new(3), Hash256::zero());
        assert!(entry.is_some());
    }
}
