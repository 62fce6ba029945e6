use crate::beacon_state::BeaconStateView;
use crate::external_traits::DepositFetcher;
use types::{Epoch, PublicKeyBytes, Validator, ValidatorStatus, ValidatorStatusResponse, Gwei};
use types::FAR_FUTURE_EPOCH;

/// Evaluates the decision table in spec.md §4.7 against a head-state snapshot and, for unknown
/// keys, an optional deposit log.
pub struct StatusClassifier<'a> {
    state: &'a dyn BeaconStateView,
    deposit_fetcher: Option<&'a dyn DepositFetcher>,
    max_effective_balance_gwei: Gwei,
}

impl<'a> StatusClassifier<'a> {
    pub fn new(
        state: &'a dyn BeaconStateView,
        deposit_fetcher: Option<&'a dyn DepositFetcher>,
        max_effective_balance_gwei: Gwei,
    ) -> Self {
        Self {
            state,
            deposit_fetcher,
            max_effective_balance_gwei,
        }
    }

    /// Full response for `ValidatorStatus`/`MultipleValidatorStatus` (spec.md §4.7).
    pub fn classify(&self, pubkey: &PublicKeyBytes, current_epoch: Epoch) -> ValidatorStatusResponse {
        match self.state.validator_index(pubkey) {
            None => self.classify_unregistered(pubkey),
            Some(index) => {
                let validator = &self.state.validators()[index as usize];
                let (status, activation_epoch, position_in_activation_queue) =
                    self.classify_registered(validator, current_epoch);
                ValidatorStatusResponse {
                    pubkey: Some(*pubkey),
                    status,
                    activation_epoch,
                    position_in_activation_queue,
                }
            }
        }
    }

    /// Step 1: not in registry. Consult the deposit log if one is available.
    fn classify_unregistered(&self, pubkey: &PublicKeyBytes) -> ValidatorStatusResponse {
        let status = match self.deposit_fetcher.and_then(|f| f.deposit_by_pubkey(pubkey)) {
            Some(deposit) if !deposit.signature_valid => ValidatorStatus::Invalid,
            Some(deposit) if deposit.amount_gwei < self.max_effective_balance_gwei => {
                ValidatorStatus::PartiallyDeposited
            }
            Some(_) => ValidatorStatus::Deposited,
            None => ValidatorStatus::Unknown,
        };
        ValidatorStatusResponse {
            pubkey: Some(*pubkey),
            status,
            activation_epoch: None,
            position_in_activation_queue: None,
        }
    }

    /// Steps 2-8: in registry.
    fn classify_registered(
        &self,
        validator: &Validator,
        e: Epoch,
    ) -> (ValidatorStatus, Option<Epoch>, Option<u64>) {
        if validator.activation_eligibility_epoch == FAR_FUTURE_EPOCH {
            return (ValidatorStatus::Deposited, None, None);
        }

        if validator.activation_epoch == FAR_FUTURE_EPOCH {
            let position = self.position_in_activation_queue(validator);
            return (ValidatorStatus::Pending, None, Some(position));
        }

        if validator.activation_epoch > e {
            return (ValidatorStatus::Pending, Some(validator.activation_epoch), None);
        }

        if validator.slashed && e < validator.withdrawable_epoch {
            if validator.is_exited_at(e) {
                return (ValidatorStatus::Exited, None, None);
            }
            return (ValidatorStatus::Slashing, None, None);
        }

        if validator.exit_epoch <= e {
            return (ValidatorStatus::Exited, None, None);
        }

        if validator.exit_epoch < FAR_FUTURE_EPOCH {
            return (ValidatorStatus::Exiting, None, None);
        }

        (ValidatorStatus::Active, Some(validator.activation_epoch), None)
    }

    /// Position is the count of validators with `activation_eligibility_epoch <= self.aee` AND
    /// `activation_epoch == FAR_FUTURE` and a lower validator index (spec.md §4.7 step 3).
    fn position_in_activation_queue(&self, validator: &Validator) -> u64 {
        let target_index = self
            .state
            .validators()
            .iter()
            .position(|v| std::ptr::eq(v, validator))
            .unwrap_or(usize::MAX);

        self.state
            .validators()
            .iter()
            .enumerate()
            .filter(|(index, v)| {
                *index < target_index
                    && v.activation_epoch == FAR_FUTURE_EPOCH
                    && v.activation_eligibility_epoch <= validator.activation_eligibility_epoch
            })
            .count() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeBeaconState;
    use types::Hash256;

    fn validator(
        activation_eligibility_epoch: u64,
        activation_epoch: u64,
        exit_epoch: u64,
        withdrawable_epoch: u64,
        slashed: bool,
    ) -> Validator {
        Validator {
            pubkey: PublicKeyBytes::zero(),
            withdrawal_credentials: Hash256::zero(),
            effective_balance: 32_000_000_000,
            slashed,
            activation_eligibility_epoch: Epoch::new(activation_eligibility_epoch),
            activation_epoch: Epoch::new(activation_epoch),
            exit_epoch: Epoch::new(exit_epoch),
            withdrawable_epoch: Epoch::new(withdrawable_epoch),
        }
    }

    #[test]
    fn active_validator() {
        let v = validator(0, 0, FAR_FUTURE_EPOCH.as_u64(), FAR_FUTURE_EPOCH.as_u64(), false);
        let state = FakeBeaconState::new(vec![v]);
        let classifier = StatusClassifier::new(&state, None, 32_000_000_000);
        let response = classifier.classify(&PublicKeyBytes::zero(), Epoch::new(10));
        assert_eq!(response.status, ValidatorStatus::Active);
    }

    #[test]
    fn pending_queued_validator_counts_lower_indices() {
        let v0 = validator(5, FAR_FUTURE_EPOCH.as_u64(), FAR_FUTURE_EPOCH.as_u64(), FAR_FUTURE_EPOCH.as_u64(), false);
        let v1 = validator(5, FAR_FUTURE_EPOCH.as_u64(), FAR_FUTURE_EPOCH.as_u64(), FAR_FUTURE_EPOCH.as_u64(), false);
        let state = FakeBeaconState::new(vec![v0, v1]);
        let classifier = StatusClassifier::new(&state, None, 32_000_000_000);

        let response = classifier.classify(&PublicKeyBytes::zero(), Epoch::new(10));
        assert_eq!(response.status, ValidatorStatus::Pending);
        assert_eq!(response.position_in_activation_queue, Some(0));
    }

    #[test]
    fn unknown_without_deposit() {
        let state = FakeBeaconState::new(vec![]);
        let classifier = StatusClassifier::new(&state, None, 32_000_000_000);
        let response = classifier.classify(&PublicKeyBytes::zero(), Epoch::new(0));
        assert_eq!(response.status, ValidatorStatus::Unknown);
    }
}
