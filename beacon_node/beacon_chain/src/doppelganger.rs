use crate::beacon_state::BeaconStateView;
use types::{Epoch, PublicKeyBytes};

/// One `CheckDoppelGanger` request item (spec.md §6: `[{pubkey, last_seen_epoch, signed_root}]`).
/// `signed_root` is accepted for parity with the wire shape but unused: the core polices
/// participation history only, never signatures (spec.md §1 Non-goals).
pub struct DoppelgangerQuery {
    pub pubkey: PublicKeyBytes,
    pub last_seen_epoch: Option<Epoch>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoppelgangerResult {
    pub pubkey: PublicKeyBytes,
    pub duplicate_exists: bool,
}

/// Compares recent participation bits across epochs to detect same-key activity elsewhere
/// (spec.md §4.9). Open Question (c): bounded against the previous epoch only, deliberately
/// ignoring current-epoch participation so a validator's own activity this epoch cannot trigger
/// a false positive against itself (SPEC_FULL.md §3 notes the same decision as load-bearing).
pub struct DoppelgangerDetector<'a> {
    state: &'a dyn BeaconStateView,
    current_epoch: Epoch,
}

impl<'a> DoppelgangerDetector<'a> {
    pub fn new(state: &'a dyn BeaconStateView, current_epoch: Epoch) -> Self {
        Self {
            state,
            current_epoch,
        }
    }

    pub fn check(&self, query: &DoppelgangerQuery) -> DoppelgangerResult {
        let duplicate_exists = self.check_one(query);
        DoppelgangerResult {
            pubkey: query.pubkey,
            duplicate_exists,
        }
    }

    pub fn check_all(&self, queries: &[DoppelgangerQuery]) -> Vec<DoppelgangerResult> {
        queries.iter().map(|q| self.check(q)).collect()
    }

    fn check_one(&self, query: &DoppelgangerQuery) -> bool {
        // Pre-Altair states have no participation vector; exit early with `false`
        // (spec.md §4.9: "Pre-Altair states exit early").
        if self.state.fork_name() == types::ForkName::Base {
            return false;
        }

        let Some(index) = self.state.validator_index(&query.pubkey) else {
            return false;
        };

        let too_recent = match query.last_seen_epoch {
            Some(last_seen) => last_seen.as_u64() < self.current_epoch.as_u64().saturating_sub(1),
            None => true,
        };
        if !too_recent {
            return false;
        }

        let previous_epoch = Epoch::new(self.current_epoch.as_u64().saturating_sub(1));
        self.state
            .participated_in_epoch(index, previous_epoch)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeBeaconState;
    use types::{Hash256, Validator, FAR_FUTURE_EPOCH};

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
    fn detects_duplicate_from_previous_epoch_participation() {
        let pubkey = PublicKeyBytes([2u8; 48]);
        let mut state = FakeBeaconState::new(vec![active_validator(pubkey)]);
        state.participation.insert((0, Epoch::new(9)), true);

        let detector = DoppelgangerDetector::new(&state, Epoch::new(10));
        let result = detector.check(&DoppelgangerQuery {
            pubkey,
            last_seen_epoch: Some(Epoch::new(3)),
        });
        assert!(result.duplicate_exists);
    }

    #[test]
    fn own_recent_activity_does_not_trigger() {
        let pubkey = PublicKeyBytes([2u8; 48]);
        let mut state = FakeBeaconState::new(vec![active_validator(pubkey)]);
        state.participation.insert((0, Epoch::new(9)), true);

        let detector = DoppelgangerDetector::new(&state, Epoch::new(10));
        let result = detector.check(&DoppelgangerQuery {
            pubkey,
            last_seen_epoch: Some(Epoch::new(9)),
        });
        assert!(!result.duplicate_exists);
    }

    #[test]
    fn phase0_state_never_flags() {
        let pubkey = PublicKeyBytes([2u8; 48]);
        let mut state = FakeBeaconState::new(vec![active_validator(pubkey)]);
        state.fork_name = types::ForkName::Base;
        state.participation.insert((0, Epoch::new(9)), true);

        let detector = DoppelgangerDetector::new(&state, Epoch::new(10));
        let result = detector.check(&DoppelgangerQuery {
            pubkey,
            last_seen_epoch: None,
        });
        assert!(!result.duplicate_exists);
    }
}
