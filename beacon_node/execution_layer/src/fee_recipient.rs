use parking_lot::RwLock;
use slog::{warn, Logger};
use std::collections::HashMap;
use types::{Address, ValidatorIndex};

/// Resolves the fee recipient used to request a local payload build, in priority order:
/// persisted per-validator registration → node default → burn address (spec.md §4.3, "Fee
/// recipient resolution"; Open Question (b) in SPEC_FULL.md §3 settles the DB → CLI → burn
/// order).
pub struct FeeRecipientResolver {
    registrations: RwLock<HashMap<ValidatorIndex, Address>>,
    default_fee_recipient: Option<Address>,
    log: Logger,
}

impl FeeRecipientResolver {
    pub fn new(default_fee_recipient: Option<Address>, log: Logger) -> Self {
        Self {
            registrations: RwLock::new(HashMap::new()),
            default_fee_recipient,
            log,
        }
    }

    /// Persists a fee-recipient registration, e.g. from the validator client's
    /// `(validator_index → {fee_recipient, pubkey})` record (spec.md §6).
    pub fn set_registration(&self, validator_index: ValidatorIndex, fee_recipient: Address) {
        self.registrations.write().insert(validator_index, fee_recipient);
    }

    /// Resolves the fee recipient to request a payload build with. Falls back to the burn
    /// address with a warning log if neither a registration nor a node default exists
    /// (spec.md §4.3: "burn address (with warning log)").
    pub fn resolve(&self, validator_index: ValidatorIndex) -> Address {
        if let Some(addr) = self.registrations.read().get(&validator_index) {
            return *addr;
        }
        if let Some(addr) = self.default_fee_recipient {
            return addr;
        }
        warn!(
            self.log,
            "no fee recipient registered or configured, defaulting to burn address";
            "validator_index" => validator_index,
        );
        Address::zero()
    }

    /// Compares the resolved fee recipient against the one actually returned in a built payload.
    /// A mismatch is logged but never an error (spec.md §4.3: "record `payload.fee_recipient ≠
    /// expected` as a warning but not failure").
    pub fn check_mismatch(&self, validator_index: ValidatorIndex, expected: Address, actual: Address) {
        if expected != actual {
            warn!(
                self.log,
                "payload fee recipient did not match the requested one";
                "validator_index" => validator_index,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_takes_priority_over_default() {
        let resolver = FeeRecipientResolver::new(Some(Address::from([1u8; 20])), logging::test_logger());
        resolver.set_registration(7, Address::from([2u8; 20]));
        assert_eq!(resolver.resolve(7), Address::from([2u8; 20]));
    }

    #[test]
    fn default_used_when_no_registration() {
        let resolver = FeeRecipientResolver::new(Some(Address::from([1u8; 20])), logging::test_logger());
        assert_eq!(resolver.resolve(7), Address::from([1u8; 20]));
    }

    #[test]
    fn falls_back_to_burn_address() {
        let resolver = FeeRecipientResolver::new(None, logging::test_logger());
        assert_eq!(resolver.resolve(7), Address::zero());
    }
}
