use crate::{Epoch, Hash256, PublicKeyBytes};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `FAR_FUTURE_EPOCH` from the consensus spec: the sentinel meaning "never".
pub const FAR_FUTURE_EPOCH: Epoch = Epoch::new(u64::MAX);

/// A validator record as read out of `BeaconState.validators`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Validator {
    pub pubkey: PublicKeyBytes,
    pub withdrawal_credentials: Hash256,
    pub effective_balance: u64,
    pub slashed: bool,
    pub activation_eligibility_epoch: Epoch,
    pub activation_epoch: Epoch,
    pub exit_epoch: Epoch,
    pub withdrawable_epoch: Epoch,
}

impl Validator {
    pub fn is_active_at(&self, epoch: Epoch) -> bool {
        self.activation_epoch <= epoch && epoch < self.exit_epoch
    }

    pub fn is_exited_at(&self, epoch: Epoch) -> bool {
        self.exit_epoch <= epoch
    }

    pub fn is_withdrawable_at(&self, epoch: Epoch) -> bool {
        self.withdrawable_epoch <= epoch
    }
}

/// The lifecycle classification returned by `ValidatorStatus`/`MultipleValidatorStatus`.
///
/// Variant order follows the decision table evaluated against head state: deposit-log-only
/// states first, then the in-registry states in the order they're checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidatorStatus {
    Unknown,
    Deposited,
    PartiallyDeposited,
    Invalid,
    Pending,
    Active,
    Exiting,
    Slashing,
    Exited,
}

impl fmt::Display for ValidatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidatorStatus::Unknown => "unknown",
            ValidatorStatus::Deposited => "deposited",
            ValidatorStatus::PartiallyDeposited => "partially_deposited",
            ValidatorStatus::Invalid => "invalid",
            ValidatorStatus::Pending => "pending",
            ValidatorStatus::Active => "active",
            ValidatorStatus::Exiting => "exiting",
            ValidatorStatus::Slashing => "slashing",
            ValidatorStatus::Exited => "exited",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ValidatorStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unknown" => Ok(ValidatorStatus::Unknown),
            "deposited" => Ok(ValidatorStatus::Deposited),
            "partially_deposited" => Ok(ValidatorStatus::PartiallyDeposited),
            "invalid" => Ok(ValidatorStatus::Invalid),
            "pending" => Ok(ValidatorStatus::Pending),
            "active" => Ok(ValidatorStatus::Active),
            "exiting" => Ok(ValidatorStatus::Exiting),
            "slashing" => Ok(ValidatorStatus::Slashing),
            "exited" => Ok(ValidatorStatus::Exited),
            other => Err(format!("unknown validator status: {other}")),
        }
    }
}

/// Response entry for `ValidatorStatus`/`MultipleValidatorStatus`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorStatusResponse {
    pub pubkey: Option<PublicKeyBytes>,
    pub status: ValidatorStatus,
    pub activation_epoch: Option<Epoch>,
    pub position_in_activation_queue: Option<u64>,
}
