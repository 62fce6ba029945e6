use std::fmt;

/// Errors surfaced by the duty scheduler, status classifier and doppelganger detector. Hand-rolled
/// `Display`/`std::error::Error`, matching the teacher's `BeaconChainError`-style enums rather
/// than a `thiserror` derive (SPEC_FULL.md §2.3).
#[derive(Debug)]
pub enum BeaconChainError {
    /// The node is syncing and cannot service the request (spec.md §4.1: "Fails with
    /// `Unavailable` while syncing").
    Unavailable,
    /// `epoch > current_epoch + 1` (spec.md §4.1).
    EpochOutOfRange { requested: u64, current: u64 },
    /// The requested public key has no corresponding validator index and no deposit-log entry.
    UnknownValidator,
    /// An external collaborator (state-gen, deposit fetcher, ...) returned an error.
    ExternalError(String),
}

impl fmt::Display for BeaconChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BeaconChainError::Unavailable => write!(f, "beacon chain is syncing"),
            BeaconChainError::EpochOutOfRange { requested, current } => write!(
                f,
                "requested epoch {requested} is more than one epoch ahead of current epoch {current}"
            ),
            BeaconChainError::UnknownValidator => write!(f, "unknown validator"),
            BeaconChainError::ExternalError(msg) => write!(f, "external collaborator error: {msg}"),
        }
    }
}

impl std::error::Error for BeaconChainError {}
