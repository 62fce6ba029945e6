use std::fmt;

/// Failure modes of the aggregation engine (spec.md §4.6, §7). Mapped to `RpcError` kinds only
/// at the `http_api` boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregationError {
    NotAnAggregator,
    NoAggregableAttestation,
    ZeroSignature,
    /// `aggregate.data.slot` outside `±MaximumGossipClockDisparity` of the current slot
    /// (spec.md §8 scenario 5: "Attestation slot is no longer valid from current time").
    StaleSlot,
}

impl fmt::Display for AggregationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregationError::NotAnAggregator => write!(f, "validator is not an aggregator for this slot"),
            AggregationError::NoAggregableAttestation => write!(f, "no aggregable attestation in the pool"),
            AggregationError::ZeroSignature => write!(f, "signature is all-zero"),
            AggregationError::StaleSlot => write!(f, "Attestation slot is no longer valid from current time"),
        }
    }
}

impl std::error::Error for AggregationError {}
