use std::fmt;

/// The transport-agnostic error surface of spec.md §7: the single place that enumerates the
/// kinds every RPC call can fail with. Internal crates never expose a "status"-shaped type;
/// their own `Error` enums convert into this one only at the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    Unavailable(String),
    FailedPrecondition(String),
    OutOfRange(String),
    InvalidArgument(String),
    NotFound(String),
    Internal(String),
    Cancelled,
}

impl fmt::Display for RpcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcError::Unavailable(msg) => write!(f, "unavailable: {msg}"),
            RpcError::FailedPrecondition(msg) => write!(f, "failed precondition: {msg}"),
            RpcError::OutOfRange(msg) => write!(f, "out of range: {msg}"),
            RpcError::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            RpcError::NotFound(msg) => write!(f, "not found: {msg}"),
            RpcError::Internal(msg) => write!(f, "internal: {msg}"),
            RpcError::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::error::Error for RpcError {}

impl From<beacon_chain::BeaconChainError> for RpcError {
    fn from(e: beacon_chain::BeaconChainError) -> Self {
        match e {
            beacon_chain::BeaconChainError::Unavailable => {
                RpcError::Unavailable("node is syncing".into())
            }
            beacon_chain::BeaconChainError::EpochOutOfRange { requested, current } => {
                RpcError::OutOfRange(format!(
                    "requested epoch {requested} exceeds current epoch {current} + 1"
                ))
            }
            beacon_chain::BeaconChainError::UnknownValidator => {
                RpcError::Internal("unknown validator".into())
            }
            beacon_chain::BeaconChainError::ExternalError(msg) => RpcError::Internal(msg),
        }
    }
}

impl From<operation_pool::AggregationError> for RpcError {
    fn from(e: operation_pool::AggregationError) -> Self {
        use operation_pool::AggregationError as E;
        match e {
            E::NotAnAggregator => RpcError::InvalidArgument(e.to_string()),
            E::NoAggregableAttestation => RpcError::NotFound(e.to_string()),
            E::ZeroSignature => RpcError::InvalidArgument(e.to_string()),
            E::StaleSlot => RpcError::InvalidArgument(e.to_string()),
        }
    }
}
