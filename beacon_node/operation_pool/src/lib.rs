//! The pull-only pool traits and the attestation aggregation engine (spec.md §2 components
//! table, §4.6).

mod aggregation_engine;
mod error;
mod pools;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use aggregation_engine::AggregationEngine;
pub use error::AggregationError;
pub use pools::{AttestationPool, ExitPool, SlashingPool, SyncCommitteePool};
