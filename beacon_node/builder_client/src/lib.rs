//! The external block-builder contract: bid types, the `Builder`/`BlsVerifier` traits, and
//! `BuilderClient::get_payload_header`'s bid-validation pipeline (spec.md §4.5).

mod bid;
mod bls_verifier;
mod builder;
mod client;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use bid::{BuilderBid, SignedBuilderBid};
pub use bls_verifier::{BlsVerifier, DOMAIN_APPLICATION_BUILDER};
pub use builder::{Builder, BuilderError};
pub use client::{empty_transactions_root, BuilderClient, HeaderRejection, HeaderRequest};
