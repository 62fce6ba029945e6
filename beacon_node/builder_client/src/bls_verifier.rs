use types::{PublicKeyBytes, SignatureBytes};

/// Application-builder signing domain (spec.md §4.5 step 5: "domain `DOMAIN_APPLICATION_BUILDER`
/// (nil fork version, nil validator root)").
pub const DOMAIN_APPLICATION_BUILDER: [u8; 4] = [0x00, 0x00, 0x00, 0x01];

/// BLS signature verification lives outside this crate (spec.md §1 scope note); this trait is the
/// core's entire contract with whatever verifies signatures in a full node.
pub trait BlsVerifier: Send + Sync {
    /// Verifies `signature` over `message` under `pubkey` in the given domain. For the builder
    /// bid, `message` is the bid's signing root computed with a nil fork version and nil
    /// validator root (spec.md §4.5 step 5).
    fn verify(
        &self,
        pubkey: &PublicKeyBytes,
        domain: [u8; 4],
        message: &[u8],
        signature: &SignatureBytes,
    ) -> bool;
}
