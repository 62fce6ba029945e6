use crate::bid::SignedBuilderBid;
use crate::bls_verifier::BlsVerifier;
use crate::builder::{Builder, BuilderError};
use types::{ExecutionBlockHash, ExecutionPayload, Hash256, PublicKeyBytes, SignatureBytes, Slot};

pub struct FakeBuilder {
    pub bid: Option<SignedBuilderBid>,
}

impl Builder for FakeBuilder {
    fn status(&self) -> Result<(), BuilderError> {
        Ok(())
    }

    fn get_header(
        &self,
        _slot: Slot,
        _parent_hash: ExecutionBlockHash,
        _pubkey: PublicKeyBytes,
    ) -> Result<Option<SignedBuilderBid>, BuilderError> {
        Ok(self.bid.clone())
    }

    fn submit_blinded_block(
        &self,
        _block_root: Hash256,
        _header: &types::ExecutionPayloadHeader,
    ) -> Result<ExecutionPayload, BuilderError> {
        Err(BuilderError::Unavailable("fake builder does not unblind".into()))
    }
}

pub struct FakeBlsVerifier {
    pub valid: bool,
}

impl BlsVerifier for FakeBlsVerifier {
    fn verify(&self, _pubkey: &PublicKeyBytes, _domain: [u8; 4], _message: &[u8], _signature: &SignatureBytes) -> bool {
        self.valid
    }
}
