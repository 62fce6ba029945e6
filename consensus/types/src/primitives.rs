use serde::de::Error as SerdeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

pub use ethereum_types::{Address, H256 as Hash256, U256 as Uint256};

/// The hash of an execution-layer block, distinct from `Hash256` only by name so call sites
/// read correctly (mirrors the teacher's newtype-over-`Hash256` convention).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExecutionBlockHash(pub Hash256);

impl ExecutionBlockHash {
    pub fn zero() -> Self {
        Self(Hash256::zero())
    }
}

impl From<Hash256> for ExecutionBlockHash {
    fn from(hash: Hash256) -> Self {
        Self(hash)
    }
}

impl From<ExecutionBlockHash> for Hash256 {
    fn from(hash: ExecutionBlockHash) -> Self {
        hash.0
    }
}

impl fmt::Display for ExecutionBlockHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl Serialize for ExecutionBlockHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ExecutionBlockHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Hash256::deserialize(deserializer).map(Self)
    }
}

macro_rules! impl_fixed_bytes {
    ($name:ident, $len:expr) => {
        #[derive(Clone, Copy)]
        pub struct $name(pub [u8; $len]);

        impl $name {
            pub fn zero() -> Self {
                Self([0; $len])
            }

            pub fn as_bytes(&self) -> &[u8] {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::zero()
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.0[..] == other.0[..]
            }
        }
        impl Eq for $name {}

        impl std::hash::Hash for $name {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                self.0.hash(state)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}(0x{})", stringify!($name), hex::encode(self.0))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&format!("0x{}", hex::encode(self.0)))
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                let stripped = s.strip_prefix("0x").unwrap_or(&s);
                let bytes = hex::decode(stripped).map_err(D::Error::custom)?;
                if bytes.len() != $len {
                    return Err(D::Error::custom(format!(
                        "expected {} bytes, got {}",
                        $len,
                        bytes.len()
                    )));
                }
                let mut out = [0u8; $len];
                out.copy_from_slice(&bytes);
                Ok(Self(out))
            }
        }
    };
}

// BLS signature verification lives outside this crate (see `BlsVerifier`); these are plain
// fixed-size byte containers, not cryptographic types.
impl_fixed_bytes!(PublicKeyBytes, 48);
impl_fixed_bytes!(SignatureBytes, 96);
impl_fixed_bytes!(Graffiti, 32);

/// A KZG commitment to a blob, as introduced in the Deneb fork. Verification of the commitment
/// against its blob is outside this crate's scope.
pub type KzgCommitment = [u8; 48];
pub type KzgProof = [u8; 48];
