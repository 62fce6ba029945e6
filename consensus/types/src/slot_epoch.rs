use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

macro_rules! impl_u64_wrapper {
    ($name:ident) => {
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(slot: u64) -> Self {
                Self(slot)
            }

            pub const fn as_u64(&self) -> u64 {
                self.0
            }

            pub fn as_usize(&self) -> usize {
                self.0 as usize
            }

            pub fn saturating_sub(&self, other: impl Into<Self>) -> Self {
                Self(self.0.saturating_sub(other.into().0))
            }

            pub fn saturating_add(&self, other: impl Into<Self>) -> Self {
                Self(self.0.saturating_add(other.into().0))
            }
        }

        impl From<u64> for $name {
            fn from(slot: u64) -> Self {
                Self(slot)
            }
        }

        impl From<$name> for u64 {
            fn from(slot: $name) -> Self {
                slot.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Add<u64> for $name {
            type Output = Self;
            fn add(self, rhs: u64) -> Self {
                Self(self.0 + rhs)
            }
        }

        impl Sub<u64> for $name {
            type Output = Self;
            fn sub(self, rhs: u64) -> Self {
                Self(self.0 - rhs)
            }
        }
    };
}

impl_u64_wrapper!(Slot);
impl_u64_wrapper!(Epoch);

impl Slot {
    /// Returns the epoch containing this slot, per `epoch = slot / slots_per_epoch`.
    pub fn epoch(&self, slots_per_epoch: u64) -> Epoch {
        Epoch::new(self.as_u64() / slots_per_epoch)
    }

    /// Returns true if this slot is the first slot of its epoch.
    pub fn is_epoch_start(&self, slots_per_epoch: u64) -> bool {
        self.as_u64() % slots_per_epoch == 0
    }
}

impl Epoch {
    /// Returns the first slot of this epoch.
    pub fn start_slot(&self, slots_per_epoch: u64) -> Slot {
        Slot::new(self.as_u64() * slots_per_epoch)
    }

    /// Returns the last slot of this epoch.
    pub fn end_slot(&self, slots_per_epoch: u64) -> Slot {
        Slot::new((self.as_u64() + 1) * slots_per_epoch - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_arithmetic() {
        assert_eq!(Slot::new(0).epoch(32), Epoch::new(0));
        assert_eq!(Slot::new(31).epoch(32), Epoch::new(0));
        assert_eq!(Slot::new(32).epoch(32), Epoch::new(1));
        assert_eq!(Epoch::new(1).start_slot(32), Slot::new(32));
        assert_eq!(Epoch::new(1).end_slot(32), Slot::new(63));
    }

    #[test]
    fn epoch_start_boundary() {
        assert!(Slot::new(32).is_epoch_start(32));
        assert!(!Slot::new(33).is_epoch_start(32));
    }
}
