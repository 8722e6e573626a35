use serde::{Deserialize, Serialize};

/// Maximum load a vehicle can carry, in demand units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Capacity(u64);

impl Capacity {
    /// Used when the capacity dimension is disabled.
    pub const UNLIMITED: Capacity = Capacity(u64::MAX);

    pub const fn new(value: u64) -> Self {
        Capacity(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_unlimited(&self) -> bool {
        *self == Capacity::UNLIMITED
    }

    #[inline]
    pub fn is_satisfied(&self, load: u64) -> bool {
        load <= self.0
    }

    /// Remaining room once `load` is on board, zero when already exceeded.
    #[inline]
    pub fn slack(&self, load: u64) -> u64 {
        self.0.saturating_sub(load)
    }
}

impl From<u64> for Capacity {
    fn from(value: u64) -> Self {
        Capacity(value)
    }
}
