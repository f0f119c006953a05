//! Chain identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies which chain a wallet or ledger endpoint is connected to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChainId(pub u64);

impl ChainId {
    /// Local development chain (the id Anvil and Hardhat nodes advertise).
    pub const LOCAL: Self = Self(31337);

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn is_local(&self) -> bool {
        *self == Self::LOCAL
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ChainId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}
