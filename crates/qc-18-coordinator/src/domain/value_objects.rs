//! # Value Objects
//!
//! Identities, hashes and the module bitset.

use primitive_types::U256;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};

/// Ethereum-style participant address (20 bytes).
pub type Address = [u8; 20];

/// 32-byte Keccak-256 digest.
pub type Hash = [u8; 32];

/// Index into the module catalog.
pub type ModuleId = u8;

/// Minimum number of modules an initialized executor must support.
pub const MIN_REGISTERED_MODULES: u32 = 2;

/// Keccak-256 over the concatenation of `parts`.
pub fn keccak256(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    hasher.finalize().into()
}

/// Set of module capability flags (one bit per catalog entry).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModuleSet(U256);

impl ModuleSet {
    pub const EMPTY: ModuleSet = ModuleSet(U256([0; 4]));

    /// Build a set from raw bits.
    pub fn from_bits(bits: U256) -> Self {
        Self(bits)
    }

    /// Build a set from module ids.
    pub fn from_ids(ids: &[ModuleId]) -> Self {
        ids.iter().fold(Self::EMPTY, |set, id| set.with(*id))
    }

    /// Set containing every id in `0..count`.
    pub fn first_n(count: usize) -> Self {
        if count >= 256 {
            return Self(U256::MAX);
        }
        Self((U256::one() << count) - U256::one())
    }

    pub fn bits(&self) -> U256 {
        self.0
    }

    pub fn with(self, id: ModuleId) -> Self {
        Self(self.0 | (U256::one() << id as usize))
    }

    pub fn contains(&self, id: ModuleId) -> bool {
        self.0.bit(id as usize)
    }

    /// True when both the execution and the fee module are present.
    pub fn supports(&self, execution_module: ModuleId, fee_module: ModuleId) -> bool {
        self.contains(execution_module) && self.contains(fee_module)
    }

    pub fn count(&self) -> u32 {
        self.0 .0.iter().map(|limb| limb.count_ones()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_zero()
    }

    pub fn intersection(&self, other: &ModuleSet) -> ModuleSet {
        Self(self.0 & other.0)
    }

    pub fn union(&self, other: &ModuleSet) -> ModuleSet {
        Self(self.0 | other.0)
    }

    pub fn difference(&self, other: &ModuleSet) -> ModuleSet {
        Self(self.0 & !other.0)
    }

    pub fn intersects(&self, other: &ModuleSet) -> bool {
        !self.intersection(other).is_empty()
    }

    /// Module ids present, ascending.
    pub fn ids(&self) -> Vec<ModuleId> {
        (0..=ModuleId::MAX).filter(|id| self.contains(*id)).collect()
    }
}
