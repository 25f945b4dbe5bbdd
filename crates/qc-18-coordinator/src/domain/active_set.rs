//! # Active Executor Set
//!
//! Dense array maintained by swap-delete. Indices `[0, len)` are exactly
//! the active executors; slots beyond `len` are cleared and reused by the
//! next activation.

use super::value_objects::Address;
use serde::{Deserialize, Serialize};

/// Cleared slot marker.
pub const EMPTY_SLOT: Address = [0u8; 20];

/// Relocation caused by a swap-delete.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Relocation {
    pub address: Address,
    pub new_index: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveSet {
    slots: Vec<Address>,
    len: usize,
}

impl ActiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of active executors.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Backing array length (including cleared slots).
    pub fn capacity_slots(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, index: usize) -> Option<Address> {
        (index < self.len).then(|| self.slots[index])
    }

    pub fn as_slice(&self) -> &[Address] {
        &self.slots[..self.len]
    }

    /// Place `address` at index `len`, reusing a freed slot if one exists.
    pub fn activate(&mut self, address: Address) -> usize {
        let index = self.len;
        if index < self.slots.len() {
            self.slots[index] = address;
        } else {
            self.slots.push(address);
        }
        self.len += 1;
        index
    }

    /// Remove the executor at `index` by moving the last active one into
    /// its slot. Returns the relocation the caller must apply to the moved
    /// executor's `array_index`, if any.
    pub fn deactivate(&mut self, index: usize) -> Option<Relocation> {
        if index >= self.len {
            return None;
        }
        let last = self.len - 1;
        let relocation = if index != last {
            let moved = self.slots[last];
            self.slots[index] = moved;
            Some(Relocation {
                address: moved,
                new_index: index,
            })
        } else {
            None
        };
        self.slots[last] = EMPTY_SLOT;
        self.len = last;
        relocation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn addr(n: u8) -> Address {
        [n; 20]
    }

    #[test]
    fn test_activate_appends() {
        let mut set = ActiveSet::new();
        assert_eq!(set.activate(addr(1)), 0);
        assert_eq!(set.activate(addr(2)), 1);
        assert_eq!(set.as_slice(), &[addr(1), addr(2)]);
    }

    #[test]
    fn test_deactivate_swaps_last_into_hole() {
        let mut set = ActiveSet::new();
        for n in 1..=3 {
            set.activate(addr(n));
        }

        let relocation = set.deactivate(0);
        assert_eq!(
            relocation,
            Some(Relocation {
                address: addr(3),
                new_index: 0
            })
        );
        assert_eq!(set.as_slice(), &[addr(3), addr(2)]);
        assert_eq!(set.capacity_slots(), 3);
    }

    #[test]
    fn test_deactivate_last_has_no_relocation() {
        let mut set = ActiveSet::new();
        set.activate(addr(1));
        set.activate(addr(2));
        assert_eq!(set.deactivate(1), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_freed_slot_is_reused() {
        let mut set = ActiveSet::new();
        set.activate(addr(1));
        set.activate(addr(2));
        set.deactivate(1);
        assert_eq!(set.activate(addr(9)), 1);
        assert_eq!(set.capacity_slots(), 2);
    }

    #[test]
    fn test_out_of_range_is_noop() {
        let mut set = ActiveSet::new();
        set.activate(addr(1));
        assert_eq!(set.deactivate(5), None);
        assert_eq!(set.len(), 1);
        assert_eq!(set.get(1), None);
    }

    proptest! {
        #[test]
        fn prop_no_gaps(ops in proptest::collection::vec((any::<bool>(), 0usize..16), 0..64)) {
            let mut set = ActiveSet::new();
            let mut next = 1u8;
            // address -> index, tracked the way the ledger tracks array_index
            let mut index_of = std::collections::HashMap::new();

            for (activate, pick) in ops {
                if activate || set.is_empty() {
                    let a = addr(next);
                    next = next.wrapping_add(1).max(1);
                    if index_of.contains_key(&a) {
                        continue;
                    }
                    let i = set.activate(a);
                    index_of.insert(a, i);
                } else {
                    let i = pick % set.len();
                    let removed = set.as_slice()[i];
                    index_of.remove(&removed);
                    if let Some(r) = set.deactivate(i) {
                        index_of.insert(r.address, r.new_index);
                    }
                }

                prop_assert_eq!(index_of.len(), set.len());
                for (i, a) in set.as_slice().iter().enumerate() {
                    prop_assert_ne!(*a, EMPTY_SLOT);
                    prop_assert_eq!(index_of.get(a), Some(&i));
                }
            }
        }
    }
}
