//! Fixed-capacity value storage.
//!
//! The store owns value pairs only; names and policy live in the registry's
//! descriptor map. Slots are handed out in order, never reused and never
//! moved: the backing vector is allocated at full capacity up front and only
//! ever grows within it.

use std::fmt;

use crate::{hash::NameHash, value::Value};

/// Index of an entry's value pair inside a [`ValueStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(usize);

impl Slot {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One slot: the declared default, the live value, and the owning entry.
#[derive(Debug, Clone)]
pub(crate) struct SlotRecord {
    pub initial: Value,
    pub current: Value,
    pub owner: NameHash,
}

#[derive(Debug)]
pub(crate) struct ValueStore {
    records: Vec<SlotRecord>,
    capacity: usize,
}

impl ValueStore {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots handed out so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= self.capacity
    }

    /// Appends a slot holding `value` as both initial and current value.
    /// Returns `None` when the store is full.
    pub fn push(&mut self, value: Value, owner: NameHash) -> Option<Slot> {
        if self.is_full() {
            return None;
        }
        let slot = Slot(self.records.len());
        self.records.push(SlotRecord {
            initial: value.clone(),
            current: value,
            owner,
        });
        Some(slot)
    }

    pub fn get(&self, slot: Slot) -> Option<&SlotRecord> {
        self.records.get(slot.0)
    }

    pub fn get_mut(&mut self, slot: Slot) -> Option<&mut SlotRecord> {
        self.records.get_mut(slot.0)
    }

    /// Occupied slots in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &SlotRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| (Slot(i), record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_stops_at_capacity_without_reallocating() {
        let mut store = ValueStore::with_capacity(2);
        let base = store.records.as_ptr();

        let a = store.push(Value::Int(1), NameHash::of("a"));
        let b = store.push(Value::Int(2), NameHash::of("b"));
        assert_eq!(a, Some(Slot::new(0)));
        assert_eq!(b, Some(Slot::new(1)));
        assert_eq!(store.push(Value::Int(3), NameHash::of("c")), None);

        assert_eq!(store.records.as_ptr(), base);
        assert_eq!(store.get(Slot::new(0)).map(|r| &r.current), Some(&Value::Int(1)));
        assert!(store.get(Slot::new(2)).is_none());
    }
}
