use std::any::{type_name, Any};
use std::collections::HashMap;

use crate::component::Component;

/// Type-erased component storage interface.
pub(crate) trait ComponentStorage: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn remove(&mut self, index: u32) -> bool;
    fn has(&self, index: u32) -> bool;
    fn len(&self) -> usize;
    fn component_name(&self) -> &'static str;
}

/// Sparse-set storage for a single component type. Provides O(1) insert/remove/lookup
/// and keeps values packed.
///
/// The sparse side is a map keyed by entity index, so memory is proportional to the
/// number of stored values rather than to the largest index ever issued.
pub(crate) struct SparseSet<T> {
    /// Maps entity index to dense slot.
    sparse: HashMap<u32, usize>,
    /// Packed component values.
    dense: Vec<T>,
    /// Entity index owning each dense slot.
    entities: Vec<u32>,
}

impl<T: Component> SparseSet<T> {
    pub fn new() -> Self {
        Self {
            sparse: HashMap::new(),
            dense: Vec::new(),
            entities: Vec::new(),
        }
    }

    /// Insert or replace the component for the given entity index.
    pub fn insert(&mut self, index: u32, value: T) {
        if let Some(&slot) = self.sparse.get(&index) {
            self.dense[slot] = value;
        } else {
            self.sparse.insert(index, self.dense.len());
            self.dense.push(value);
            self.entities.push(index);
        }
    }

    pub fn get(&self, index: u32) -> Option<&T> {
        self.sparse.get(&index).map(|&slot| &self.dense[slot])
    }

    pub fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        self.sparse.get(&index).map(|&slot| &mut self.dense[slot])
    }
}

impl<T: Component> ComponentStorage for SparseSet<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn remove(&mut self, index: u32) -> bool {
        let Some(slot) = self.sparse.remove(&index) else {
            return false;
        };

        // Swap-remove: move the last value into the hole and repoint its owner
        // before returning, so the map never refers to a vacated slot.
        let last = self.dense.len() - 1;
        if slot != last {
            self.dense.swap(slot, last);
            self.entities.swap(slot, last);
            let moved = self.entities[slot];
            self.sparse.insert(moved, slot);
        }
        self.dense.pop();
        self.entities.pop();
        true
    }

    fn has(&self, index: u32) -> bool {
        self.sparse.contains_key(&index)
    }

    fn len(&self) -> usize {
        self.dense.len()
    }

    fn component_name(&self) -> &'static str {
        type_name::<T>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut set = SparseSet::new();
        set.insert(5, 42i32);
        assert_eq!(set.get(5), Some(&42));
        assert_eq!(set.get(0), None);
    }

    #[test]
    fn overwrite() {
        let mut set = SparseSet::new();
        set.insert(0, 1i32);
        set.insert(0, 2);
        assert_eq!(set.get(0), Some(&2));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_and_swap() {
        let mut set = SparseSet::new();
        set.insert(0, 'a');
        set.insert(1, 'b');
        set.insert(2, 'c');
        assert!(set.remove(0));
        assert_eq!(set.get(0), None);
        assert_eq!(set.get(1), Some(&'b'));
        assert_eq!(set.get(2), Some(&'c'));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn remove_last_and_missing() {
        let mut set = SparseSet::new();
        set.insert(7, 1u8);
        set.insert(9, 2u8);
        assert!(set.remove(9));
        assert!(!set.remove(9));
        assert!(!set.remove(1234));
        assert_eq!(set.get(7), Some(&1));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn large_indices_stay_compact() {
        let mut set = SparseSet::new();
        set.insert(u32::MAX - 1, 10u64);
        set.insert(3, 20u64);
        assert!(set.has(u32::MAX - 1));
        *set.get_mut(3).unwrap() += 1;
        assert_eq!(set.get(3), Some(&21));
        assert_eq!(set.len(), 2);
    }
}
