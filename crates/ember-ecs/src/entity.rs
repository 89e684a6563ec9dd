use std::fmt;

use crate::signature::Signature;

/// A generational entity handle. Uses compact u32 index + generation for cache performance.
///
/// The generation is bumped every time an index is recycled, so a handle kept
/// past its entity's destruction never aliases the entity that reuses the index.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

impl Entity {
    /// Create an entity from raw parts (mainly for testing).
    pub fn from_raw(index: u32, generation: u32) -> Self {
        Self { index, generation }
    }

    /// The slot index of this entity.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The generation of this entity (incremented on reuse).
    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entity({}v{})", self.index, self.generation)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

/// Allocates and recycles entity slots with generational tracking, and keeps the
/// component signature of every live slot.
#[derive(Default)]
pub(crate) struct EntityAllocator {
    generations: Vec<u32>,
    alive: Vec<bool>,
    signatures: Vec<Signature>,
    free_list: Vec<u32>,
    len: usize,
}

impl EntityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a new entity with an empty signature, reusing a freed slot if available.
    pub fn allocate(&mut self) -> Entity {
        self.len += 1;
        if let Some(index) = self.free_list.pop() {
            let idx = index as usize;
            self.alive[idx] = true;
            self.signatures[idx] = Signature::EMPTY;
            Entity {
                index,
                generation: self.generations[idx],
            }
        } else {
            let index = self.generations.len() as u32;
            self.generations.push(0);
            self.alive.push(true);
            self.signatures.push(Signature::EMPTY);
            Entity {
                index,
                generation: 0,
            }
        }
    }

    /// Deallocate an entity. Returns `true` if it was alive.
    pub fn deallocate(&mut self, entity: Entity) -> bool {
        if !self.is_alive(entity) {
            return false;
        }
        let idx = entity.index as usize;
        self.alive[idx] = false;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.signatures[idx] = Signature::EMPTY;
        self.free_list.push(entity.index);
        self.len -= 1;
        true
    }

    /// Check if an entity is currently alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        let idx = entity.index as usize;
        idx < self.alive.len() && self.alive[idx] && self.generations[idx] == entity.generation
    }

    /// Signature of a live entity.
    pub fn signature(&self, entity: Entity) -> Option<Signature> {
        self.is_alive(entity)
            .then(|| self.signatures[entity.index as usize])
    }

    /// Mutable signature of a live entity.
    pub fn signature_mut(&mut self, entity: Entity) -> Option<&mut Signature> {
        if !self.is_alive(entity) {
            return None;
        }
        Some(&mut self.signatures[entity.index as usize])
    }

    /// All live entities, in index order.
    pub fn iter_alive(&self) -> impl Iterator<Item = Entity> + '_ {
        self.alive
            .iter()
            .zip(&self.generations)
            .enumerate()
            .filter(|(_, (alive, _))| **alive)
            .map(|(index, (_, &generation))| Entity {
                index: index as u32,
                generation,
            })
    }

    /// Number of currently alive entities.
    pub fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_sequential() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        let e1 = alloc.allocate();
        assert_eq!(e0.index, 0);
        assert_eq!(e1.index, 1);
        assert_eq!(e0.generation, 0);
        assert_eq!(alloc.len(), 2);
    }

    #[test]
    fn deallocate_and_reuse() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        assert!(alloc.deallocate(e0));
        let e0_reused = alloc.allocate();
        assert_eq!(e0_reused.index, 0);
        assert_eq!(e0_reused.generation, 1);
        assert_ne!(e0, e0_reused);
    }

    #[test]
    fn double_deallocate_fails() {
        let mut alloc = EntityAllocator::new();
        let e = alloc.allocate();
        assert!(alloc.deallocate(e));
        assert!(!alloc.deallocate(e));
    }

    #[test]
    fn stale_entity_has_no_signature() {
        let mut alloc = EntityAllocator::new();
        let e0 = alloc.allocate();
        *alloc.signature_mut(e0).unwrap() = Signature::new().with::<u8>();
        alloc.deallocate(e0);
        assert!(!alloc.is_alive(e0));
        assert!(alloc.signature(e0).is_none());

        let e0_new = alloc.allocate();
        assert!(alloc.is_alive(e0_new));
        assert_eq!(alloc.signature(e0_new), Some(Signature::EMPTY));
    }

    #[test]
    fn iter_alive_skips_freed_slots() {
        let mut alloc = EntityAllocator::new();
        let a = alloc.allocate();
        let b = alloc.allocate();
        let c = alloc.allocate();
        alloc.deallocate(b);
        let alive: Vec<_> = alloc.iter_alive().collect();
        assert_eq!(alive, vec![a, c]);
    }
}
