use std::any::Any;
use std::collections::HashMap;
use std::rc::Rc;

use crate::entity::Entity;
use crate::signature::Signature;

/// A behaviour that runs once per step over every entity carrying its required
/// components.
///
/// The registry only needs the required signature. Each system exposes its own
/// `update` method taking whatever per-step context the frame loop owns
/// (delta time, bounds, the event bus), and reads its matched entities from
/// [`Registry::system_entities`](crate::Registry::system_entities).
///
/// ```ignore
/// struct MovementSystem { signature: Signature }
///
/// impl MovementSystem {
///     fn new() -> Self {
///         let mut signature = Signature::new();
///         signature.require_component::<Transform>();
///         signature.require_component::<Rigidbody>();
///         Self { signature }
///     }
/// }
///
/// impl System for MovementSystem {
///     fn signature(&self) -> Signature {
///         self.signature
///     }
/// }
/// ```
pub trait System: Any {
    /// Components an entity must carry to be matched by this system.
    fn signature(&self) -> Signature;
}

/// Unordered set of entities with O(1) insert, remove and membership test.
#[derive(Debug, Default, Clone)]
pub(crate) struct EntitySet {
    slots: HashMap<u32, usize>,
    dense: Vec<Entity>,
}

impl EntitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the entity was not already present.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.contains(entity) {
            return false;
        }
        self.slots.insert(entity.index, self.dense.len());
        self.dense.push(entity);
        true
    }

    /// Returns `true` if the entity was present.
    pub fn remove(&mut self, entity: Entity) -> bool {
        match self.slots.get(&entity.index) {
            Some(&slot) if self.dense[slot] == entity => {
                self.slots.remove(&entity.index);
                self.dense.swap_remove(slot);
                if let Some(moved) = self.dense.get(slot) {
                    self.slots.insert(moved.index, slot);
                }
                true
            }
            _ => false,
        }
    }

    pub fn contains(&self, entity: Entity) -> bool {
        self.slots
            .get(&entity.index)
            .is_some_and(|&slot| self.dense[slot] == entity)
    }

    pub fn iter(&self) -> impl Iterator<Item = Entity> + '_ {
        self.dense.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.dense.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dense.is_empty()
    }

    /// Empty the set, returning its members.
    pub fn drain(&mut self) -> Vec<Entity> {
        self.slots.clear();
        std::mem::take(&mut self.dense)
    }
}

/// Registry-side bookkeeping for one registered system.
pub(crate) struct SystemSlot {
    pub name: &'static str,
    pub signature: Signature,
    pub entities: EntitySet,
    pub instance: Rc<dyn Any>,
}

impl SystemSlot {
    pub fn new<S: System>(system: S) -> Self {
        Self {
            name: std::any::type_name::<S>(),
            signature: system.signature(),
            entities: EntitySet::new(),
            instance: Rc::new(system),
        }
    }

    /// Add or drop `entity` so that membership agrees with its signature.
    pub fn refresh(&mut self, entity: Entity, entity_signature: Signature) {
        if entity_signature.matches(self.signature) {
            self.entities.insert(entity);
        } else {
            self.entities.remove(entity);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_insert_remove() {
        let mut set = EntitySet::new();
        let a = Entity::from_raw(0, 0);
        let b = Entity::from_raw(1, 0);
        let c = Entity::from_raw(2, 0);
        assert!(set.insert(a));
        assert!(!set.insert(a));
        set.insert(b);
        set.insert(c);

        assert!(set.remove(a));
        assert!(!set.remove(a));
        assert!(set.contains(b) && set.contains(c));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn set_ignores_other_generation() {
        let mut set = EntitySet::new();
        let old = Entity::from_raw(4, 0);
        let new = Entity::from_raw(4, 1);
        set.insert(old);
        assert!(!set.contains(new));
        assert!(!set.remove(new));
        assert!(set.contains(old));
    }

    #[test]
    fn drain_empties() {
        let mut set = EntitySet::new();
        set.insert(Entity::from_raw(0, 0));
        set.insert(Entity::from_raw(1, 0));
        let drained = set.drain();
        assert_eq!(drained.len(), 2);
        assert!(set.is_empty());
        assert!(!set.contains(Entity::from_raw(0, 0)));
    }

    struct Nothing;

    impl System for Nothing {
        fn signature(&self) -> Signature {
            Signature::EMPTY
        }
    }

    #[test]
    fn slot_refresh_follows_signature() {
        let mut slot = SystemSlot::new(Nothing);
        slot.signature = Signature::new().with::<u16>();
        let e = Entity::from_raw(0, 0);

        slot.refresh(e, Signature::EMPTY);
        assert!(!slot.entities.contains(e));
        slot.refresh(e, Signature::new().with::<u16>().with::<u32>());
        assert!(slot.entities.contains(e));
        slot.refresh(e, Signature::new().with::<u32>());
        assert!(!slot.entities.contains(e));
    }
}
