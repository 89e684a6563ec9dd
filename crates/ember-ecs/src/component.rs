use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

use parking_lot::RwLock;

use crate::signature::MAX_COMPONENTS;

/// Marker trait for types that can be stored as ECS components.
pub trait Component: 'static + Send + Sync {}

/// Blanket implementation: any `'static + Send + Sync` type is a valid component.
impl<T: 'static + Send + Sync> Component for T {}

/// Dense per-type index, assigned the first time a component type is seen.
///
/// The same id addresses the type's bit in a [`Signature`](crate::Signature)
/// and its storage in every registry of the process.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u8);

impl ComponentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

fn ids() -> &'static RwLock<HashMap<TypeId, ComponentId>> {
    static IDS: OnceLock<RwLock<HashMap<TypeId, ComponentId>>> = OnceLock::new();
    IDS.get_or_init(|| RwLock::new(HashMap::new()))
}

/// The id of component type `T`, assigning the next free one on first use.
///
/// # Panics
/// Panics when more than [`MAX_COMPONENTS`] distinct component types are used.
pub fn component_id<T: Component>() -> ComponentId {
    let type_id = TypeId::of::<T>();
    if let Some(&id) = ids().read().get(&type_id) {
        return id;
    }

    let mut ids = ids().write();
    // Another caller may have registered the type between the two locks.
    if let Some(&id) = ids.get(&type_id) {
        return id;
    }
    let next = ids.len();
    assert!(
        next < MAX_COMPONENTS,
        "cannot register component `{}`: limit of {MAX_COMPONENTS} component types reached",
        type_name::<T>()
    );
    let id = ComponentId(next as u8);
    ids.insert(type_id, id);
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Health;
    struct Armor;

    #[test]
    fn ids_are_stable_and_distinct() {
        let health = component_id::<Health>();
        let armor = component_id::<Armor>();
        assert_eq!(health, component_id::<Health>());
        assert_ne!(health, armor);
        assert!(health.index() < MAX_COMPONENTS);
    }
}
