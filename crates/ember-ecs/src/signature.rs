use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

use crate::component::{component_id, Component, ComponentId};

/// Number of distinct component types a signature can describe.
pub const MAX_COMPONENTS: usize = 64;

/// Bit set of component types. Bit `i` is set when component type `i` is present
/// (on an entity) or required (by a system).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signature(u64);

impl Signature {
    pub const EMPTY: Signature = Signature(0);

    pub fn new() -> Self {
        Self::EMPTY
    }

    /// Set the bit for a component id.
    pub fn set(&mut self, id: ComponentId) {
        self.0 |= 1 << id.index();
    }

    /// Clear the bit for a component id.
    pub fn clear(&mut self, id: ComponentId) {
        self.0 &= !(1 << id.index());
    }

    pub fn contains(&self, id: ComponentId) -> bool {
        self.0 & (1 << id.index()) != 0
    }

    /// Add component `T` to the set. Calling it more than once has no further effect.
    pub fn require_component<T: Component>(&mut self) {
        self.set(component_id::<T>());
    }

    /// Builder form of [`Signature::require_component`].
    pub fn with<T: Component>(mut self) -> Self {
        self.require_component::<T>();
        self
    }

    /// Whether every bit of `required` is also set in `self`.
    pub fn matches(&self, required: Signature) -> bool {
        self.0 & required.0 == required.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Number of component types in the set.
    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn bits(&self) -> u64 {
        self.0
    }
}

impl BitAnd for Signature {
    type Output = Signature;

    fn bitand(self, rhs: Self) -> Self::Output {
        Signature(self.0 & rhs.0)
    }
}

impl BitOr for Signature {
    type Output = Signature;

    fn bitor(self, rhs: Self) -> Self::Output {
        Signature(self.0 | rhs.0)
    }
}

impl BitOrAssign for Signature {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({:#b})", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct A;
    struct B;
    struct C;

    #[test]
    fn require_is_idempotent() {
        let mut sig = Signature::new();
        sig.require_component::<A>();
        sig.require_component::<A>();
        assert_eq!(sig.len(), 1);
        assert!(sig.contains(component_id::<A>()));
    }

    #[test]
    fn matching_is_superset_test() {
        let required = Signature::new().with::<A>().with::<B>();
        let full = required.with::<C>();
        let partial = Signature::new().with::<A>();

        assert!(full.matches(required));
        assert!(required.matches(required));
        assert!(!partial.matches(required));
        assert!(partial.matches(Signature::EMPTY));
        assert_eq!(full & required, required);
    }

    #[test]
    fn set_and_clear() {
        let id = component_id::<B>();
        let mut sig = Signature::new();
        sig.set(id);
        assert!(sig.contains(id));
        sig.clear(id);
        assert!(sig.is_empty());
    }
}
