use crate::component::Component;
use crate::entity::Entity;
use crate::error::EcsResult;
use crate::registry::Registry;

/// An entity paired with the registry that owns it.
///
/// Every entity-scoped registry operation is available here, so level loaders
/// and event handlers can write `handle.add_component(..)?.group("enemies")?`.
///
/// ```ignore
/// let player = registry
///     .spawn()
///     .add_component(Transform::at(Vec2::new(10.0, 100.0)))?
///     .tag("player")?
///     .id();
/// ```
pub struct EntityHandle<'r> {
    entity: Entity,
    registry: &'r mut Registry,
}

impl<'r> EntityHandle<'r> {
    pub(crate) fn new(entity: Entity, registry: &'r mut Registry) -> Self {
        Self { entity, registry }
    }

    pub fn id(&self) -> Entity {
        self.entity
    }

    /// The owning registry.
    pub fn registry(&mut self) -> &mut Registry {
        self.registry
    }

    pub fn is_alive(&self) -> bool {
        self.registry.is_alive(self.entity)
    }

    /// Queue the entity for removal at the next flush.
    pub fn kill(&mut self) -> EcsResult<()> {
        self.registry.kill_entity(self.entity)
    }

    pub fn add_component<T: Component>(&mut self, component: T) -> EcsResult<&mut Self> {
        self.registry.add_component(self.entity, component)?;
        Ok(self)
    }

    pub fn remove_component<T: Component>(&mut self) -> EcsResult<bool> {
        self.registry.remove_component::<T>(self.entity)
    }

    pub fn has_component<T: Component>(&self) -> bool {
        self.registry.has_component::<T>(self.entity)
    }

    pub fn get_component<T: Component>(&self) -> EcsResult<&T> {
        self.registry.get_component::<T>(self.entity)
    }

    pub fn get_component_mut<T: Component>(&mut self) -> EcsResult<&mut T> {
        self.registry.get_component_mut::<T>(self.entity)
    }

    pub fn tag(&mut self, name: impl Into<String>) -> EcsResult<&mut Self> {
        self.registry.tag(self.entity, name)?;
        Ok(self)
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.registry.entity_has_tag(self.entity, name)
    }

    pub fn remove_tag(&mut self) -> EcsResult<bool> {
        self.registry.remove_tag(self.entity)
    }

    pub fn group(&mut self, name: impl Into<String>) -> EcsResult<&mut Self> {
        self.registry.group(self.entity, name)?;
        Ok(self)
    }

    pub fn belongs_to_group(&self, name: &str) -> bool {
        self.registry.belongs_to_group(self.entity, name)
    }

    pub fn remove_group(&mut self) -> EcsResult<bool> {
        self.registry.remove_group(self.entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Health(i32);

    #[test]
    fn handle_forwards_to_registry() {
        let mut registry = Registry::new();
        let id = registry
            .spawn()
            .add_component(Health(100))
            .unwrap()
            .tag("player")
            .unwrap()
            .group("heroes")
            .unwrap()
            .id();

        let mut handle = registry.entity(id).unwrap();
        assert!(handle.has_component::<Health>());
        assert!(handle.has_tag("player"));
        assert!(handle.belongs_to_group("heroes"));

        handle.get_component_mut::<Health>().unwrap().0 -= 30;
        assert_eq!(handle.get_component::<Health>(), Ok(&Health(70)));

        handle.kill().unwrap();
        assert!(handle.is_alive());
        handle.registry().update();
        assert!(!registry.is_alive(id));
    }

    #[test]
    fn handle_removals() {
        let mut registry = Registry::new();
        let mut handle = registry.spawn();
        handle.add_component(Health(1)).unwrap();
        handle.tag("target").unwrap();
        handle.group("enemies").unwrap();

        assert_eq!(handle.remove_component::<Health>(), Ok(true));
        assert_eq!(handle.remove_tag(), Ok(true));
        assert_eq!(handle.remove_group(), Ok(true));
        assert!(!handle.has_component::<Health>());
        assert!(!handle.has_tag("target"));
        assert!(!handle.belongs_to_group("enemies"));
    }
}
