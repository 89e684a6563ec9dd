use std::any::{type_name, TypeId};
use std::collections::HashMap;
use std::rc::Rc;

use tracing::{debug, trace};

use crate::component::{component_id, Component, ComponentId};
use crate::entity::{Entity, EntityAllocator};
use crate::error::{EcsError, EcsResult};
use crate::handle::EntityHandle;
use crate::signature::Signature;
use crate::storage::{ComponentStorage, SparseSet};
use crate::system::{EntitySet, System, SystemSlot};
use crate::tags::{GroupIndex, TagIndex};

/// The central ECS container. Owns all entities, components, systems and the
/// tag/group indices.
///
/// Structural changes are two-phase: [`create_entity`](Self::create_entity) and
/// [`kill_entity`](Self::kill_entity) only queue requests, and
/// [`update`](Self::update) applies them. Component attach/detach is immediate.
pub struct Registry {
    entities: EntityAllocator,
    storages: HashMap<ComponentId, Box<dyn ComponentStorage>>,
    systems: Vec<SystemSlot>,
    system_lookup: HashMap<TypeId, usize>,
    pending_add: EntitySet,
    pending_kill: EntitySet,
    tags: TagIndex,
    groups: GroupIndex,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            entities: EntityAllocator::new(),
            storages: HashMap::new(),
            systems: Vec::new(),
            system_lookup: HashMap::new(),
            pending_add: EntitySet::new(),
            pending_kill: EntitySet::new(),
            tags: TagIndex::default(),
            groups: GroupIndex::default(),
        }
    }

    // ---- Entity lifecycle ----

    /// Issue a fresh (or recycled) entity with no components.
    ///
    /// Components can be attached straight away; systems see the entity after the
    /// next [`update`](Self::update).
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.entities.allocate();
        self.pending_add.insert(entity);
        trace!("created entity {entity}");
        entity
    }

    /// Create an entity and return a handle to it.
    pub fn spawn(&mut self) -> EntityHandle<'_> {
        let entity = self.create_entity();
        EntityHandle::new(entity, self)
    }

    /// Handle to an existing entity.
    pub fn entity(&mut self, entity: Entity) -> EcsResult<EntityHandle<'_>> {
        self.ensure_alive(entity)?;
        Ok(EntityHandle::new(entity, self))
    }

    /// Request destruction of an entity at the next [`update`](Self::update).
    ///
    /// Until then the entity keeps its components, tag, group and system
    /// memberships.
    pub fn kill_entity(&mut self, entity: Entity) -> EcsResult<()> {
        self.ensure_alive(entity)?;
        if self.pending_kill.insert(entity) {
            trace!("entity {entity} marked for removal");
        }
        Ok(())
    }

    /// Whether the handle refers to a live entity (including one pending removal).
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.entities.is_alive(entity)
    }

    /// Whether the entity is queued for removal at the next flush.
    pub fn is_pending_kill(&self, entity: Entity) -> bool {
        self.pending_kill.contains(entity)
    }

    /// Number of live entities.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Component signature of a live entity.
    pub fn signature_of(&self, entity: Entity) -> EcsResult<Signature> {
        self.entities
            .signature(entity)
            .ok_or(EcsError::InvalidEntity(entity))
    }

    /// Apply queued structural changes. Must run once per step before systems.
    ///
    /// Newly created entities are matched against every system; killed entities
    /// leave every system, lose their components, tag and group, and their index
    /// returns to the free list.
    pub fn update(&mut self) {
        let added = self.pending_add.drain();
        for &entity in &added {
            if let Some(signature) = self.entities.signature(entity) {
                for slot in &mut self.systems {
                    slot.refresh(entity, signature);
                }
            }
        }

        let killed = self.pending_kill.drain();
        for &entity in &killed {
            for slot in &mut self.systems {
                slot.entities.remove(entity);
            }
            for storage in self.storages.values_mut() {
                storage.remove(entity.index);
            }
            self.tags.remove(entity);
            self.groups.remove(entity);
            self.entities.deallocate(entity);
        }

        if !added.is_empty() || !killed.is_empty() {
            debug!(
                added = added.len(),
                killed = killed.len(),
                alive = self.entities.len(),
                "flushed entity changes"
            );
        }
    }

    fn ensure_alive(&self, entity: Entity) -> EcsResult<()> {
        if self.entities.is_alive(entity) {
            Ok(())
        } else {
            Err(EcsError::InvalidEntity(entity))
        }
    }

    /// Bring `entity`'s system memberships in line with its signature. Entities
    /// still waiting for their first flush are left alone.
    fn refresh_memberships(&mut self, entity: Entity) {
        if self.pending_add.contains(entity) {
            return;
        }
        if let Some(signature) = self.entities.signature(entity) {
            for slot in &mut self.systems {
                slot.refresh(entity, signature);
            }
        }
    }

    // ---- Component management ----

    fn storage_mut<T: Component>(&mut self, id: ComponentId) -> &mut SparseSet<T> {
        self.storages
            .entry(id)
            .or_insert_with(|| Box::new(SparseSet::<T>::new()))
            .as_any_mut()
            .downcast_mut::<SparseSet<T>>()
            .expect("component type mismatch")
    }

    fn storage<T: Component>(&self) -> Option<&SparseSet<T>> {
        self.storages
            .get(&component_id::<T>())
            .and_then(|s| s.as_any().downcast_ref::<SparseSet<T>>())
    }

    /// Attach a component, replacing any existing one of the same type.
    pub fn add_component<T: Component>(&mut self, entity: Entity, component: T) -> EcsResult<()> {
        self.ensure_alive(entity)?;
        let id = component_id::<T>();
        self.storage_mut::<T>(id).insert(entity.index, component);
        if let Some(signature) = self.entities.signature_mut(entity) {
            signature.set(id);
        }
        self.refresh_memberships(entity);
        trace!("added {} to entity {entity}", type_name::<T>());
        Ok(())
    }

    /// Detach a component. Returns `true` if it was present.
    pub fn remove_component<T: Component>(&mut self, entity: Entity) -> EcsResult<bool> {
        self.ensure_alive(entity)?;
        let id = component_id::<T>();
        let removed = self
            .storages
            .get_mut(&id)
            .is_some_and(|storage| storage.remove(entity.index));
        if let Some(signature) = self.entities.signature_mut(entity) {
            signature.clear(id);
        }
        self.refresh_memberships(entity);
        if removed {
            trace!("removed {} from entity {entity}", type_name::<T>());
        }
        Ok(removed)
    }

    /// Whether a live entity carries component `T`. Always `false` for stale handles.
    pub fn has_component<T: Component>(&self, entity: Entity) -> bool {
        self.entities
            .signature(entity)
            .is_some_and(|signature| signature.contains(component_id::<T>()))
    }

    pub fn get_component<T: Component>(&self, entity: Entity) -> EcsResult<&T> {
        self.ensure_alive(entity)?;
        self.storage::<T>()
            .and_then(|storage| storage.get(entity.index))
            .ok_or(EcsError::MissingComponent {
                entity,
                component: type_name::<T>(),
            })
    }

    pub fn get_component_mut<T: Component>(&mut self, entity: Entity) -> EcsResult<&mut T> {
        self.ensure_alive(entity)?;
        let id = component_id::<T>();
        self.storages
            .get_mut(&id)
            .and_then(|s| s.as_any_mut().downcast_mut::<SparseSet<T>>())
            .and_then(|storage| storage.get_mut(entity.index))
            .ok_or(EcsError::MissingComponent {
                entity,
                component: type_name::<T>(),
            })
    }

    /// Number of stored `T` values across all entities.
    pub fn component_count<T: Component>(&self) -> usize {
        self.storages
            .get(&component_id::<T>())
            .map_or(0, |storage| storage.len())
    }

    /// Names of the component types currently attached to an entity.
    pub fn component_names(&self, entity: Entity) -> EcsResult<Vec<&'static str>> {
        self.ensure_alive(entity)?;
        let mut names: Vec<_> = self
            .storages
            .values()
            .filter(|storage| storage.has(entity.index))
            .map(|storage| storage.component_name())
            .collect();
        names.sort_unstable();
        Ok(names)
    }

    // ---- Systems ----

    /// Register the single instance of system `S`.
    ///
    /// Live entities that already satisfy its signature are matched immediately;
    /// entities still waiting for their first flush are matched at that flush.
    pub fn add_system<S: System>(&mut self, system: S) -> EcsResult<()> {
        let type_id = TypeId::of::<S>();
        if self.system_lookup.contains_key(&type_id) {
            return Err(EcsError::DuplicateSystem(type_name::<S>()));
        }

        let mut slot = SystemSlot::new(system);
        for entity in self.entities.iter_alive() {
            if self.pending_add.contains(entity) {
                continue;
            }
            if let Some(signature) = self.entities.signature(entity) {
                slot.refresh(entity, signature);
            }
        }
        debug!(
            system = slot.name,
            matched = slot.entities.len(),
            "registered system"
        );

        self.system_lookup.insert(type_id, self.systems.len());
        self.systems.push(slot);
        Ok(())
    }

    fn slot<S: System>(&self) -> EcsResult<&SystemSlot> {
        self.system_lookup
            .get(&TypeId::of::<S>())
            .map(|&index| &self.systems[index])
            .ok_or(EcsError::UnknownSystem(type_name::<S>()))
    }

    /// Shared handle to the registered instance of `S`.
    ///
    /// The returned `Rc` does not borrow the registry, so the system can be
    /// handed `&mut Registry` in its own update.
    pub fn system<S: System>(&self) -> EcsResult<Rc<S>> {
        let slot = self.slot::<S>()?;
        Rc::clone(&slot.instance)
            .downcast::<S>()
            .map_err(|_| EcsError::UnknownSystem(type_name::<S>()))
    }

    pub fn has_system<S: System>(&self) -> bool {
        self.system_lookup.contains_key(&TypeId::of::<S>())
    }

    /// Snapshot of the entities currently matched by `S`.
    pub fn system_entities<S: System>(&self) -> EcsResult<Vec<Entity>> {
        Ok(self.slot::<S>()?.entities.iter().collect())
    }

    /// Whether `S` currently matches `entity`.
    pub fn system_contains<S: System>(&self, entity: Entity) -> EcsResult<bool> {
        Ok(self.slot::<S>()?.entities.contains(entity))
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    // ---- Tags ----

    /// Give an entity a unique name.
    ///
    /// Fails with [`EcsError::DuplicateTag`] if another entity holds the name.
    /// An entity that already has a different tag has it replaced.
    pub fn tag(&mut self, entity: Entity, name: impl Into<String>) -> EcsResult<()> {
        self.ensure_alive(entity)?;
        self.tags.insert(entity, name.into())
    }

    /// Whether any entity holds the tag.
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.entity(name).is_some()
    }

    /// Whether `entity` is the holder of the tag.
    pub fn entity_has_tag(&self, entity: Entity, name: &str) -> bool {
        self.tags.entity(name) == Some(entity)
    }

    pub fn tag_of(&self, entity: Entity) -> Option<&str> {
        self.tags.tag_of(entity)
    }

    pub fn entity_by_tag(&self, name: &str) -> EcsResult<Entity> {
        self.tags
            .entity(name)
            .ok_or_else(|| EcsError::UnknownTag(name.to_string()))
    }

    /// Release an entity's tag. Returns `true` if it had one.
    pub fn remove_tag(&mut self, entity: Entity) -> EcsResult<bool> {
        self.ensure_alive(entity)?;
        Ok(self.tags.remove(entity).is_some())
    }

    // ---- Groups ----

    /// Put an entity in a group, leaving any group it belonged to before.
    pub fn group(&mut self, entity: Entity, name: impl Into<String>) -> EcsResult<()> {
        self.ensure_alive(entity)?;
        self.groups.insert(entity, name.into());
        Ok(())
    }

    pub fn belongs_to_group(&self, entity: Entity, name: &str) -> bool {
        self.groups.contains(entity, name)
    }

    pub fn entities_by_group(&self, name: &str) -> Vec<Entity> {
        self.groups.members(name)
    }

    pub fn group_of(&self, entity: Entity) -> Option<&str> {
        self.groups.group_of(entity)
    }

    /// Take an entity out of its group. Returns `true` if it was in one.
    pub fn remove_group(&mut self, entity: Entity) -> EcsResult<bool> {
        self.ensure_alive(entity)?;
        Ok(self.groups.remove(entity).is_some())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
