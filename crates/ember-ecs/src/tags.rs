use std::collections::HashMap;

use crate::entity::Entity;
use crate::error::{EcsError, EcsResult};
use crate::system::EntitySet;

/// One-to-one mapping between entities and unique names.
#[derive(Default)]
pub(crate) struct TagIndex {
    by_name: HashMap<String, Entity>,
    by_entity: HashMap<Entity, String>,
}

impl TagIndex {
    /// Bind `name` to `entity`.
    ///
    /// A name already held by another entity is rejected. An entity that already
    /// holds a different tag gives it up in favour of the new one.
    pub fn insert(&mut self, entity: Entity, name: String) -> EcsResult<()> {
        if let Some(&holder) = self.by_name.get(&name) {
            if holder == entity {
                return Ok(());
            }
            return Err(EcsError::DuplicateTag { tag: name, holder });
        }
        if let Some(previous) = self.by_entity.insert(entity, name.clone()) {
            self.by_name.remove(&previous);
        }
        self.by_name.insert(name, entity);
        Ok(())
    }

    pub fn entity(&self, name: &str) -> Option<Entity> {
        self.by_name.get(name).copied()
    }

    pub fn tag_of(&self, entity: Entity) -> Option<&str> {
        self.by_entity.get(&entity).map(String::as_str)
    }

    pub fn remove(&mut self, entity: Entity) -> Option<String> {
        let name = self.by_entity.remove(&entity)?;
        self.by_name.remove(&name);
        Some(name)
    }
}

/// One-to-many mapping from group names to entities. Each entity belongs to at
/// most one group.
#[derive(Default)]
pub(crate) struct GroupIndex {
    members: HashMap<String, EntitySet>,
    by_entity: HashMap<Entity, String>,
}

impl GroupIndex {
    /// Put `entity` in group `name`, leaving whatever group it was in before.
    pub fn insert(&mut self, entity: Entity, name: String) {
        if self.by_entity.get(&entity) == Some(&name) {
            return;
        }
        self.remove(entity);
        self.members
            .entry(name.clone())
            .or_default()
            .insert(entity);
        self.by_entity.insert(entity, name);
    }

    pub fn contains(&self, entity: Entity, name: &str) -> bool {
        self.by_entity.get(&entity).is_some_and(|g| g == name)
    }

    pub fn members(&self, name: &str) -> Vec<Entity> {
        self.members
            .get(name)
            .map(|set| set.iter().collect())
            .unwrap_or_default()
    }

    pub fn group_of(&self, entity: Entity) -> Option<&str> {
        self.by_entity.get(&entity).map(String::as_str)
    }

    pub fn remove(&mut self, entity: Entity) -> Option<String> {
        let name = self.by_entity.remove(&entity)?;
        if let Some(set) = self.members.get_mut(&name) {
            set.remove(entity);
            if set.is_empty() {
                self.members.remove(&name);
            }
        }
        Some(name)
    }
}
