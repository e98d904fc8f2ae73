//! Entity registry

use std::collections::BTreeMap;

use super::{Component, Entity, EntityId};

/// Owner of all entities and their components
///
/// Every operation taking an [`EntityId`] treats an unknown id as a no-op.
#[derive(Debug)]
pub struct Registry {
    /// 64-bit so the counter cannot run out within a process lifetime
    next_id: u64,
    entities: BTreeMap<EntityId, Entity>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            next_id: 1,
            entities: BTreeMap::new(),
        }
    }

    /// Create a new entity
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.entities.insert(id, Entity::new(id, name));
        id
    }

    /// Create a new entity named "Entity"
    pub fn create_default_entity(&mut self) -> EntityId {
        self.create_entity("Entity")
    }

    /// Destroy an entity along with all of its components
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        self.entities.remove(&id).is_some()
    }

    /// Look up an entity
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Look up an entity mutably
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Whether `id` refers to a live entity
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Add a component to an entity, replacing any previous value of that type
    pub fn add_component<T: Component>(&mut self, id: EntityId, component: T) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.add_component(component);
                true
            }
            None => false,
        }
    }

    /// Get a component from an entity
    pub fn component<T: Component>(&self, id: EntityId) -> Option<&T> {
        self.entities.get(&id)?.component::<T>()
    }

    /// Get a mutable component from an entity
    pub fn component_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        self.entities.get_mut(&id)?.component_mut::<T>()
    }

    /// Whether the entity carries a component of type `T`
    pub fn has_component<T: Component>(&self, id: EntityId) -> bool {
        self.entities
            .get(&id)
            .map_or(false, |entity| entity.has_component::<T>())
    }

    /// Remove a component from an entity
    pub fn remove_component<T: Component>(&mut self, id: EntityId) -> Option<T> {
        self.entities.get_mut(&id)?.remove_component::<T>()
    }

    /// Set the active flag; returns false for unknown ids
    pub fn set_active(&mut self, id: EntityId, active: bool) -> bool {
        match self.entities.get_mut(&id) {
            Some(entity) => {
                entity.set_active(active);
                true
            }
            None => false,
        }
    }

    /// Whether the entity exists and is active
    pub fn is_active(&self, id: EntityId) -> bool {
        self.entities.get(&id).map_or(false, Entity::is_active)
    }

    /// All entities in ascending id order
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Snapshot of live ids, for mutation while walking
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.entities.keys().copied().collect()
    }

    /// Ids of entities carrying both `A` and `B`, in ascending order
    pub fn entities_with<A: Component, B: Component>(&self) -> Vec<EntityId> {
        self.entities
            .values()
            .filter(|entity| entity.has_component::<A>() && entity.has_component::<B>())
            .map(Entity::id)
            .collect()
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether no entities are alive
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn set_next_id(&mut self, next_id: u64) {
        self.next_id = next_id;
    }

    /// Drop every entity and restart ids from 1
    pub fn clear(&mut self) {
        self.entities.clear();
        self.next_id = 1;
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
