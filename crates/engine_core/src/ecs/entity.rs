//! Entity identity and storage

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use super::Component;

/// Entity identifier
///
/// Zero is reserved as [`EntityId::INVALID`]; a registry hands out ids from 1
/// upwards and never reuses one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct EntityId(u64);

impl EntityId {
    /// The reserved "no entity" id
    pub const INVALID: Self = Self(0);

    /// Wrap a raw id
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw id
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Whether this id can refer to an entity
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named, optionally inactive bag of components
pub struct Entity {
    id: EntityId,
    name: String,
    active: bool,
    components: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Entity {
    pub(super) fn new(id: EntityId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            active: true,
            components: HashMap::new(),
        }
    }

    /// Get the entity ID
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the entity
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Inactive entities keep their components but are skipped by culling
    /// and rendering
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Toggle the active flag
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Attach `component`, replacing any existing value of the same type
    pub fn add_component<T: Component>(&mut self, component: T) {
        self.components.insert(TypeId::of::<T>(), Box::new(component));
    }

    /// Borrow the component of type `T`
    pub fn component<T: Component>(&self) -> Option<&T> {
        self.components
            .get(&TypeId::of::<T>())
            .and_then(|c| c.downcast_ref::<T>())
    }

    /// Mutably borrow the component of type `T`
    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components
            .get_mut(&TypeId::of::<T>())
            .and_then(|c| c.downcast_mut::<T>())
    }

    /// Whether a component of type `T` is attached
    pub fn has_component<T: Component>(&self) -> bool {
        self.components.contains_key(&TypeId::of::<T>())
    }

    /// Detach and return the component of type `T`
    pub fn remove_component<T: Component>(&mut self) -> Option<T> {
        self.components
            .remove(&TypeId::of::<T>())
            .and_then(|c| c.downcast::<T>().ok())
            .map(|c| *c)
    }

    /// Number of attached components
    pub fn component_count(&self) -> usize {
        self.components.len()
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("active", &self.active)
            .field("components", &self.components.len())
            .finish()
    }
}
