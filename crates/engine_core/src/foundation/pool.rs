//! Bounded object pool
//!
//! Fixed-capacity storage for short-lived gameplay objects (projectiles,
//! decals, transient effects). Keys are generational, so a key kept after
//! `release` simply stops resolving instead of aliasing a newer object.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to an object living in an [`ObjectPool`]
    pub struct PoolKey;
}

/// Fixed-capacity pool of `T`
#[derive(Debug)]
pub struct ObjectPool<T> {
    slots: SlotMap<PoolKey, T>,
    capacity: usize,
}

impl<T> ObjectPool<T> {
    /// Create a pool that holds at most `capacity` live objects
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: SlotMap::with_capacity_and_key(capacity),
            capacity,
        }
    }

    /// Store `value` in a free slot; `None` when the pool is exhausted
    pub fn acquire(&mut self, value: T) -> Option<PoolKey> {
        if self.is_full() {
            return None;
        }
        Some(self.slots.insert(value))
    }

    /// Return a slot to the pool, handing back its object
    pub fn release(&mut self, key: PoolKey) -> Option<T> {
        self.slots.remove(key)
    }

    /// Borrow a live object
    pub fn get(&self, key: PoolKey) -> Option<&T> {
        self.slots.get(key)
    }

    /// Mutably borrow a live object
    pub fn get_mut(&mut self, key: PoolKey) -> Option<&mut T> {
        self.slots.get_mut(key)
    }

    /// Iterate live objects with their keys
    pub fn iter(&self) -> impl Iterator<Item = (PoolKey, &T)> {
        self.slots.iter()
    }

    /// Keep only the objects for which `keep` returns true
    pub fn retain(&mut self, mut keep: impl FnMut(PoolKey, &mut T) -> bool) {
        self.slots.retain(|key, value| keep(key, value));
    }

    /// Number of live objects
    pub fn active_count(&self) -> usize {
        self.slots.len()
    }

    /// Maximum number of live objects
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether no more objects can be acquired
    pub fn is_full(&self) -> bool {
        self.slots.len() >= self.capacity
    }

    /// Release every object
    pub fn clear(&mut self) {
        self.slots.clear();
    }
}
