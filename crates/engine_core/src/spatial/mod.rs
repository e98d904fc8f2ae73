//! Spatial partitioning and geometry primitives
//!
//! The [`SpatialIndex`] trait is the broad-phase seam used by visibility
//! culling and gameplay proximity queries; [`GridHash`] is the stock
//! implementation. Results are candidate sets and may include entities
//! outside the query volume, so callers follow up with an exact test.

pub mod bounds;
pub mod frustum;
pub mod grid_hash;

pub use bounds::{Aabb, Sphere};
pub use frustum::{Frustum, Plane};
pub use grid_hash::{CellCoord, GridHash};

use crate::ecs::EntityId;
use crate::foundation::math::Vec3;

/// Broad-phase spatial index over entity positions
pub trait SpatialIndex {
    /// Record `entity` at `position`
    fn insert(&mut self, entity: EntityId, position: Vec3);

    /// Forget `entity`, which was last recorded at `position`
    fn remove(&mut self, entity: EntityId, position: Vec3);

    /// Move `entity` from `old_position` to `new_position`
    fn update(&mut self, entity: EntityId, old_position: Vec3, new_position: Vec3);

    /// Candidates within a sphere, deduplicated and in ascending id order
    fn query_sphere(&self, center: Vec3, radius: f32) -> Vec<EntityId>;

    /// Candidates within a box, deduplicated and in ascending id order
    fn query_aabb(&self, aabb: &Aabb) -> Vec<EntityId>;

    /// Drop every entry
    fn clear(&mut self);

    /// Number of stored entries
    fn len(&self) -> usize;

    /// Whether nothing is stored
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Spatial index errors
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum SpatialError {
    /// Cell size must be a positive finite number
    #[error("Invalid cell size: {0} (must be > 0)")]
    InvalidCellSize(f32),
}
