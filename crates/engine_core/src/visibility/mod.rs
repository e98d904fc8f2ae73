//! Frustum culling over the spatial index
//!
//! Membership (`register_entity` / `unregister_entity`) and the per-frame
//! [`VisibilitySystem::cull`] pass are separate steps; the engine runs
//! `cull` once per frame after subsystem updates.

use std::collections::BTreeSet;

use crate::ecs::{EntityId, Registry, RenderableComponent, TransformComponent};
use crate::foundation::math::Mat4;
use crate::spatial::{Frustum, SpatialIndex, Sphere};

/// Tracks which registered entities fall inside the camera frustum
#[derive(Debug, Clone)]
pub struct VisibilitySystem {
    view_projection: Mat4,
    frustum: Frustum,
    tracked: BTreeSet<EntityId>,
    visible: BTreeSet<EntityId>,
    cull_margin: f32,
}

impl Default for VisibilitySystem {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl VisibilitySystem {
    /// Create a system with an identity view-projection
    pub fn new(cull_margin: f32) -> Self {
        let view_projection = Mat4::identity();
        Self {
            frustum: Frustum::from_view_projection(&view_projection),
            view_projection,
            tracked: BTreeSet::new(),
            visible: BTreeSet::new(),
            cull_margin,
        }
    }

    /// Camera matrix used from the next cull on
    pub fn set_view_projection(&mut self, view_projection: Mat4) {
        self.view_projection = view_projection;
    }

    /// Current camera matrix
    pub fn view_projection(&self) -> &Mat4 {
        &self.view_projection
    }

    /// Frustum computed by the last refresh
    pub fn frustum(&self) -> &Frustum {
        &self.frustum
    }

    /// Recompute the frustum from the stored view-projection
    pub fn refresh_frustum(&mut self) {
        self.frustum = Frustum::from_view_projection(&self.view_projection);
    }

    /// Start tracking `id`; it stays invisible until the next cull
    pub fn register_entity(&mut self, id: EntityId) {
        self.tracked.insert(id);
    }

    /// Stop tracking `id`
    pub fn unregister_entity(&mut self, id: EntityId) {
        self.tracked.remove(&id);
        self.visible.remove(&id);
    }

    /// Whether `id` is tracked
    pub fn is_tracked(&self, id: EntityId) -> bool {
        self.tracked.contains(&id)
    }

    /// Whether `id` passed the last cull
    pub fn is_visible(&self, id: EntityId) -> bool {
        self.visible.contains(&id)
    }

    /// Tracked but not visible
    pub fn is_culled(&self, id: EntityId) -> bool {
        self.is_tracked(id) && !self.is_visible(id)
    }

    /// Visible ids in ascending order
    pub fn visible_entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.visible.iter().copied()
    }

    /// Number of tracked entities
    pub fn tracked_count(&self) -> usize {
        self.tracked.len()
    }

    /// Number of entities that passed the last cull
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Forget all membership
    pub fn clear(&mut self) {
        self.tracked.clear();
        self.visible.clear();
    }

    /// Recompute the visible set and return its size.
    ///
    /// Candidates come from a broad-phase box query around the frustum,
    /// grown by the margin plus the largest tracked bounds radius so that a
    /// sphere reaching into the frustum is never missed. Each candidate is
    /// then tested as a sphere at its transform position with the
    /// renderable's bounds radius. Inactive or transform-less entities are
    /// never visible.
    pub fn cull(&mut self, registry: &Registry, spatial: &dyn SpatialIndex) -> usize {
        self.refresh_frustum();
        self.visible.clear();

        let reach = self.cull_margin + self.max_tracked_radius(registry);
        let candidates: Vec<EntityId> = match Frustum::bounds(&self.view_projection) {
            Some(bounds) => spatial.query_aabb(&bounds.expanded(reach)),
            None => {
                log::debug!("Singular view-projection, testing all tracked entities");
                self.tracked.iter().copied().collect()
            }
        };

        for id in candidates {
            if !self.tracked.contains(&id) {
                continue;
            }
            let Some(entity) = registry.entity(id) else {
                continue;
            };
            if !entity.is_active() {
                continue;
            }
            let Some(transform) = entity.component::<TransformComponent>() else {
                continue;
            };
            let radius = entity
                .component::<RenderableComponent>()
                .map_or(0.0, |r| r.bounds_radius);

            if self
                .frustum
                .contains_sphere(&Sphere::new(transform.position, radius))
            {
                self.visible.insert(id);
            }
        }

        self.visible.len()
    }

    fn max_tracked_radius(&self, registry: &Registry) -> f32 {
        self.tracked
            .iter()
            .filter_map(|&id| registry.component::<RenderableComponent>(id))
            .map(|renderable| renderable.bounds_radius)
            .fold(0.0, f32::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::{Point3, Vec3};
    use crate::spatial::GridHash;

    fn camera() -> Mat4 {
        let view = Mat4::look_at_rh(
            &Point3::new(0.0, 0.0, 10.0),
            &Point3::origin(),
            &Vec3::y(),
        );
        Mat4::new_perspective(1.0, 60f32.to_radians(), 0.1, 100.0) * view
    }

    struct Scene {
        registry: Registry,
        grid: GridHash,
        visibility: VisibilitySystem,
    }

    impl Scene {
        fn new() -> Self {
            let mut visibility = VisibilitySystem::new(5.0);
            visibility.set_view_projection(camera());
            Self {
                registry: Registry::new(),
                grid: GridHash::new(10.0).unwrap(),
                visibility,
            }
        }

        fn spawn(&mut self, position: Vec3, radius: Option<f32>) -> EntityId {
            let id = self.registry.create_entity("thing");
            self.registry
                .add_component(id, TransformComponent::from_position(position));
            if let Some(radius) = radius {
                self.registry.add_component(
                    id,
                    RenderableComponent::new("mesh").with_bounds_radius(radius),
                );
            }
            self.grid.insert(id, position);
            self.visibility.register_entity(id);
            id
        }

        fn cull(&mut self) -> usize {
            self.visibility.cull(&self.registry, &self.grid)
        }
    }

    #[test]
    fn test_registration_alone_does_not_make_visible() {
        let mut scene = Scene::new();
        let id = scene.spawn(Vec3::zeros(), Some(1.0));
        assert!(scene.visibility.is_tracked(id));
        assert!(!scene.visibility.is_visible(id));
        assert!(scene.visibility.is_culled(id));

        assert_eq!(scene.cull(), 1);
        assert!(scene.visibility.is_visible(id));
    }

    #[test]
    fn test_entities_behind_camera_are_culled() {
        let mut scene = Scene::new();
        let front = scene.spawn(Vec3::new(0.0, 0.0, -5.0), Some(1.0));
        let behind = scene.spawn(Vec3::new(0.0, 0.0, 30.0), Some(1.0));

        scene.cull();

        assert_eq!(scene.visibility.visible_entities().collect::<Vec<_>>(), vec![front]);
        assert!(scene.visibility.is_culled(behind));
    }

    #[test]
    fn test_bounds_radius_keeps_edge_entity_visible() {
        let mut scene = Scene::new();
        // Centre just outside the right plane at this depth
        let position = Vec3::new(7.0, 0.0, 0.0);
        let small = scene.spawn(position, Some(0.1));
        let large = scene.spawn(position, Some(3.0));

        scene.cull();

        assert!(!scene.visibility.is_visible(small));
        assert!(scene.visibility.is_visible(large));
    }

    #[test]
    fn test_large_sphere_outside_broad_phase_box_is_visible() {
        let mut scene = Scene::new();
        scene.visibility = VisibilitySystem::new(0.0);
        scene.visibility.set_view_projection(camera());

        // Centre lies beyond the frustum's world box, the sphere still
        // crosses the right plane near the far end
        let position = Vec3::new(80.0, 0.0, -85.0);
        let id = scene.spawn(position, Some(30.0));
        let bounds = Frustum::bounds(&camera()).unwrap();
        assert!(!bounds.contains(&position));

        scene.cull();

        let exact = Frustum::from_view_projection(&camera())
            .contains_sphere(&Sphere::new(position, 30.0));
        assert!(exact);
        assert_eq!(scene.visibility.is_visible(id), exact);
    }

    #[test]
    fn test_missing_renderable_uses_zero_radius() {
        let mut scene = Scene::new();
        let id = scene.spawn(Vec3::zeros(), None);
        scene.cull();
        assert!(scene.visibility.is_visible(id));
    }

    #[test]
    fn test_inactive_and_untracked_are_skipped() {
        let mut scene = Scene::new();
        let inactive = scene.spawn(Vec3::zeros(), Some(1.0));
        scene.registry.set_active(inactive, false);

        let untracked = scene.spawn(Vec3::new(1.0, 0.0, 0.0), Some(1.0));
        scene.visibility.unregister_entity(untracked);

        assert_eq!(scene.cull(), 0);
        assert!(!scene.visibility.is_culled(untracked));
        assert_eq!(scene.visibility.tracked_count(), 1);
    }

    #[test]
    fn test_frustum_follows_new_matrix_on_cull() {
        let mut scene = Scene::new();
        let id = scene.spawn(Vec3::new(0.0, 0.0, -5.0), Some(0.5));
        scene.cull();
        assert!(scene.visibility.is_visible(id));

        // Turn the camera around
        let view = Mat4::look_at_rh(
            &Point3::new(0.0, 0.0, 10.0),
            &Point3::new(0.0, 0.0, 20.0),
            &Vec3::y(),
        );
        scene
            .visibility
            .set_view_projection(Mat4::new_perspective(1.0, 60f32.to_radians(), 0.1, 100.0) * view);
        scene.cull();
        assert!(!scene.visibility.is_visible(id));
    }

    #[test]
    fn test_singular_matrix_falls_back_to_tracked_set() {
        let mut scene = Scene::new();
        scene.spawn(Vec3::zeros(), Some(1.0));
        scene.visibility.set_view_projection(Mat4::zeros());
        // Degenerate planes accept everything
        assert_eq!(scene.cull(), 1);
    }
}
