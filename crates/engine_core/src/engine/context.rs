//! Shared state handed to every subsystem

use std::collections::HashMap;

use crate::config::EngineConfig;
use crate::ecs::{EntityId, Registry, TransformComponent};
use crate::events::{engine_events, Event, EventArg, EventBus, EventType};
use crate::foundation::math::Vec3;
use crate::spatial::{GridHash, SpatialError, SpatialIndex};
use crate::visibility::VisibilitySystem;

/// Everything a subsystem may touch during a frame
///
/// Spawning, moving and despawning through the helpers here keeps the
/// registry, spatial index and visibility set consistent; direct registry
/// edits bypass that bookkeeping.
#[derive(Debug)]
pub struct EngineContext {
    /// Entities and components
    pub registry: Registry,
    /// Cross-subsystem notifications
    pub events: EventBus,
    /// Broad-phase index over entity positions
    pub spatial: GridHash,
    /// Frustum culling state
    pub visibility: VisibilitySystem,
    /// Position each entity was last indexed at
    indexed: HashMap<EntityId, Vec3>,
    config: EngineConfig,
    delta_time: f32,
    elapsed_time: f32,
    stop_requested: bool,
}

impl EngineContext {
    /// Build an empty context for `config`
    pub fn new(config: &EngineConfig) -> Result<Self, SpatialError> {
        Ok(Self {
            registry: Registry::new(),
            events: EventBus::new(),
            spatial: GridHash::new(config.spatial_cell_size)?,
            visibility: VisibilitySystem::new(config.cull_margin),
            indexed: HashMap::new(),
            config: config.clone(),
            delta_time: 0.0,
            elapsed_time: 0.0,
            stop_requested: false,
        })
    }

    /// Configuration the engine was initialized with
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Clamped delta of the current frame
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Accumulated clamped time since startup
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    /// Record the current frame's timing; the engine calls this every frame
    pub fn set_frame_timing(&mut self, delta_time: f32, elapsed_time: f32) {
        self.delta_time = delta_time;
        self.elapsed_time = elapsed_time;
    }

    /// Ask the frame loop to stop after the current frame
    pub fn request_stop(&mut self) {
        if !self.stop_requested {
            log::info!("Engine stop requested");
        }
        self.stop_requested = true;
    }

    /// Whether a stop has been requested
    pub fn stop_requested(&self) -> bool {
        self.stop_requested
    }

    /// Event stamped with the current engine time
    pub fn event(&self, event_type: EventType) -> Event {
        Event::new(event_type).at(self.elapsed_time)
    }

    /// Create an entity with `transform`, index it and announce it
    pub fn spawn(&mut self, name: impl Into<String>, transform: TransformComponent) -> EntityId {
        let position = transform.position;
        let id = self.registry.create_entity(name);
        self.registry.add_component(id, transform);
        self.spatial.insert(id, position);
        self.indexed.insert(id, position);
        self.visibility.register_entity(id);

        log::debug!("Spawned entity {id} at {:?}", position);
        self.events.publish(
            &self
                .event(engine_events::ENTITY_SPAWNED)
                .with_arg(engine_events::ARG_ENTITY, EventArg::Entity(id))
                .with_arg(engine_events::ARG_POSITION, EventArg::Position(position)),
        );
        id
    }

    /// Move an entity and keep the spatial index in step.
    ///
    /// The index is keyed by the position recorded at the last spawn or
    /// move, so transforms edited directly through the registry are
    /// reconciled here. Returns false if the entity is gone or has no
    /// transform.
    pub fn move_entity(&mut self, id: EntityId, position: Vec3) -> bool {
        let Some(transform) = self.registry.component_mut::<TransformComponent>(id) else {
            return false;
        };
        let current = std::mem::replace(&mut transform.position, position);
        match self.indexed.insert(id, position) {
            Some(old) => self.spatial.update(id, old, position),
            None => {
                // Never indexed through this context
                log::debug!("Indexing entity {id} first seen at {:?}", current);
                self.spatial.insert(id, position);
            }
        }
        true
    }

    /// Remove an entity from the registry, spatial index and visibility set
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if let Some(position) = self.indexed.remove(&id) {
            self.spatial.remove(id, position);
        }
        self.visibility.unregister_entity(id);
        if !self.registry.destroy_entity(id) {
            return false;
        }

        log::debug!("Despawned entity {id}");
        self.events.publish(
            &self
                .event(engine_events::ENTITY_DESPAWNED)
                .with_arg(engine_events::ARG_ENTITY, EventArg::Entity(id)),
        );
        true
    }

    /// Recompute the visible set; returns the number of visible entities
    pub fn cull(&mut self) -> usize {
        self.visibility.cull(&self.registry, &self.spatial)
    }

    /// Drop all entities, subscriptions and spatial entries
    pub fn clear(&mut self) {
        self.registry.clear();
        self.events.clear();
        self.spatial.clear();
        self.indexed.clear();
        self.visibility.clear();
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            registry: Registry::new(),
            events: EventBus::new(),
            spatial: GridHash::default(),
            visibility: VisibilitySystem::new(config.cull_margin),
            indexed: HashMap::new(),
            config,
            delta_time: 0.0,
            elapsed_time: 0.0,
            stop_requested: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_spawn_indexes_and_announces() {
        let mut ctx = EngineContext::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        ctx.events.subscribe(engine_events::ENTITY_SPAWNED, move |event, _| {
            sink.borrow_mut().push((
                event.entity(engine_events::ARG_ENTITY),
                event.position(engine_events::ARG_POSITION),
            ));
        });

        let position = Vec3::new(3.0, 0.0, 4.0);
        let id = ctx.spawn("crate", TransformComponent::from_position(position));

        assert_eq!(*seen.borrow(), vec![(Some(id), Some(position))]);
        assert_eq!(ctx.spatial.query_sphere(position, 1.0), vec![id]);
        assert!(ctx.visibility.is_tracked(id));
    }

    #[test]
    fn test_move_entity_updates_index() {
        let mut ctx = EngineContext::default();
        let id = ctx.spawn("probe", TransformComponent::identity());
        let target = Vec3::new(500.0, 0.0, 0.0);

        assert!(ctx.move_entity(id, target));

        assert_eq!(
            ctx.registry.component::<TransformComponent>(id).unwrap().position,
            target
        );
        assert!(ctx.spatial.query_sphere(Vec3::zeros(), 1.0).is_empty());
        assert_eq!(ctx.spatial.query_sphere(target, 1.0), vec![id]);
        assert!(!ctx.move_entity(EntityId::new(99), target));
    }

    #[test]
    fn test_despawn_removes_everywhere() {
        let mut ctx = EngineContext::default();
        let despawned = Rc::new(RefCell::new(Vec::new()));
        let sink = despawned.clone();
        ctx.events.subscribe(engine_events::ENTITY_DESPAWNED, move |event, _| {
            sink.borrow_mut().push(event.entity(engine_events::ARG_ENTITY));
        });

        let id = ctx.spawn("mine", TransformComponent::identity());
        assert!(ctx.despawn(id));
        assert!(!ctx.despawn(id));

        assert!(ctx.registry.is_empty());
        assert!(ctx.spatial.is_empty());
        assert!(!ctx.visibility.is_tracked(id));
        assert_eq!(*despawned.borrow(), vec![Some(id)]);
    }

    #[test]
    fn test_despawn_after_direct_transform_edit_leaves_no_entry() {
        let mut ctx = EngineContext::default();
        let id = ctx.spawn("drifter", TransformComponent::identity());
        ctx.registry
            .component_mut::<TransformComponent>(id)
            .unwrap()
            .position = Vec3::new(400.0, 0.0, 0.0);

        assert!(ctx.despawn(id));

        assert!(ctx.spatial.is_empty());
        assert!(ctx.spatial.query_sphere(Vec3::zeros(), 1.0).is_empty());
    }

    #[test]
    fn test_move_after_direct_transform_edit_uses_indexed_cell() {
        let mut ctx = EngineContext::default();
        let id = ctx.spawn("drifter", TransformComponent::identity());
        ctx.registry
            .component_mut::<TransformComponent>(id)
            .unwrap()
            .position = Vec3::new(400.0, 0.0, 0.0);

        let target = Vec3::new(-300.0, 0.0, 0.0);
        assert!(ctx.move_entity(id, target));

        assert_eq!(ctx.spatial.len(), 1);
        assert!(ctx.spatial.query_sphere(Vec3::zeros(), 1.0).is_empty());
        assert_eq!(ctx.spatial.query_sphere(target, 1.0), vec![id]);
    }

    #[test]
    fn test_move_indexes_entity_created_outside_spawn() {
        let mut ctx = EngineContext::default();
        let id = ctx.registry.create_entity("loose");
        ctx.registry.add_component(id, TransformComponent::identity());

        let target = Vec3::new(10.0, 0.0, 0.0);
        assert!(ctx.move_entity(id, target));
        assert_eq!(ctx.spatial.query_sphere(target, 1.0), vec![id]);
    }

    #[test]
    fn test_rejects_bad_cell_size() {
        let config = EngineConfig {
            spatial_cell_size: 0.0,
            ..EngineConfig::default()
        };
        assert!(EngineContext::new(&config).is_err());
    }

    #[test]
    fn test_stop_request_latches() {
        let mut ctx = EngineContext::default();
        assert!(!ctx.stop_requested());
        ctx.request_stop();
        ctx.request_stop();
        assert!(ctx.stop_requested());
    }
}
