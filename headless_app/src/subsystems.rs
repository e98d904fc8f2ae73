//! Gameplay subsystems for the headless server

use std::cell::Cell;
use std::rc::Rc;

use engine_core::prelude::*;

/// Published when the round timer runs out
pub const ROUND_ENDED: EventType = EventType(1);

const GRAVITY: f32 = -9.81;

/// Integrates rigid bodies and pushes the results through the context
#[derive(Debug, Default)]
pub struct DriftPhysics {
    steps: u64,
}

impl Subsystem for DriftPhysics {
    fn name(&self) -> &str {
        "drift physics"
    }

    fn update(&mut self, delta_time: f32, ctx: &mut EngineContext) {
        for id in ctx
            .registry
            .entities_with::<RigidBodyComponent, TransformComponent>()
        {
            let Some(body) = ctx.registry.component_mut::<RigidBodyComponent>(id) else {
                continue;
            };
            if body.use_gravity {
                let weight = Vec3::new(0.0, GRAVITY * body.mass, 0.0);
                body.apply_force(weight);
            }
            body.velocity += body.acceleration * delta_time;
            body.acceleration = Vec3::zeros();
            let step = body.velocity * delta_time;

            if let Some(position) = ctx
                .registry
                .component::<TransformComponent>(id)
                .map(|t| t.position + step)
            {
                ctx.move_entity(id, position);
            }
        }
        self.steps += 1;
    }

    fn shutdown(&mut self, _ctx: &mut EngineContext) {
        log::info!("Physics ran {} steps", self.steps);
    }
}

#[derive(Debug, Clone, Copy)]
struct Projectile {
    entity: EntityId,
    time_left: f32,
}

/// A timed round: spawns a field of rocks, fires pooled projectiles and
/// stops the engine when the clock runs out
pub struct ArenaRound {
    rock_count: u32,
    round_length: f32,
    fire_interval: f32,
    projectile_lifetime: f32,
    projectiles: ObjectPool<Projectile>,
    since_last_shot: f32,
    despawned: Rc<Cell<u32>>,
    finished: bool,
}

impl Default for ArenaRound {
    fn default() -> Self {
        Self::new(24, 5.0)
    }
}

impl ArenaRound {
    /// Round with `rock_count` rocks lasting `round_length` seconds
    pub fn new(rock_count: u32, round_length: f32) -> Self {
        Self {
            rock_count,
            round_length,
            fire_interval: 0.25,
            projectile_lifetime: 1.0,
            projectiles: ObjectPool::with_capacity(8),
            since_last_shot: 0.0,
            despawned: Rc::new(Cell::new(0)),
            finished: false,
        }
    }

    fn fire(&mut self, ctx: &mut EngineContext) {
        if self.projectiles.is_full() {
            log::debug!("Projectile pool exhausted, holding fire");
            return;
        }
        let entity = ctx.spawn("projectile", TransformComponent::identity());
        let mut body = RigidBodyComponent::with_mass(0.1);
        body.use_gravity = false;
        body.set_velocity(Vec3::new(0.0, 0.0, -40.0));
        ctx.registry.add_component(entity, body);
        ctx.registry.add_component(
            entity,
            RenderableComponent::new("projectile").with_bounds_radius(0.2),
        );

        let projectile = Projectile {
            entity,
            time_left: self.projectile_lifetime,
        };
        if self.projectiles.acquire(projectile).is_none() {
            ctx.despawn(entity);
        }
    }

    fn expire_projectiles(&mut self, delta_time: f32, ctx: &mut EngineContext) {
        let mut expired = Vec::new();
        self.projectiles.retain(|_, projectile| {
            projectile.time_left -= delta_time;
            if projectile.time_left > 0.0 {
                true
            } else {
                expired.push(projectile.entity);
                false
            }
        });
        for entity in expired {
            ctx.despawn(entity);
        }
    }

    /// Projectiles currently alive
    pub fn live_projectiles(&self) -> usize {
        self.projectiles.active_count()
    }
}

impl Subsystem for ArenaRound {
    fn name(&self) -> &str {
        "arena round"
    }

    fn initialize(&mut self, ctx: &mut EngineContext) -> Result<(), SubsystemError> {
        if self.round_length <= 0.0 {
            return Err(SubsystemError::init_failed(
                self.name(),
                format!("round length must be positive, got {}", self.round_length),
            ));
        }

        let view = Mat4::look_at_rh(
            &Point3::new(0.0, 20.0, 60.0),
            &Point3::origin(),
            &Vec3::y(),
        );
        let projection = Mat4::new_perspective(16.0 / 9.0, 60f32.to_radians(), 0.1, 200.0);
        ctx.visibility.set_view_projection(projection * view);

        for i in 0..self.rock_count {
            let angle = i as f32 / self.rock_count as f32 * std::f32::consts::TAU;
            let position = Vec3::new(angle.cos() * 40.0, 0.0, angle.sin() * 40.0);
            let id = ctx.spawn(format!("rock {i}"), TransformComponent::from_position(position));

            let mut body = RigidBodyComponent::with_mass(5.0);
            body.use_gravity = false;
            body.set_velocity(Vec3::new(-angle.sin(), 0.0, angle.cos()) * 3.0);
            ctx.registry.add_component(id, body);
            ctx.registry.add_component(
                id,
                RenderableComponent::new("rock").with_bounds_radius(2.0),
            );
        }

        let despawned = self.despawned.clone();
        ctx.events
            .subscribe(engine_events::ENTITY_DESPAWNED, move |_, _| {
                despawned.set(despawned.get() + 1);
            });
        ctx.events.subscribe(ROUND_ENDED, |event, _| {
            log::info!(
                "Round over after {:.2}s with {} rocks in view",
                event.timestamp,
                event.int("visible").unwrap_or_default()
            );
        });

        log::info!("Arena ready with {} rocks", self.rock_count);
        Ok(())
    }

    fn update(&mut self, delta_time: f32, ctx: &mut EngineContext) {
        if self.finished {
            return;
        }

        self.expire_projectiles(delta_time, ctx);

        self.since_last_shot += delta_time;
        if self.since_last_shot >= self.fire_interval {
            self.since_last_shot = 0.0;
            self.fire(ctx);
        }

        if ctx.elapsed_time() >= self.round_length {
            self.finished = true;
            let visible = i64::try_from(ctx.visibility.visible_count()).unwrap_or(i64::MAX);
            ctx.events.publish(
                &ctx.event(ROUND_ENDED)
                    .with_arg("visible", EventArg::Int(visible)),
            );
            ctx.request_stop();
        }
    }

    fn shutdown(&mut self, _ctx: &mut EngineContext) {
        log::info!(
            "{} projectiles expired, {} still in flight",
            self.despawned.get(),
            self.projectiles.active_count()
        );
        self.projectiles.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> EngineContext {
        EngineContext::new(&EngineConfig::headless()).unwrap()
    }

    #[test]
    fn test_physics_moves_bodies_through_the_index() {
        let mut ctx = context();
        let id = ctx.spawn("rock", TransformComponent::identity());
        let mut body = RigidBodyComponent::default();
        body.use_gravity = false;
        body.set_velocity(Vec3::new(100.0, 0.0, 0.0));
        ctx.registry.add_component(id, body);

        let mut physics = DriftPhysics::default();
        physics.update(1.0, &mut ctx);

        let position = ctx.registry.component::<TransformComponent>(id).unwrap().position;
        assert_eq!(position, Vec3::new(100.0, 0.0, 0.0));
        assert_eq!(ctx.spatial.query_sphere(position, 1.0), vec![id]);
    }

    #[test]
    fn test_gravity_pulls_down() {
        let mut ctx = context();
        let id = ctx.spawn("rock", TransformComponent::identity());
        ctx.registry.add_component(id, RigidBodyComponent::with_mass(2.0));

        DriftPhysics::default().update(0.5, &mut ctx);

        let body = ctx.registry.component::<RigidBodyComponent>(id).unwrap();
        assert!(body.velocity.y < 0.0);
        assert_eq!(body.acceleration, Vec3::zeros());
    }

    #[test]
    fn test_round_spawns_rocks_and_stops_on_time() {
        let mut ctx = context();
        let mut round = ArenaRound::new(6, 1.0);
        round.initialize(&mut ctx).unwrap();
        assert_eq!(ctx.registry.len(), 6);

        round.update(0.1, &mut ctx);
        assert!(!ctx.stop_requested());

        ctx.set_frame_timing(0.1, 1.0);
        round.update(0.1, &mut ctx);
        assert!(ctx.stop_requested());
    }

    #[test]
    fn test_projectiles_are_pooled_and_expire() {
        let mut ctx = context();
        let mut round = ArenaRound::new(0, 100.0);
        round.initialize(&mut ctx).unwrap();

        // Fire every frame, faster than projectiles expire
        for _ in 0..20 {
            round.update(0.25, &mut ctx);
        }
        assert!(round.live_projectiles() <= 8);
        assert_eq!(ctx.registry.len(), round.live_projectiles());

        round.projectile_lifetime = 0.0;
        round.update(10.0, &mut ctx);
        round.update(10.0, &mut ctx);
        assert!(round.despawned.get() > 0);
    }

    #[test]
    fn test_rejects_empty_round() {
        let mut ctx = context();
        assert!(ArenaRound::new(3, 0.0).initialize(&mut ctx).is_err());
    }
}
