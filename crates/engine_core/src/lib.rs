//! # Engine Core
//!
//! The simulation core shared by every way of running the game: windowed
//! play, dedicated headless servers and tooling previews.
//!
//! ## Features
//!
//! - **Entity Registry**: Entities with type-keyed components
//! - **Event Bus**: Synchronous publish/subscribe between subsystems
//! - **Spatial Hashing**: Grid-hash broad phase for proximity queries
//! - **Visibility Culling**: Frustum tests over the spatial index
//! - **Frame Scheduler**: Ordered subsystem updates with clamped time steps
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use engine_core::prelude::*;
//!
//! struct Spinner;
//!
//! impl Subsystem for Spinner {
//!     fn name(&self) -> &str {
//!         "spinner"
//!     }
//!
//!     fn update(&mut self, delta_time: f32, ctx: &mut EngineContext) {
//!         for id in ctx.registry.entity_ids() {
//!             if let Some(transform) = ctx.registry.component_mut::<TransformComponent>(id) {
//!                 transform.rotation *= Quat::from_euler_angles(0.0, delta_time, 0.0);
//!             }
//!         }
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut engine = Engine::new();
//!     engine.set_subsystem(SubsystemSlot::Gamemode, Box::new(Spinner))?;
//!     engine.initialize(EngineConfig::headless())?;
//!     engine
//!         .context_mut()
//!         .spawn("top", TransformComponent::identity());
//!     engine.run()?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod ecs;
pub mod engine;
pub mod events;
pub mod foundation;
pub mod performance;
pub mod platform;
pub mod spatial;
pub mod subsystem;
pub mod visibility;

pub use config::{Config, ConfigError, EngineConfig};
pub use engine::{Engine, EngineContext, EngineError, EngineState};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, EngineConfig},
        ecs::{
            AudioSourceComponent, Component, Entity, EntityId, Registry, RenderableComponent,
            RigidBodyComponent, TransformComponent,
        },
        engine::{Engine, EngineContext, EngineError, EngineState},
        events::{engine_events, Event, EventArg, EventBus, EventType},
        foundation::{
            math::{Mat4, Point3, Quat, Vec3, Vec4},
            pool::{ObjectPool, PoolKey},
            time::{FrameClock, Stopwatch, MAX_FRAME_DELTA},
        },
        performance::{FrameStats, PerformanceMonitor},
        platform::{PlatformError, Renderer, Window},
        spatial::{Aabb, Frustum, GridHash, Plane, SpatialIndex, Sphere},
        subsystem::{IdleSubsystem, Subsystem, SubsystemError, SubsystemSlot},
        visibility::VisibilitySystem,
    };
}
