//! Entity-Component registry
//!
//! Entities are owned by the [`Registry`]; everything else refers to them by
//! [`EntityId`] and must tolerate the id no longer resolving.

pub mod component;
pub mod components;
pub mod entity;
pub mod registry;


pub use component::Component;
pub use components::{
    AudioSourceComponent, RenderableComponent, RigidBodyComponent, TransformComponent,
};
pub use entity::{Entity, EntityId};
pub use registry::Registry;
