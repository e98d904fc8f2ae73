//! Component trait

/// Marker trait for components
///
/// The implementing type is its own storage key, so an entity holds at most
/// one value of each component type.
pub trait Component: 'static + Send + Sync {}

impl Component for super::components::TransformComponent {}
impl Component for super::components::RigidBodyComponent {}
impl Component for super::components::RenderableComponent {}
impl Component for super::components::AudioSourceComponent {}
