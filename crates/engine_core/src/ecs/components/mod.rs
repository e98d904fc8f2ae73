//! Built-in components
//!
//! Plain data with a few convenience methods. Behaviour that spans entities
//! lives in subsystems.

mod audio_source;
mod renderable;
mod rigid_body;
mod transform;

pub use audio_source::AudioSourceComponent;
pub use renderable::RenderableComponent;
pub use rigid_body::RigidBodyComponent;
pub use transform::TransformComponent;
