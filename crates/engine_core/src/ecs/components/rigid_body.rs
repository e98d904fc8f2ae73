//! Rigid body component

use crate::foundation::math::Vec3;

/// Simple rigid body state consumed by a physics subsystem
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBodyComponent {
    /// Linear velocity in units per second
    pub velocity: Vec3,
    /// Accumulated acceleration for the current step
    pub acceleration: Vec3,
    /// Mass; non-positive mass ignores forces
    pub mass: f32,
    /// Whether gravity applies
    pub use_gravity: bool,
    /// Kinematic bodies are driven directly and ignore forces
    pub is_kinematic: bool,
}

impl Default for RigidBodyComponent {
    fn default() -> Self {
        Self {
            velocity: Vec3::zeros(),
            acceleration: Vec3::zeros(),
            mass: 1.0,
            use_gravity: true,
            is_kinematic: false,
        }
    }
}

impl RigidBodyComponent {
    /// Create a body with the given mass
    pub fn with_mass(mass: f32) -> Self {
        Self {
            mass,
            ..Self::default()
        }
    }

    /// Accumulate `force / mass` into acceleration
    pub fn apply_force(&mut self, force: Vec3) {
        if self.mass > 0.0 && !self.is_kinematic {
            self.acceleration += force / self.mass;
        }
    }

    /// Overwrite the velocity
    pub fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }
}
