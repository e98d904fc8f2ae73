//! Renderable component

/// Something the renderer can draw
///
/// `mesh` and `material` are opaque names resolved by the renderer backend.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderableComponent {
    /// Mesh asset name
    pub mesh: String,
    /// Material asset name
    pub material: String,
    /// Hidden renderables are never submitted
    pub visible: bool,
    /// Draw ordering bucket
    pub render_layer: i32,
    /// Radius of the bounding sphere around the transform position
    pub bounds_radius: f32,
}

impl Default for RenderableComponent {
    fn default() -> Self {
        Self {
            mesh: String::new(),
            material: String::new(),
            visible: true,
            render_layer: 0,
            bounds_radius: 1.0,
        }
    }
}

impl RenderableComponent {
    /// Visible renderable for `mesh` with the default material
    pub fn new(mesh: impl Into<String>) -> Self {
        Self {
            mesh: mesh.into(),
            ..Self::default()
        }
    }

    /// Builder pattern: Set material
    #[must_use]
    pub fn with_material(mut self, material: impl Into<String>) -> Self {
        self.material = material.into();
        self
    }

    /// Builder pattern: Set bounding radius
    #[must_use]
    pub fn with_bounds_radius(mut self, radius: f32) -> Self {
        self.bounds_radius = radius;
        self
    }

    /// Builder pattern: Set render layer
    #[must_use]
    pub fn with_layer(mut self, layer: i32) -> Self {
        self.render_layer = layer;
        self
    }
}
