//! Window and renderer contracts
//!
//! The core never talks to a windowing library or graphics API directly;
//! the application supplies implementations of these traits when running
//! windowed.

use crate::ecs::RenderableComponent;
use crate::foundation::math::Mat4;
use crate::subsystem::Subsystem;

/// Platform errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The OS window could not be created
    #[error("Window creation failed: {0}")]
    WindowCreation(String),

    /// A required provider was not supplied
    #[error("No {0} provided")]
    MissingProvider(&'static str),
}

/// OS window
pub trait Window {
    /// Open the window
    fn create(&mut self, title: &str, width: u32, height: u32) -> Result<(), PlatformError>;

    /// False once the user or the application closed the window
    fn is_open(&self) -> bool;

    /// Pump pending OS events
    fn update(&mut self);

    /// Close the window
    fn close(&mut self);

    /// Enable or disable vertical sync
    fn set_vsync(&mut self, enabled: bool);
}

/// Frame renderer
///
/// Its [`Subsystem::update`] runs after every other subsystem.
pub trait Renderer: Subsystem {
    /// Start recording a frame
    fn begin_frame(&mut self);

    /// Queue one mesh draw with its model matrix
    fn submit_mesh(&mut self, renderable: &RenderableComponent, model: &Mat4);

    /// Finish recording
    fn end_frame(&mut self);

    /// Show the finished frame
    fn present(&mut self);
}
