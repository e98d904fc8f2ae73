//! Core engine implementation
//!
//! [`Engine`] owns the [`EngineContext`], the subsystems and the optional
//! window/renderer pair, and drives them through a fixed lifecycle:
//!
//! ```text
//! Uninitialized -> Initializing -> Running -> ShuttingDown -> Shutdown
//! ```

mod context;


pub use context::EngineContext;

use std::fmt;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use crate::config::{Config, ConfigError, EngineConfig};
use crate::ecs::{RenderableComponent, TransformComponent};
use crate::events::engine_events;
use crate::foundation::time::{FrameClock, Stopwatch};
use crate::performance::{FrameStats, PerformanceMonitor};
use crate::platform::{PlatformError, Renderer, Window};
use crate::subsystem::{IdleSubsystem, Subsystem, SubsystemSlot};

/// Engine lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed; providers may still be swapped
    Uninitialized,
    /// Inside [`Engine::initialize`]
    Initializing,
    /// Frames may run
    Running,
    /// Inside [`Engine::shutdown`]
    ShuttingDown,
    /// Torn down; terminal
    Shutdown,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Initializing => "initializing",
            Self::Running => "running",
            Self::ShuttingDown => "shutting down",
            Self::Shutdown => "shut down",
        };
        f.write_str(name)
    }
}

/// Engine errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Startup failed
    #[error("Engine initialization failed: {0}")]
    InitializationFailed(String),

    /// Operation not allowed in the current state
    #[error("Invalid engine state: expected {expected}, found {actual}")]
    InvalidState {
        /// State the operation requires
        expected: EngineState,
        /// State the engine was in
        actual: EngineState,
    },

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Main engine struct
///
/// Subsystems are updated in [`SubsystemSlot::INIT_ORDER`], followed by the
/// renderer when running windowed, and shut down in the exact reverse of the
/// order they initialized in.
pub struct Engine {
    state: EngineState,
    config: EngineConfig,
    context: EngineContext,
    clock: FrameClock,
    performance: PerformanceMonitor,
    window: Option<Box<dyn Window>>,
    renderer: Option<Box<dyn Renderer>>,
    renderer_initialized: bool,
    subsystems: Vec<Box<dyn Subsystem>>,
    /// Slots whose initialize succeeded, in initialization order
    active: Vec<SubsystemSlot>,
}

impl Engine {
    /// Create an engine with idle subsystems and no window or renderer
    pub fn new() -> Self {
        Self {
            state: EngineState::Uninitialized,
            config: EngineConfig::default(),
            context: EngineContext::default(),
            clock: FrameClock::new(),
            performance: PerformanceMonitor::default(),
            window: None,
            renderer: None,
            renderer_initialized: false,
            subsystems: SubsystemSlot::INIT_ORDER
                .iter()
                .map(|&slot| Box::new(IdleSubsystem::for_slot(slot)) as Box<dyn Subsystem>)
                .collect(),
            active: Vec::new(),
        }
    }

    /// Provide the window used in windowed mode
    pub fn set_window(&mut self, window: Box<dyn Window>) -> Result<(), EngineError> {
        self.expect_state(EngineState::Uninitialized)?;
        self.window = Some(window);
        Ok(())
    }

    /// Provide the renderer used in windowed mode
    pub fn set_renderer(&mut self, renderer: Box<dyn Renderer>) -> Result<(), EngineError> {
        self.expect_state(EngineState::Uninitialized)?;
        self.renderer = Some(renderer);
        Ok(())
    }

    /// Install `subsystem` in `slot`, replacing the idle default
    pub fn set_subsystem(
        &mut self,
        slot: SubsystemSlot,
        subsystem: Box<dyn Subsystem>,
    ) -> Result<(), EngineError> {
        self.expect_state(EngineState::Uninitialized)?;
        self.subsystems[slot.index()] = subsystem;
        Ok(())
    }

    /// Load an [`EngineConfig`] from a TOML or RON file and initialize with it
    pub fn initialize_from_file(&mut self, path: impl AsRef<Path>) -> Result<(), EngineError> {
        let config = EngineConfig::load_from_file(path)?;
        self.initialize(config)
    }

    /// Bring up the window, renderer and subsystems.
    ///
    /// The context is rebuilt from `config`, so anything spawned into it
    /// beforehand is discarded.
    ///
    /// Scripting may fail without aborting startup. Any other failure is
    /// returned as [`EngineError::InitializationFailed`] and leaves the engine
    /// `Uninitialized`; subsystems that had already started are not shut
    /// down again.
    pub fn initialize(&mut self, config: EngineConfig) -> Result<(), EngineError> {
        self.expect_state(EngineState::Uninitialized)?;
        self.state = EngineState::Initializing;
        log::info!("Initializing engine '{}'...", config.app_name);

        if let Err(e) = self.start(config) {
            log::warn!(
                "Startup aborted after {} subsystem(s) initialized; they are not rolled back",
                self.active.len()
            );
            self.active.clear();
            self.renderer_initialized = false;
            self.state = EngineState::Uninitialized;
            return Err(e);
        }

        self.clock.reset();
        self.state = EngineState::Running;
        self.context
            .events
            .publish(&self.context.event(engine_events::ENGINE_STARTED));
        log::info!(
            "Engine running ({} mode, {} subsystem(s))",
            if self.config.headless { "headless" } else { "windowed" },
            self.active.len()
        );
        Ok(())
    }

    fn start(&mut self, config: EngineConfig) -> Result<(), EngineError> {
        let config = config.validated();
        self.context = EngineContext::new(&config)
            .map_err(|e| EngineError::InitializationFailed(format!("Spatial index: {e}")))?;
        self.config = config;
        self.active.clear();

        if !self.config.headless {
            let window = self
                .window
                .as_mut()
                .ok_or(PlatformError::MissingProvider("window"))
                .map_err(|e| EngineError::InitializationFailed(format!("Window: {e}")))?;
            window
                .create(
                    &self.config.app_name,
                    self.config.window_width,
                    self.config.window_height,
                )
                .map_err(|e| EngineError::InitializationFailed(format!("Window: {e}")))?;
            window.set_vsync(self.config.vsync);

            let renderer = self
                .renderer
                .as_mut()
                .ok_or(PlatformError::MissingProvider("renderer"))
                .map_err(|e| EngineError::InitializationFailed(format!("Renderer: {e}")))?;
            renderer
                .initialize(&mut self.context)
                .map_err(|e| EngineError::InitializationFailed(format!("Renderer: {e}")))?;
            self.renderer_initialized = true;
        }

        for slot in SubsystemSlot::INIT_ORDER {
            let subsystem = &mut self.subsystems[slot.index()];
            match subsystem.initialize(&mut self.context) {
                Ok(()) => {
                    log::debug!("Initialized {} ({slot})", subsystem.name());
                    self.active.push(slot);
                }
                Err(e) if slot.is_soft_dependency() => {
                    log::warn!("{e}; continuing without {slot}");
                }
                Err(e) => {
                    return Err(EngineError::InitializationFailed(format!("{slot}: {e}")));
                }
            }
        }
        Ok(())
    }

    /// Run frames until stopped or the window closes, then shut down
    pub fn run(&mut self) -> Result<(), EngineError> {
        self.expect_state(EngineState::Running)?;
        log::info!("Starting main loop...");

        while self.should_continue() {
            self.run_frame()?;
        }

        self.shutdown();
        Ok(())
    }

    fn should_continue(&self) -> bool {
        if self.context.stop_requested() {
            return false;
        }
        self.config.headless || self.window.as_ref().map_or(false, |w| w.is_open())
    }

    /// Advance exactly one frame and return its clamped delta time
    pub fn run_frame(&mut self) -> Result<f32, EngineError> {
        self.expect_state(EngineState::Running)?;
        let frame_timer = Stopwatch::start_new();

        let delta_time = self.clock.tick();
        self.context
            .set_frame_timing(delta_time, self.clock.elapsed_time());

        if !self.config.headless {
            if let Some(window) = self.window.as_mut() {
                window.update();
            }
        }

        self.update_systems(delta_time);
        self.context.cull();
        let update_time = frame_timer.elapsed_secs();

        let rendered_entities = if self.config.headless {
            0
        } else {
            self.render_frame()
        };
        let work_time = frame_timer.elapsed();

        self.performance.record_frame(FrameStats {
            delta_time,
            update_time,
            render_time: work_time.as_secs_f32() - update_time,
            entity_count: self.context.registry.len(),
            rendered_entities,
        });

        self.limit_frame_rate(work_time);
        Ok(delta_time)
    }

    fn update_systems(&mut self, delta_time: f32) {
        for &slot in &self.active {
            self.subsystems[slot.index()].update(delta_time, &mut self.context);
        }
        if self.renderer_initialized {
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.update(delta_time, &mut self.context);
            }
        }
    }

    fn render_frame(&mut self) -> usize {
        let Some(renderer) = self.renderer.as_mut() else {
            return 0;
        };
        let ctx = &self.context;

        renderer.begin_frame();
        let mut submitted = 0;
        for id in ctx
            .registry
            .entities_with::<TransformComponent, RenderableComponent>()
        {
            let Some(entity) = ctx.registry.entity(id) else {
                continue;
            };
            if !entity.is_active() || ctx.visibility.is_culled(id) {
                continue;
            }
            if let (Some(transform), Some(renderable)) = (
                entity.component::<TransformComponent>(),
                entity.component::<RenderableComponent>(),
            ) {
                if renderable.visible {
                    renderer.submit_mesh(renderable, &transform.to_matrix());
                    submitted += 1;
                }
            }
        }
        renderer.end_frame();
        renderer.present();
        submitted
    }

    fn limit_frame_rate(&self, work_time: Duration) {
        if let Some(target) = self.config.target_frame_time() {
            let target = Duration::from_secs_f32(target);
            if work_time < target {
                std::thread::sleep(target - work_time);
            }
        }
    }

    /// Ask the frame loop to stop at the next iteration boundary
    pub fn stop(&mut self) {
        self.context.request_stop();
    }

    /// Tear everything down in reverse initialization order.
    ///
    /// Does nothing unless the engine is running, so repeated calls are safe.
    pub fn shutdown(&mut self) {
        if self.state != EngineState::Running {
            log::debug!("Shutdown ignored while {}", self.state);
            return;
        }
        self.state = EngineState::ShuttingDown;
        log::info!("Shutting down engine...");

        self.context
            .events
            .publish(&self.context.event(engine_events::ENGINE_STOPPING));

        for slot in self.active.drain(..).rev() {
            let subsystem = &mut self.subsystems[slot.index()];
            log::debug!("Shutting down {} ({slot})", subsystem.name());
            subsystem.shutdown(&mut self.context);
        }
        if self.renderer_initialized {
            if let Some(renderer) = self.renderer.as_mut() {
                renderer.shutdown(&mut self.context);
            }
            self.renderer_initialized = false;
        }
        if let Some(window) = self.window.as_mut() {
            window.close();
        }

        self.context.clear();
        self.state = EngineState::Shutdown;
        log::info!("Engine shutdown complete");
    }

    fn expect_state(&self, expected: EngineState) -> Result<(), EngineError> {
        if self.state == expected {
            Ok(())
        } else {
            Err(EngineError::InvalidState {
                expected,
                actual: self.state,
            })
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// Clamped delta of the last frame
    pub fn delta_time(&self) -> f32 {
        self.clock.delta_time()
    }

    /// Accumulated clamped time
    pub fn elapsed_time(&self) -> f32 {
        self.clock.elapsed_time()
    }

    /// Frames run since initialization
    pub fn frame_count(&self) -> u64 {
        self.clock.frame_count()
    }

    /// Active configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Shared simulation state
    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    /// Mutable shared simulation state
    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.context
    }

    /// Frame statistics
    pub fn performance(&self) -> &PerformanceMonitor {
        &self.performance
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.state == EngineState::Running {
            self.shutdown();
        }
    }
}
