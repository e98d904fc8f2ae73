//! Dedicated-server style runner
//!
//! Runs the simulation core without a window: a short asteroid-field round
//! with drifting rocks and timed projectiles, then prints frame statistics.
//!
//! Usage: `headless_server [config.toml|config.ron]`

mod subsystems;

use engine_core::foundation::logging;
use engine_core::prelude::*;
use thiserror::Error;

use subsystems::{ArenaRound, DriftPhysics};

/// Application errors
#[derive(Error, Debug)]
enum AppError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error("Failed to load config: {0}")]
    Config(#[from] ConfigError),
}

fn main() -> Result<(), AppError> {
    logging::init();

    let config = load_config(std::env::args().nth(1).as_deref())?;
    log::info!(
        "Starting '{}' at {} fps target",
        config.app_name,
        config.target_fps
    );

    let mut engine = Engine::new();
    engine.set_subsystem(SubsystemSlot::Physics, Box::new(DriftPhysics::default()))?;
    engine.set_subsystem(SubsystemSlot::Gamemode, Box::new(ArenaRound::default()))?;
    engine.initialize(config)?;
    engine.run()?;

    let stats = engine.performance();
    log::info!(
        "Ran {} frames, average {:.1} fps ({:.3} ms/frame)",
        engine.frame_count(),
        stats.average_fps(),
        stats.average_delta_time() * 1000.0
    );
    Ok(())
}

fn load_config(path: Option<&str>) -> Result<EngineConfig, AppError> {
    let mut config = match path {
        Some(path) => {
            log::info!("Loading config from {path}");
            EngineConfig::load_from_file(path)?
        }
        None => EngineConfig::headless(),
    };
    if !config.headless {
        log::warn!("Config requests a window; the server always runs headless");
        config.headless = true;
    }
    Ok(config)
}
