//! Engine startup configuration

use serde::{Deserialize, Serialize};

use super::Config;

/// Engine startup configuration
///
/// Missing fields fall back to [`EngineConfig::default`] when loading from
/// disk, so a config file only needs to name what it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Application name, used as the window title
    pub app_name: String,
    /// Window width in pixels
    pub window_width: u32,
    /// Window height in pixels
    pub window_height: u32,
    /// Frame-rate cap; 0 disables limiting
    pub target_fps: u32,
    /// Request vertical sync from the window
    pub vsync: bool,
    /// Run without window and render phase
    pub headless: bool,
    /// Edge length of one spatial index cell in world units
    pub spatial_cell_size: f32,
    /// World units added around the frustum bounds for the culling broad phase
    pub cull_margin: f32,
}

impl EngineConfig {
    /// Default window width
    pub const DEFAULT_WIDTH: u32 = 1280;
    /// Default window height
    pub const DEFAULT_HEIGHT: u32 = 720;
    /// Default spatial cell size
    pub const DEFAULT_CELL_SIZE: f32 = 50.0;

    /// Headless preset used by servers and tests
    pub fn headless() -> Self {
        Self {
            headless: true,
            ..Self::default()
        }
    }

    /// Return a copy with out-of-range values replaced by usable ones.
    ///
    /// Every substitution is logged as a warning.
    #[must_use]
    pub fn validated(mut self) -> Self {
        if self.window_width == 0 {
            log::warn!(
                "window_width is 0, using default {}",
                Self::DEFAULT_WIDTH
            );
            self.window_width = Self::DEFAULT_WIDTH;
        }
        if self.window_height == 0 {
            log::warn!(
                "window_height is 0, using default {}",
                Self::DEFAULT_HEIGHT
            );
            self.window_height = Self::DEFAULT_HEIGHT;
        }
        if !(self.spatial_cell_size.is_finite() && self.spatial_cell_size > 0.0) {
            log::warn!(
                "spatial_cell_size {} is not positive, using default {}",
                self.spatial_cell_size,
                Self::DEFAULT_CELL_SIZE
            );
            self.spatial_cell_size = Self::DEFAULT_CELL_SIZE;
        }
        if !(self.cull_margin.is_finite() && self.cull_margin >= 0.0) {
            log::warn!("cull_margin {} is invalid, using 0", self.cull_margin);
            self.cull_margin = 0.0;
        }
        self
    }

    /// Seconds per frame at the target rate, if limiting is enabled
    pub fn target_frame_time(&self) -> Option<f32> {
        if self.target_fps == 0 {
            None
        } else {
            Some(1.0 / self.target_fps as f32)
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            app_name: "Simulation Core".to_string(),
            window_width: Self::DEFAULT_WIDTH,
            window_height: Self::DEFAULT_HEIGHT,
            target_fps: 60,
            vsync: true,
            headless: false,
            spatial_cell_size: Self::DEFAULT_CELL_SIZE,
            cull_margin: 10.0,
        }
    }
}

impl Config for EngineConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("engine_core_{}_{}", std::process::id(), name))
    }

    #[test]
    fn test_toml_round_trip() {
        let path = temp_path("round_trip.toml");
        let config = EngineConfig {
            app_name: "Arena".to_string(),
            target_fps: 30,
            headless: true,
            ..EngineConfig::default()
        };

        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_ron_round_trip() {
        let path = temp_path("round_trip.ron");
        let config = EngineConfig {
            spatial_cell_size: 25.0,
            vsync: false,
            ..EngineConfig::default()
        };

        config.save_to_file(&path).unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let path = temp_path("partial.toml");
        std::fs::write(&path, "target_fps = 0\nheadless = true\n").unwrap();
        let loaded = EngineConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.target_fps, 0);
        assert!(loaded.headless);
        assert_eq!(loaded.window_width, EngineConfig::DEFAULT_WIDTH);
        assert_eq!(loaded.target_frame_time(), None);
    }

    #[test]
    fn test_unsupported_extension() {
        let result = EngineConfig::load_from_file("engine.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = EngineConfig::load_from_file(temp_path("missing.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_validated_clamps_bad_values() {
        let config = EngineConfig {
            window_width: 0,
            window_height: 0,
            spatial_cell_size: -4.0,
            cull_margin: f32::NAN,
            ..EngineConfig::default()
        }
        .validated();

        assert_eq!(config.window_width, EngineConfig::DEFAULT_WIDTH);
        assert_eq!(config.window_height, EngineConfig::DEFAULT_HEIGHT);
        assert_eq!(config.spatial_cell_size, EngineConfig::DEFAULT_CELL_SIZE);
        assert_eq!(config.cull_margin, 0.0);
    }
}
