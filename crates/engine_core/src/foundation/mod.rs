//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Math types (nalgebra aliases)
//! - Frame timing and stopwatches
//! - Bounded object pooling
//! - Logging utilities

pub mod math;
pub mod pool;
pub mod time;
pub mod logging;
