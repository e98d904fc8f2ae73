//! Frame statistics

use std::collections::VecDeque;

/// Measurements for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// Clamped frame delta in seconds
    pub delta_time: f32,
    /// Seconds spent in subsystem updates and culling
    pub update_time: f32,
    /// Seconds spent in the render phase
    pub render_time: f32,
    /// Live entities at the end of the frame
    pub entity_count: usize,
    /// Meshes submitted to the renderer
    pub rendered_entities: usize,
}

/// Rolling window of recent [`FrameStats`]
#[derive(Debug, Clone)]
pub struct PerformanceMonitor {
    history: VecDeque<FrameStats>,
    max_history: usize,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(Self::DEFAULT_HISTORY)
    }
}

impl PerformanceMonitor {
    /// Frames kept by [`PerformanceMonitor::default`]
    pub const DEFAULT_HISTORY: usize = 300;

    /// Keep at most `max_history` frames
    pub fn new(max_history: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(max_history),
            max_history: max_history.max(1),
        }
    }

    /// Append a frame, evicting the oldest beyond the window
    pub fn record_frame(&mut self, stats: FrameStats) {
        if self.history.len() == self.max_history {
            self.history.pop_front();
        }
        self.history.push_back(stats);
    }

    /// Recorded frames, oldest first
    pub fn history(&self) -> &VecDeque<FrameStats> {
        &self.history
    }

    /// Most recent frame
    pub fn last_frame(&self) -> Option<&FrameStats> {
        self.history.back()
    }

    /// Mean delta time over the window; 0 when empty
    pub fn average_delta_time(&self) -> f32 {
        self.average(|s| s.delta_time)
    }

    /// Mean render time over the window; 0 when empty
    pub fn average_render_time(&self) -> f32 {
        self.average(|s| s.render_time)
    }

    /// Frames per second implied by the mean delta; 0 when unknown
    pub fn average_fps(&self) -> f32 {
        let delta = self.average_delta_time();
        if delta > 0.0 {
            1.0 / delta
        } else {
            0.0
        }
    }

    /// Forget all samples
    pub fn clear(&mut self) {
        self.history.clear();
    }

    fn average(&self, field: impl Fn(&FrameStats) -> f32) -> f32 {
        if self.history.is_empty() {
            return 0.0;
        }
        self.history.iter().map(field).sum::<f32>() / self.history.len() as f32
    }
}
