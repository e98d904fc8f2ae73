//! Time management utilities

use std::time::{Duration, Instant};

/// Upper bound for a single simulation step, in seconds (~30 FPS worth).
///
/// A stalled frame (debugger break, window drag, disk hitch) must not inject
/// an oversized step into physics and other dependent subsystems.
pub const MAX_FRAME_DELTA: f32 = 0.033;

/// Frame clock producing clamped delta times.
///
/// The raw wall-clock interval between ticks is clamped to `max_delta`;
/// elapsed time accumulates the *clamped* value, while the reference point
/// for the next tick is always the raw "now".
#[derive(Debug, Clone)]
pub struct FrameClock {
    last_frame: Instant,
    delta_time: f32,
    raw_delta_time: f32,
    elapsed_time: f32,
    frame_count: u64,
    max_delta: f32,
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock {
    /// Create a new clock starting now, clamped to [`MAX_FRAME_DELTA`]
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    /// Create a clock whose first tick measures from `start`
    pub fn starting_at(start: Instant) -> Self {
        Self {
            last_frame: start,
            delta_time: 0.0,
            raw_delta_time: 0.0,
            elapsed_time: 0.0,
            frame_count: 0,
            max_delta: MAX_FRAME_DELTA,
        }
    }

    /// Override the clamp applied to each step
    pub fn with_max_delta(mut self, max_delta: f32) -> Self {
        self.max_delta = max_delta;
        self
    }

    /// Restart measurement from now, clearing accumulated time
    pub fn reset(&mut self) {
        *self = Self::starting_at(Instant::now()).with_max_delta(self.max_delta);
    }

    /// Advance the clock to the current instant and return the clamped delta
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    /// Advance the clock to `now` and return the clamped delta in seconds
    pub fn tick_at(&mut self, now: Instant) -> f32 {
        let raw = now.saturating_duration_since(self.last_frame).as_secs_f32();
        self.raw_delta_time = raw;
        self.delta_time = raw.min(self.max_delta);
        self.elapsed_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
        self.delta_time
    }

    /// Clamped time since the previous tick, in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Unclamped wall-clock time measured by the previous tick
    pub fn raw_delta_time(&self) -> f32 {
        self.raw_delta_time
    }

    /// Sum of all clamped deltas since creation or the last reset
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    /// Number of ticks since creation or the last reset
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Clamp applied to each step
    pub fn max_delta(&self) -> f32 {
        self.max_delta
    }
}

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed += start.elapsed();
            self.start_time = None;
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let current_elapsed = self.start_time.map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + current_elapsed
    }

    /// Get the elapsed time in seconds
    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed().as_secs_f32()
    }

    /// Check if the stopwatch is currently running
    pub fn is_running(&self) -> bool {
        self.start_time.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stalled_frame_is_clamped() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        let delta = clock.tick_at(start + Duration::from_millis(500));

        assert!(delta <= MAX_FRAME_DELTA);
        assert_eq!(delta, MAX_FRAME_DELTA);
        assert_eq!(clock.elapsed_time(), MAX_FRAME_DELTA);
        assert!(clock.raw_delta_time() >= 0.499);
    }

    #[test]
    fn test_short_frame_passes_through() {
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        let delta = clock.tick_at(start + Duration::from_millis(10));

        assert!((delta - 0.010).abs() < 1e-4);
        assert_eq!(clock.elapsed_time(), delta);
        assert_eq!(clock.frame_count(), 1);
    }

    #[test]
    fn test_next_tick_measures_from_raw_now() {
        // After a stall, the following frame measures from the stalled
        // instant rather than carrying over the clamped remainder.
        let start = Instant::now();
        let mut clock = FrameClock::starting_at(start);

        clock.tick_at(start + Duration::from_millis(500));
        let delta = clock.tick_at(start + Duration::from_millis(516));

        assert!((delta - 0.016).abs() < 1e-4);
        assert!((clock.elapsed_time() - (MAX_FRAME_DELTA + 0.016)).abs() < 1e-4);
    }

    #[test]
    fn test_time_going_backwards_yields_zero() {
        let start = Instant::now() + Duration::from_millis(100);
        let mut clock = FrameClock::starting_at(start);

        let delta = clock.tick_at(start - Duration::from_millis(50));
        assert_eq!(delta, 0.0);
    }

    #[test]
    fn test_stopwatch_accumulates() {
        let mut stopwatch = Stopwatch::start_new();
        assert!(stopwatch.is_running());
        std::thread::sleep(Duration::from_millis(2));
        stopwatch.stop();
        assert!(!stopwatch.is_running());
        assert!(stopwatch.elapsed() >= Duration::from_millis(2));
    }
}
