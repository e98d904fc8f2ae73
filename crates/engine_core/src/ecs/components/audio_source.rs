//! Audio source component

/// Positional sound emitter, positioned by the entity's transform
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSourceComponent {
    /// Sound clip name resolved by the audio backend
    pub clip: String,
    /// Gain in `[0, 1]`
    pub volume: f32,
    /// Restart when the clip ends
    pub looping: bool,
    /// Whether the clip is currently playing
    pub playing: bool,
}

impl Default for AudioSourceComponent {
    fn default() -> Self {
        Self {
            clip: String::new(),
            volume: 1.0,
            looping: false,
            playing: false,
        }
    }
}

impl AudioSourceComponent {
    /// Stopped source for `clip` at full volume
    pub fn new(clip: impl Into<String>) -> Self {
        Self {
            clip: clip.into(),
            ..Self::default()
        }
    }

    /// Start playback
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Stop playback
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Set the gain, clamped to `[0, 1]`
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }
}
