//! Observable playback status mirrored from the active engine.

use crate::core::time::{self, Millis, TimeUnit};

/// Playback status as last reported (or optimistically assumed)
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub position_ms: Millis,
    /// 0 while the engine has not reported a length
    pub duration_ms: Millis,
    pub is_playing: bool,
    pub volume: f32,
}

impl PlaybackState {
    pub fn new(volume: f32) -> Self {
        Self {
            position_ms: 0,
            duration_ms: 0,
            is_playing: false,
            volume,
        }
    }

    /// Forget everything about the previous track; volume is kept
    pub fn reset(&mut self) {
        self.position_ms = 0;
        self.duration_ms = 0;
        self.is_playing = false;
    }

    pub fn has_duration(&self) -> bool {
        self.duration_ms > 0
    }

    /// Playhead position as a percentage of the track
    pub fn progress_percent(&self) -> f32 {
        time::percent_of(self.position_ms, self.duration_ms)
    }

    /// `M:SS` label for the playhead
    pub fn position_label(&self) -> String {
        time::format_clock_time(self.position_ms as f64, TimeUnit::Millis)
    }

    /// `M:SS` label for the track length
    pub fn duration_label(&self) -> String {
        time::format_clock_time(self.duration_ms as f64, TimeUnit::Millis)
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(1.0)
    }
}
