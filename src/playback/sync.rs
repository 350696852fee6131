//! Playback position synchronization.
//!
//! Mirrors engine reports into [`PlaybackState`], pauses the engine once the
//! playhead reaches the end marker, and seeks the engine for clicks, typed
//! times and clip previews. Seeks update the mirrored position before the
//! engine confirms them.

use crate::core::clip::ClipWindow;
use crate::core::time::Millis;
use crate::playback::engine::{EngineError, EngineEvent, PlaybackEngine};
use crate::playback::state::PlaybackState;

/// What an engine event did to the session, for the caller's bookkeeping
#[derive(Debug, Clone, PartialEq)]
pub enum SyncOutcome {
    /// Only the mirrored playback state moved
    Mirrored,
    /// The track length arrived and the clip window may have moved
    WindowAdjusted,
    /// The playhead crossed the end marker; the result of the pause command
    AutoPaused(Result<(), EngineError>),
    /// The engine reported a failure
    EngineFailed(String),
}

/// Keeps the mirrored playback state and the engine in step with the window
pub struct PositionSynchronizer {
    state: PlaybackState,
    /// Set on track selection, cleared once the first duration arrives
    awaiting_first_duration: bool,
}

impl PositionSynchronizer {
    pub fn new(volume: f32) -> Self {
        Self {
            state: PlaybackState::new(volume),
            awaiting_first_duration: false,
        }
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    /// A different track was picked: its first duration resets the window
    pub fn track_selected(&mut self) {
        self.state.reset();
        self.awaiting_first_duration = true;
    }

    /// A stored clip was opened: durations only clamp the restored window
    pub fn track_restored(&mut self) {
        self.state.reset();
        self.awaiting_first_duration = false;
    }

    pub fn reset(&mut self) {
        self.state.reset();
        self.awaiting_first_duration = false;
    }

    /// Apply one engine event
    pub fn handle_event<E: PlaybackEngine + ?Sized>(
        &mut self,
        event: EngineEvent,
        window: &mut ClipWindow,
        engine: &mut E,
    ) -> SyncOutcome {
        match event {
            EngineEvent::PositionChanged(position) => self.on_position(position, window, engine),
            EngineEvent::DurationKnown(duration) => {
                self.on_duration(duration, window);
                SyncOutcome::WindowAdjusted
            }
            EngineEvent::PlayingChanged(playing) => {
                self.state.is_playing = playing;
                SyncOutcome::Mirrored
            }
            EngineEvent::Ended => {
                self.state.is_playing = false;
                SyncOutcome::Mirrored
            }
            EngineEvent::Error(message) => {
                log::warn!("engine error: {}", message);
                SyncOutcome::EngineFailed(message)
            }
        }
    }

    /// Mirror a reported position and enforce the end marker.
    ///
    /// Checked against the window's current end on every report, so moving
    /// the markers mid-playback moves the stop point with them.
    pub fn on_position<E: PlaybackEngine + ?Sized>(
        &mut self,
        position: Millis,
        window: &ClipWindow,
        engine: &mut E,
    ) -> SyncOutcome {
        self.state.position_ms = position.max(0);

        if self.state.is_playing && position >= window.end_ms() {
            log::info!(
                "auto-pause at {} ms (clip ends at {} ms)",
                position,
                window.end_ms()
            );
            self.state.is_playing = false;
            return SyncOutcome::AutoPaused(engine.pause());
        }
        SyncOutcome::Mirrored
    }

    /// Record a reported track length and fit the window to it
    pub fn on_duration(&mut self, duration: Millis, window: &mut ClipWindow) {
        if duration <= 0 {
            return;
        }

        self.state.duration_ms = duration;
        if self.awaiting_first_duration {
            log::debug!("first duration for new track: {} ms", duration);
            self.awaiting_first_duration = false;
            window.reset_for_duration(duration);
        } else {
            window.set_duration(duration);
        }
    }

    /// Seek the engine, updating the mirrored position first
    pub fn seek<E: PlaybackEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        position: Millis,
    ) -> Result<(), EngineError> {
        self.state.position_ms = position.max(0);
        engine.seek(position)
    }

    /// Play the clip from its start; the end marker stops it
    pub fn preview_clip<E: PlaybackEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        window: &ClipWindow,
    ) -> Result<(), EngineError> {
        self.seek(engine, window.start_ms())?;
        engine.play()?;
        self.state.is_playing = true;
        Ok(())
    }

    pub fn pause<E: PlaybackEngine + ?Sized>(&mut self, engine: &mut E) -> Result<(), EngineError> {
        self.state.is_playing = false;
        engine.pause()
    }

    /// Pause when playing, otherwise preview the clip
    pub fn toggle<E: PlaybackEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        window: &ClipWindow,
    ) -> Result<(), EngineError> {
        if self.state.is_playing {
            self.pause(engine)
        } else {
            self.preview_clip(engine, window)
        }
    }

    pub fn set_volume<E: PlaybackEngine + ?Sized>(
        &mut self,
        engine: &mut E,
        volume: f32,
    ) -> Result<(), EngineError> {
        let volume = volume.clamp(0.0, 1.0);
        self.state.volume = volume;
        engine.set_volume(volume)
    }
}
