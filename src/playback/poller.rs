//! Full-track engine adapter for remote playback SDKs.
//!
//! The SDK only reports its position when asked, so while playing the adapter
//! keeps a crossbeam tick timer armed and turns each tick into a
//! `PositionChanged` event. The timer is the receiver returned by
//! `channel::tick`: dropping it is what stops polling, and every path out of
//! the playing state drops it.

use std::time::{Duration, Instant};
use crossbeam::channel::{self, Receiver};
use crate::core::time::Millis;
use crate::playback::engine::{
    EngineError, EngineEvent, EngineKind, EventSender, PlaybackEngine, Track,
};

/// Snapshot of the remote player as returned by the SDK
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteState {
    pub position_ms: Millis,
    pub duration_ms: Millis,
    pub paused: bool,
}

/// Remote playback SDK surface
pub trait RemotePlayer {
    /// Cue a track on the player's device without starting it
    fn load_track(&mut self, uri: &str) -> Result<(), EngineError>;

    fn resume(&mut self) -> Result<(), EngineError>;

    fn pause(&mut self) -> Result<(), EngineError>;

    fn seek(&mut self, position_ms: Millis) -> Result<(), EngineError>;

    fn set_volume(&mut self, volume: f32) -> Result<(), EngineError>;

    /// `Ok(None)` while the player has nothing loaded
    fn current_state(&mut self) -> Result<Option<RemoteState>, EngineError>;
}

/// [`PlaybackEngine`] over a [`RemotePlayer`], synthesizing position events
/// from a fixed-interval poll
pub struct PolledEngine<P: RemotePlayer> {
    player: P,
    events: EventSender,
    interval: Duration,
    ticker: Option<Receiver<Instant>>,
    position_ms: Millis,
    duration_ms: Option<Millis>,
}

impl<P: RemotePlayer> PolledEngine<P> {
    pub fn new(player: P, events: EventSender, interval: Duration) -> Self {
        Self {
            player,
            events,
            interval,
            ticker: None,
            position_ms: 0,
            duration_ms: None,
        }
    }

    /// True while the poll timer is armed
    pub fn is_polling(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut P {
        &mut self.player
    }

    /// Apply a state pushed by the SDK (its state-changed listener) or
    /// fetched by a poll tick.
    pub fn on_state_changed(&mut self, state: Option<RemoteState>) {
        let Some(state) = state else {
            return;
        };

        self.position_ms = state.position_ms;
        self.emit(EngineEvent::PositionChanged(state.position_ms));

        if state.duration_ms > 0 && self.duration_ms != Some(state.duration_ms) {
            self.duration_ms = Some(state.duration_ms);
            self.emit(EngineEvent::DurationKnown(state.duration_ms));
        }

        let was_polling = self.is_polling();
        if state.paused {
            self.disarm();
        } else {
            self.arm();
        }
        if was_polling != self.is_polling() {
            self.emit(EngineEvent::PlayingChanged(!state.paused));
        }
    }

    /// Query the SDK once, regardless of the timer
    pub fn sample(&mut self) {
        match self.player.current_state() {
            Ok(state) => self.on_state_changed(state),
            Err(e) => {
                log::warn!("position poll failed: {}", e);
                self.emit(EngineEvent::Error(e.to_string()));
            }
        }
    }

    fn arm(&mut self) {
        if self.ticker.is_none() {
            log::debug!("arming position poll every {:?}", self.interval);
            self.ticker = Some(channel::tick(self.interval));
        }
    }

    fn disarm(&mut self) {
        if self.ticker.take().is_some() {
            log::debug!("position poll stopped");
        }
    }

    fn emit(&self, event: EngineEvent) {
        // the session owning the receiver may already be gone during teardown
        let _ = self.events.send(event);
    }
}

impl<P: RemotePlayer> PlaybackEngine for PolledEngine<P> {
    fn kind(&self) -> EngineKind {
        EngineKind::FullTrack
    }

    fn load(&mut self, track: &Track) -> Result<(), EngineError> {
        self.disarm();
        self.position_ms = 0;
        self.duration_ms = None;
        self.player.load_track(&track.uri)
    }

    fn play(&mut self) -> Result<(), EngineError> {
        self.player.resume()?;
        self.arm();
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        // polling stops even when the SDK rejects the pause
        self.disarm();
        self.player.pause()
    }

    fn seek(&mut self, position: Millis) -> Result<(), EngineError> {
        self.player.seek(position)?;
        self.position_ms = position;
        Ok(())
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), EngineError> {
        self.player.set_volume(volume)
    }

    fn position(&self) -> Millis {
        self.position_ms
    }

    fn duration(&self) -> Option<Millis> {
        self.duration_ms
    }

    fn poll(&mut self) {
        let due = match &self.ticker {
            Some(ticker) => ticker.try_iter().count() > 0,
            None => false,
        };
        if due {
            self.sample();
        }
    }
}
