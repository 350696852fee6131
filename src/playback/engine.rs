//! Playback engine capability interface.
//!
//! Both backends (the remote full-track SDK and the local preview audio
//! element) are driven through [`PlaybackEngine`] and report back through a
//! crossbeam channel of [`EngineEvent`]s, which the editing session drains
//! on its own schedule.

use std::fmt;
use crossbeam::channel;
use crate::core::time::Millis;

/// Which backend plays the selected track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Full track streamed through a remote playback SDK
    FullTrack,
    /// Fixed-length preview played by a local audio element
    Preview,
}

/// A track handed to an engine for playback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: String,
    /// SDK track URI or preview audio URL, depending on `kind`
    pub uri: String,
    pub kind: EngineKind,
}

impl Track {
    pub fn full(id: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
            kind: EngineKind::FullTrack,
        }
    }

    pub fn preview(id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uri: url.into(),
            kind: EngineKind::Preview,
        }
    }
}

/// Command issued to an engine, kept for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineCommand {
    Load,
    Play,
    Pause,
    Seek(Millis),
    SetVolume,
}

impl fmt::Display for EngineCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineCommand::Load => write!(f, "load"),
            EngineCommand::Play => write!(f, "play"),
            EngineCommand::Pause => write!(f, "pause"),
            EngineCommand::Seek(position) => write!(f, "seek to {} ms", position),
            EngineCommand::SetVolume => write!(f, "set volume"),
        }
    }
}

/// Notification from an engine
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    PositionChanged(Millis),
    DurationKnown(Millis),
    /// The backend started or stopped on its own (remote client, SDK state)
    PlayingChanged(bool),
    Ended,
    Error(String),
}

/// Error type for engine commands
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("engine is not ready")]
    NotReady,
    #[error("{command} rejected: {reason}")]
    Rejected {
        command: EngineCommand,
        reason: String,
    },
    #[error("engine disconnected")]
    Disconnected,
    /// Failure reported by the backend outside of any command
    #[error("backend error: {0}")]
    Backend(String),
}

impl EngineError {
    pub fn rejected(command: EngineCommand, reason: impl Into<String>) -> Self {
        EngineError::Rejected {
            command,
            reason: reason.into(),
        }
    }
}

pub type EventSender = channel::Sender<EngineEvent>;
pub type EventReceiver = channel::Receiver<EngineEvent>;

/// Create the channel an engine reports on
pub fn event_channel() -> (EventSender, EventReceiver) {
    channel::unbounded()
}

/// Playback backend as seen by the editing session.
///
/// Commands may complete asynchronously on the backend side; their `Result`
/// only reports whether the command could be issued.
pub trait PlaybackEngine {
    fn kind(&self) -> EngineKind;

    fn load(&mut self, track: &Track) -> Result<(), EngineError>;

    fn play(&mut self) -> Result<(), EngineError>;

    fn pause(&mut self) -> Result<(), EngineError>;

    fn seek(&mut self, position: Millis) -> Result<(), EngineError>;

    /// Volume in `0.0..=1.0`
    fn set_volume(&mut self, volume: f32) -> Result<(), EngineError>;

    /// Last known playback position
    fn position(&self) -> Millis;

    /// Track length, once the backend has reported it
    fn duration(&self) -> Option<Millis>;

    /// Emit any events the backend cannot push by itself.
    /// Called once per session pump; push-based engines keep the default.
    fn poll(&mut self) {}
}

impl<E: PlaybackEngine + ?Sized> PlaybackEngine for Box<E> {
    fn kind(&self) -> EngineKind {
        (**self).kind()
    }

    fn load(&mut self, track: &Track) -> Result<(), EngineError> {
        (**self).load(track)
    }

    fn play(&mut self) -> Result<(), EngineError> {
        (**self).play()
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        (**self).pause()
    }

    fn seek(&mut self, position: Millis) -> Result<(), EngineError> {
        (**self).seek(position)
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), EngineError> {
        (**self).set_volume(volume)
    }

    fn position(&self) -> Millis {
        (**self).position()
    }

    fn duration(&self) -> Option<Millis> {
        (**self).duration()
    }

    fn poll(&mut self) {
        (**self).poll()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = EngineError::rejected(EngineCommand::Seek(1_500), "premium required");
        assert_eq!(err.to_string(), "seek to 1500 ms rejected: premium required");
        assert_eq!(EngineError::NotReady.to_string(), "engine is not ready");
    }

    #[test]
    fn test_track_constructors() {
        let track = Track::preview("abc", "https://p.scdn.co/mp3-preview/abc");
        assert_eq!(track.kind, EngineKind::Preview);
        assert_eq!(Track::full("abc", "spotify:track:abc").kind, EngineKind::FullTrack);
    }

    #[test]
    fn test_event_channel_preserves_order() {
        let (tx, rx) = event_channel();
        tx.send(EngineEvent::DurationKnown(180_000)).unwrap();
        tx.send(EngineEvent::PositionChanged(1_000)).unwrap();
        let events: Vec<_> = rx.try_iter().collect();
        assert_eq!(
            events,
            vec![EngineEvent::DurationKnown(180_000), EngineEvent::PositionChanged(1_000)]
        );
    }
}
