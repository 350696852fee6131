//! Preview engine adapter for a local audio element.
//!
//! The element keeps its clock in fractional seconds and pushes time-update,
//! metadata and ended notifications. The host wires those notifications to a
//! [`PreviewEvents`] handle, which converts them to millisecond
//! [`EngineEvent`]s.

use crate::core::time::{self, Millis};
use crate::playback::engine::{
    EngineError, EngineEvent, EngineKind, EventSender, PlaybackEngine, Track,
};

/// HTML-audio-like element surface. Times are in seconds.
pub trait AudioElement {
    fn set_source(&mut self, url: &str) -> Result<(), EngineError>;

    fn play(&mut self) -> Result<(), EngineError>;

    fn pause(&mut self) -> Result<(), EngineError>;

    fn set_current_time(&mut self, seconds: f64) -> Result<(), EngineError>;

    fn current_time(&self) -> f64;

    /// NaN until metadata has loaded
    fn duration(&self) -> f64;

    fn set_volume(&mut self, volume: f32) -> Result<(), EngineError>;
}

/// Cloneable handle the host attaches to the element's event listeners
#[derive(Debug, Clone)]
pub struct PreviewEvents {
    tx: EventSender,
}

impl PreviewEvents {
    pub fn time_update(&self, current_time: f64) {
        self.emit(EngineEvent::PositionChanged(time::from_secs_f64(current_time)));
    }

    pub fn loaded_metadata(&self, duration: f64) {
        let duration_ms = time::from_secs_f64(duration);
        if duration_ms > 0 {
            self.emit(EngineEvent::DurationKnown(duration_ms));
        }
    }

    pub fn ended(&self) {
        self.emit(EngineEvent::Ended);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(EngineEvent::Error(message.into()));
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// [`PlaybackEngine`] over an [`AudioElement`]
pub struct PreviewEngine<A: AudioElement> {
    element: A,
    events: EventSender,
}

impl<A: AudioElement> PreviewEngine<A> {
    pub fn new(element: A, events: EventSender) -> Self {
        Self { element, events }
    }

    /// Handle for the element's time-update/metadata/ended listeners
    pub fn events(&self) -> PreviewEvents {
        PreviewEvents {
            tx: self.events.clone(),
        }
    }

    pub fn element(&self) -> &A {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut A {
        &mut self.element
    }
}

impl<A: AudioElement> PlaybackEngine for PreviewEngine<A> {
    fn kind(&self) -> EngineKind {
        EngineKind::Preview
    }

    fn load(&mut self, track: &Track) -> Result<(), EngineError> {
        self.element.set_source(&track.uri)
    }

    fn play(&mut self) -> Result<(), EngineError> {
        self.element.play()
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.element.pause()
    }

    fn seek(&mut self, position: Millis) -> Result<(), EngineError> {
        self.element.set_current_time(time::to_secs_f64(position))
    }

    fn set_volume(&mut self, volume: f32) -> Result<(), EngineError> {
        self.element.set_volume(volume)
    }

    fn position(&self) -> Millis {
        time::from_secs_f64(self.element.current_time())
    }

    fn duration(&self) -> Option<Millis> {
        let duration = time::from_secs_f64(self.element.duration());
        (duration > 0).then_some(duration)
    }
}
