//! One clip-editing session: a track, its clip window, the timeline gestures
//! and the playback engine, wired together.
//!
//! The host drives the session from its event loop: gesture and field
//! callbacks go to the matching methods, and [`ClipEditor::pump`] is called
//! once per turn to take in engine reports. Every confirmed window change is
//! published on a `watch` channel for the persistence side to pick up.

use egui::{Pos2, Rect};
use tokio::sync::watch;
use crate::core::clip::{ClipWindow, Marker};
use crate::core::config::EditorConfig;
use crate::core::cut::{ClipChange, ClipCut};
use crate::error::EditorError;
use crate::playback::engine::{EngineError, EngineKind, EventReceiver, PlaybackEngine, Track};
use crate::playback::state::PlaybackState;
use crate::playback::sync::{PositionSynchronizer, SyncOutcome};
use crate::ui::timeline_view::{DragState, NoCapture, PointerCapture, TimelineView};

type ErrorCallback = Box<dyn FnMut(&EditorError)>;

/// Clip-editing session
pub struct ClipEditor<E: PlaybackEngine, C: PointerCapture = NoCapture> {
    config: EditorConfig,
    window: ClipWindow,
    view: TimelineView<C>,
    sync: PositionSynchronizer,
    engine: E,
    events: EventReceiver,
    track: Option<Track>,
    changes: watch::Sender<Option<ClipChange>>,
    published: Option<ClipChange>,
    on_error: Option<ErrorCallback>,
}

impl<E: PlaybackEngine> ClipEditor<E, NoCapture> {
    /// Create a session whose host delivers pointer events without capture
    pub fn new(
        config: EditorConfig,
        engine: E,
        events: EventReceiver,
    ) -> Result<Self, EditorError> {
        Self::with_capture(config, engine, events, NoCapture)
    }
}

impl<E: PlaybackEngine, C: PointerCapture> ClipEditor<E, C> {
    /// Create a session. `events` must be the receiving end of the channel
    /// the engine reports on.
    pub fn with_capture(
        config: EditorConfig,
        mut engine: E,
        events: EventReceiver,
        capture: C,
    ) -> Result<Self, EditorError> {
        config.validate()?;
        engine.set_volume(config.initial_volume)?;

        let (changes, _) = watch::channel(None);
        Ok(Self {
            window: ClipWindow::new(config.clip_length_ms),
            view: TimelineView::new(capture),
            sync: PositionSynchronizer::new(config.initial_volume),
            config,
            engine,
            events,
            track: None,
            changes,
            published: None,
            on_error: None,
        })
    }

    /// Register the callback for failures noticed while pumping events
    pub fn on_error(&mut self, callback: impl FnMut(&EditorError) + 'static) {
        self.on_error = Some(Box::new(callback));
    }

    /// Receive the latest clip window after each change
    pub fn subscribe(&self) -> watch::Receiver<Option<ClipChange>> {
        self.changes.subscribe()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn window(&self) -> &ClipWindow {
        &self.window
    }

    pub fn playback(&self) -> &PlaybackState {
        self.sync.state()
    }

    pub fn drag_state(&self) -> DragState {
        self.view.drag_state()
    }

    pub fn track(&self) -> Option<&Track> {
        self.track.as_ref()
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Record for the persistence layer
    pub fn cut(&self) -> ClipCut {
        self.window.to_cut()
    }

    /// Text for the editable start field
    pub fn start_text(&self) -> String {
        self.window.start_text()
    }

    /// Text for the read-only end field
    pub fn end_text(&self) -> String {
        self.window.end_text()
    }

    /// Start a fresh clip on a newly picked track
    pub fn select_track(&mut self, track: Track) -> Result<(), EditorError> {
        self.prepare_track(&track);
        self.window.reset();
        self.sync.track_selected();
        self.install_track(track)
    }

    /// Reopen a stored clip on its track
    pub fn load_for_edit(&mut self, track: Track, cut: &ClipCut) -> Result<(), EditorError> {
        self.prepare_track(&track);
        self.window = ClipWindow::from_cut(cut, self.config.clip_length_ms);
        self.sync.track_restored();
        self.install_track(track)
    }

    /// Clear the form: stop playback and forget the track
    pub fn reset(&mut self) -> Result<(), EditorError> {
        self.view.cancel();
        let paused = if self.sync.state().is_playing {
            self.sync.pause(&mut self.engine)
        } else {
            Ok(())
        };

        self.window.reset();
        self.sync.reset();
        self.track = None;
        self.discard_pending_events();
        self.published = None;
        self.changes.send_replace(None);
        paused.map_err(EditorError::from)
    }

    /// Lay out the timeline (screen rectangle of the progress bar)
    pub fn set_timeline_rect(&mut self, rect: Rect) {
        self.view.set_rect(rect);
    }

    /// Pointer pressed on a marker handle
    pub fn pointer_down(&mut self, marker: Marker) -> bool {
        self.view.pointer_down(marker)
    }

    /// Pointer pressed somewhere on the timeline; grabs the marker under it
    pub fn pointer_down_at(&mut self, pos: Pos2) -> Option<Marker> {
        let marker = self.view.hit_marker(pos, &self.window)?;
        self.view.pointer_down(marker).then_some(marker)
    }

    pub fn pointer_move(&mut self, pos: Pos2) -> bool {
        let changed = self.view.pointer_move(pos, &mut self.window);
        if changed {
            self.publish();
        }
        changed
    }

    pub fn pointer_up(&mut self) {
        self.view.pointer_up();
    }

    /// Click on the timeline background: seek there.
    ///
    /// Returns `Ok(false)` when no seek was issued (drag in progress or no
    /// track length yet).
    pub fn timeline_click(&mut self, pos: Pos2) -> Result<bool, EditorError> {
        let Some(target) = self.view.click_target(pos, self.window.duration_ms()) else {
            return Ok(false);
        };
        self.sync.seek(&mut self.engine, target)?;
        Ok(true)
    }

    /// The start field was edited.
    ///
    /// The end follows at one clip length without a duration clamp, and the
    /// engine is moved to the new start.
    pub fn edit_start_text(&mut self, text: &str) -> Result<(), EditorError> {
        self.window.set_from_manual_text(text);
        self.publish();
        if self.track.is_some() {
            self.sync.seek(&mut self.engine, self.window.start_ms())?;
        }
        Ok(())
    }

    /// Play the clip from its start marker; playback stops at the end marker
    pub fn preview_clip(&mut self) -> Result<(), EditorError> {
        self.sync.preview_clip(&mut self.engine, &self.window)?;
        Ok(())
    }

    /// Play/pause button
    pub fn toggle_play(&mut self) -> Result<(), EditorError> {
        self.sync.toggle(&mut self.engine, &self.window)?;
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), EditorError> {
        self.sync.pause(&mut self.engine)?;
        Ok(())
    }

    pub fn set_volume(&mut self, volume: f32) -> Result<(), EditorError> {
        self.sync.set_volume(&mut self.engine, volume)?;
        Ok(())
    }

    /// Take in everything the engine reported since the last call.
    ///
    /// Returns the number of events handled. Failures are passed to the
    /// `on_error` callback; the clip window is never rolled back for them.
    pub fn pump(&mut self) -> usize {
        self.engine.poll();

        let mut handled = 0;
        while let Ok(event) = self.events.try_recv() {
            handled += 1;
            match self.sync.handle_event(event, &mut self.window, &mut self.engine) {
                SyncOutcome::AutoPaused(Err(e)) => self.report(e.into()),
                SyncOutcome::EngineFailed(message) => {
                    self.report(EngineError::Backend(message).into())
                }
                SyncOutcome::Mirrored
                | SyncOutcome::WindowAdjusted
                | SyncOutcome::AutoPaused(Ok(())) => {}
            }
        }

        self.publish();
        handled
    }

    fn prepare_track(&mut self, track: &Track) {
        if track.kind != self.engine.kind() {
            log::warn!(
                "track {} is {:?} but the engine plays {:?}",
                track.id,
                track.kind,
                self.engine.kind()
            );
        }
        self.view.cancel();
        self.discard_pending_events();
    }

    fn install_track(&mut self, track: Track) -> Result<(), EditorError> {
        log::info!("loading track {} ({:?})", track.id, track.kind);
        let loaded = self.engine.load(&track);
        if track.kind == EngineKind::Preview {
            self.sync.on_duration(self.config.preview_length_ms, &mut self.window);
        }
        self.track = Some(track);
        self.publish();
        loaded.map_err(EditorError::from)
    }

    /// Reports still queued for the previous track must not reach the new one
    fn discard_pending_events(&mut self) {
        self.events.try_iter().for_each(drop);
    }

    fn publish(&mut self) {
        if self.window.duration_ms().is_none() {
            return;
        }
        let change = self.window.change();
        if self.published != Some(change) {
            log::debug!(
                "clip window {} ms .. {} ms",
                change.start_time_ms,
                change.end_time_ms
            );
            self.published = Some(change);
            self.changes.send_replace(Some(change));
        }
    }

    fn report(&mut self, error: EditorError) {
        log::warn!("{}", error);
        if let Some(callback) = self.on_error.as_mut() {
            callback(&error);
        }
    }
}

impl<E: PlaybackEngine, C: PointerCapture> Drop for ClipEditor<E, C> {
    fn drop(&mut self) {
        if self.sync.state().is_playing {
            if let Err(e) = self.engine.pause() {
                log::warn!("pause on teardown failed: {}", e);
            }
        }
    }
}
