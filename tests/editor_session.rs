//! Integration tests for full clip-editing sessions.
//!
//! Drives `ClipEditor` through select → drag/type → preview → save flows
//! against scripted engines and checks the window, the engine commands and
//! the published clip changes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use egui::{pos2, vec2, Rect};
use songclip::core::time::Millis;
use songclip::playback::engine::{
    event_channel, EngineCommand, EngineError, EngineEvent, EngineKind, EventSender,
};
use songclip::playback::{AudioElement, PolledEngine, PreviewEngine, RemotePlayer, RemoteState};
use songclip::ui::{DragState, PointerCapture};
use songclip::{ClipCut, ClipEditor, EditorConfig, EditorError, Marker, PlaybackEngine, Track};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Engine that records commands and reports whatever the test feeds it
struct ScriptedEngine {
    kind: EngineKind,
    commands: Vec<EngineCommand>,
    position: Millis,
    events: EventSender,
    fail_seek: bool,
}

impl ScriptedEngine {
    fn new(kind: EngineKind, events: EventSender) -> Self {
        Self {
            kind,
            commands: Vec::new(),
            position: 0,
            events,
            fail_seek: false,
        }
    }

    fn report(&self, event: EngineEvent) {
        self.events.send(event).unwrap();
    }
}

impl PlaybackEngine for ScriptedEngine {
    fn kind(&self) -> EngineKind {
        self.kind
    }

    fn load(&mut self, _track: &Track) -> Result<(), EngineError> {
        self.commands.push(EngineCommand::Load);
        self.position = 0;
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        self.commands.push(EngineCommand::Play);
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.commands.push(EngineCommand::Pause);
        Ok(())
    }

    fn seek(&mut self, position: Millis) -> Result<(), EngineError> {
        self.commands.push(EngineCommand::Seek(position));
        if self.fail_seek {
            return Err(EngineError::rejected(EngineCommand::Seek(position), "device offline"));
        }
        self.position = position;
        Ok(())
    }

    fn set_volume(&mut self, _volume: f32) -> Result<(), EngineError> {
        self.commands.push(EngineCommand::SetVolume);
        Ok(())
    }

    fn position(&self) -> Millis {
        self.position
    }

    fn duration(&self) -> Option<Millis> {
        None
    }
}

fn full_track_session() -> ClipEditor<ScriptedEngine> {
    init_logging();
    let (tx, rx) = event_channel();
    let engine = ScriptedEngine::new(EngineKind::FullTrack, tx);
    let mut editor = ClipEditor::new(EditorConfig::default(), engine, rx).unwrap();
    // 600 points wide: 1 point = 300 ms of a 3:00 track
    editor.set_timeline_rect(Rect::from_min_size(pos2(0.0, 0.0), vec2(600.0, 24.0)));
    editor
}

fn report(editor: &mut ClipEditor<ScriptedEngine>, event: EngineEvent) {
    editor.engine().report(event);
    editor.pump();
}

#[test]
fn test_fresh_track_takes_first_duration() {
    let mut editor = full_track_session();
    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    assert_eq!(editor.window().duration_ms(), None);

    report(&mut editor, EngineEvent::DurationKnown(180_000));
    assert_eq!(editor.window().start_ms(), 0);
    assert_eq!(editor.window().end_ms(), 30_000);
    assert_eq!(editor.playback().duration_ms, 180_000);
}

#[test]
fn test_track_shorter_than_clip() {
    let mut editor = full_track_session();
    editor.select_track(Track::full("short", "spotify:track:short")).unwrap();
    report(&mut editor, EngineEvent::DurationKnown(25_000));

    assert_eq!(editor.window().start_ms(), 0);
    assert_eq!(editor.window().end_ms(), 25_000);
}

#[test]
fn test_drag_end_past_track_end() {
    let mut editor = full_track_session();
    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    report(&mut editor, EngineEvent::DurationKnown(180_000));

    assert!(editor.pointer_down(Marker::End));
    assert_eq!(editor.drag_state(), DragState::DraggingEnd);
    editor.pointer_move(pos2(2_000.0, 12.0));
    editor.pointer_up();

    assert_eq!(editor.window().end_ms(), 180_000);
    assert_eq!(editor.window().start_ms(), 150_000);
    assert_eq!(editor.cut(), ClipCut {
        start_cut: "150".into(),
        stop_cut: "180".into(),
    });
}

#[test]
fn test_drag_start_before_timeline() {
    let mut editor = full_track_session();
    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    report(&mut editor, EngineEvent::DurationKnown(180_000));

    editor.pointer_down(Marker::Start);
    editor.pointer_move(pos2(200.0, 12.0));
    assert_eq!(editor.window().start_ms(), 60_000);
    editor.pointer_move(pos2(-50.0, 12.0));
    editor.pointer_up();

    assert_eq!(editor.window().start_ms(), 0);
    assert_eq!(editor.window().end_ms(), 30_000);
}

#[test]
fn test_click_seeks_only_when_idle() {
    let mut editor = full_track_session();
    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    report(&mut editor, EngineEvent::DurationKnown(180_000));

    editor.pointer_down(Marker::Start);
    assert!(!editor.timeline_click(pos2(300.0, 12.0)).unwrap());
    editor.pointer_up();

    assert!(editor.timeline_click(pos2(300.0, 12.0)).unwrap());
    assert_eq!(editor.playback().position_ms, 90_000);
    assert_eq!(editor.engine().commands.last(), Some(&EngineCommand::Seek(90_000)));
}

#[test]
fn test_click_before_duration_is_ignored() {
    let mut editor = full_track_session();
    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    assert!(!editor.timeline_click(pos2(300.0, 12.0)).unwrap());
}

#[test]
fn test_grab_marker_by_position() {
    let mut editor = full_track_session();
    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    report(&mut editor, EngineEvent::DurationKnown(180_000));

    // end marker of 0..30 s sits at x = 100
    assert_eq!(editor.pointer_down_at(pos2(104.0, 12.0)), Some(Marker::End));
    editor.pointer_up();
    assert_eq!(editor.pointer_down_at(pos2(50.0, 12.0)), None);
}

#[test]
fn test_typed_start_without_duration() {
    let mut editor = full_track_session();
    editor.edit_start_text("200").unwrap();

    assert_eq!(editor.window().start_ms(), 200_000);
    assert_eq!(editor.window().end_ms(), 230_000);
    assert_eq!(editor.start_text(), "3:20");
    assert_eq!(editor.end_text(), "3:50");
    // no track loaded, nothing to seek
    assert!(!editor
        .engine()
        .commands
        .iter()
        .any(|c| matches!(c, EngineCommand::Seek(_))));
}

#[test]
fn test_typed_start_is_not_clamped_but_seeks() {
    let mut editor = full_track_session();
    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    report(&mut editor, EngineEvent::DurationKnown(180_000));

    editor.edit_start_text("2:45").unwrap();
    assert_eq!(editor.window().start_ms(), 165_000);
    assert_eq!(editor.window().end_ms(), 195_000);
    assert_eq!(editor.engine().commands.last(), Some(&EngineCommand::Seek(165_000)));

    // a drag afterwards brings the window back inside the track
    editor.pointer_down(Marker::Start);
    editor.pointer_move(pos2(590.0, 12.0));
    editor.pointer_up();
    assert_eq!(editor.window().end_ms(), 180_000);
}

#[test]
fn test_empty_start_text_resets() {
    let mut editor = full_track_session();
    editor.edit_start_text("95").unwrap();
    editor.edit_start_text("").unwrap();
    assert_eq!(editor.window().start_ms(), 0);
    assert_eq!(editor.window().end_ms(), 30_000);
}

#[test]
fn test_preview_clip_auto_pauses() {
    let mut editor = full_track_session();
    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    report(&mut editor, EngineEvent::DurationKnown(180_000));
    editor.edit_start_text("60").unwrap();

    editor.preview_clip().unwrap();
    assert!(editor.playback().is_playing);
    let tail: Vec<_> = editor.engine().commands.iter().rev().take(2).cloned().collect();
    assert_eq!(tail, vec![EngineCommand::Play, EngineCommand::Seek(60_000)]);

    report(&mut editor, EngineEvent::PositionChanged(75_000));
    assert!(editor.playback().is_playing);

    report(&mut editor, EngineEvent::PositionChanged(90_400));
    assert!(!editor.playback().is_playing);
    assert_eq!(editor.engine().commands.last(), Some(&EngineCommand::Pause));
}

#[test]
fn test_toggle_play_pauses_then_replays_clip() {
    let mut editor = full_track_session();
    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    report(&mut editor, EngineEvent::DurationKnown(180_000));

    editor.toggle_play().unwrap();
    assert!(editor.playback().is_playing);
    editor.toggle_play().unwrap();
    assert!(!editor.playback().is_playing);
    assert_eq!(editor.engine().commands.last(), Some(&EngineCommand::Pause));
}

#[test]
fn test_changes_published_once_duration_known() {
    let mut editor = full_track_session();
    let mut changes = editor.subscribe();

    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    editor.edit_start_text("10").unwrap();
    assert!(!changes.has_changed().unwrap());
    assert_eq!(*changes.borrow(), None);

    report(&mut editor, EngineEvent::DurationKnown(180_000));
    assert!(changes.has_changed().unwrap());
    let change = changes.borrow_and_update().expect("window published");
    assert_eq!(change.start_time_ms, 0);
    assert_eq!(change.end_time_sec, 30.0);

    // unchanged window, nothing new
    report(&mut editor, EngineEvent::PositionChanged(5_000));
    assert!(!changes.has_changed().unwrap());

    editor.pointer_down(Marker::Start);
    editor.pointer_move(pos2(100.0, 12.0));
    editor.pointer_up();
    let change = changes.borrow_and_update().expect("window published");
    assert_eq!(change.start_time_ms, 30_000);
    assert_eq!(change.to_cut().stop_cut, "60");
}

#[test]
fn test_load_for_edit_keeps_stored_window() {
    let mut editor = full_track_session();
    let cut = ClipCut {
        start_cut: "95".into(),
        stop_cut: "125".into(),
    };
    editor.load_for_edit(Track::full("t9", "spotify:track:t9"), &cut).unwrap();
    report(&mut editor, EngineEvent::DurationKnown(240_000));

    assert_eq!(editor.window().start_ms(), 95_000);
    assert_eq!(editor.window().end_ms(), 125_000);
    assert_eq!(editor.start_text(), "1:35");
}

#[test]
fn test_load_for_edit_clamps_to_shorter_track() {
    let mut editor = full_track_session();
    let cut = ClipCut {
        start_cut: "200".into(),
        stop_cut: "230".into(),
    };
    editor.load_for_edit(Track::full("t9", "spotify:track:t9"), &cut).unwrap();
    report(&mut editor, EngineEvent::DurationKnown(180_000));

    assert_eq!(editor.window().start_ms(), 150_000);
    assert_eq!(editor.window().end_ms(), 180_000);
}

#[test]
fn test_stale_events_dropped_on_track_change() {
    let mut editor = full_track_session();
    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    editor.engine().report(EngineEvent::DurationKnown(25_000));

    editor.select_track(Track::full("t2", "spotify:track:t2")).unwrap();
    assert_eq!(editor.pump(), 0);
    report(&mut editor, EngineEvent::DurationKnown(200_000));
    assert_eq!(editor.window().end_ms(), 30_000);
}

#[test]
fn test_engine_failures_keep_window() {
    let mut editor = full_track_session();
    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    report(&mut editor, EngineEvent::DurationKnown(180_000));

    let seen: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = seen.clone();
    editor.on_error(move |e| sink.borrow_mut().push(e.to_string()));

    editor.engine_mut().fail_seek = true;
    let result = editor.edit_start_text("40");
    assert!(matches!(result, Err(EditorError::Engine(EngineError::Rejected { .. }))));
    assert_eq!(editor.window().start_ms(), 40_000);

    report(&mut editor, EngineEvent::Error("account error".into()));
    assert_eq!(seen.borrow().as_slice(), ["Engine error: backend error: account error"]);
    assert_eq!(editor.window().start_ms(), 40_000);
}

#[test]
fn test_reset_clears_session() {
    let mut editor = full_track_session();
    let changes = editor.subscribe();
    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    report(&mut editor, EngineEvent::DurationKnown(180_000));
    editor.preview_clip().unwrap();

    editor.reset().unwrap();
    assert!(!editor.playback().is_playing);
    assert!(editor.track().is_none());
    assert_eq!(editor.window().duration_ms(), None);
    assert_eq!(*changes.borrow(), None);
}

/// Counts live window-level listener registrations
#[derive(Clone, Default)]
struct CountingCapture(Rc<Cell<i32>>);

impl PointerCapture for CountingCapture {
    fn acquire(&mut self) {
        self.0.set(self.0.get() + 1);
    }

    fn release(&mut self) {
        self.0.set(self.0.get() - 1);
    }
}

#[test]
fn test_capture_released_when_session_moves_on() {
    init_logging();
    let capture = CountingCapture::default();
    let live = capture.0.clone();
    let (tx, rx) = event_channel();
    let engine = ScriptedEngine::new(EngineKind::FullTrack, tx);
    let mut editor =
        ClipEditor::with_capture(EditorConfig::default(), engine, rx, capture).unwrap();
    editor.set_timeline_rect(Rect::from_min_size(pos2(0.0, 0.0), vec2(600.0, 24.0)));

    assert!(editor.pointer_down(Marker::End));
    assert_eq!(live.get(), 1);
    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    assert_eq!(live.get(), 0);
    assert_eq!(editor.drag_state(), DragState::Idle);

    assert!(editor.pointer_down(Marker::Start));
    assert_eq!(live.get(), 1);
    let cut = ClipCut {
        start_cut: "95".into(),
        stop_cut: "125".into(),
    };
    editor.load_for_edit(Track::full("t2", "spotify:track:t2"), &cut).unwrap();
    assert_eq!(live.get(), 0);
    assert_eq!(editor.drag_state(), DragState::Idle);

    assert!(editor.pointer_down(Marker::End));
    assert_eq!(live.get(), 1);
    editor.reset().unwrap();
    assert_eq!(live.get(), 0);
    assert_eq!(editor.drag_state(), DragState::Idle);

    assert!(editor.pointer_down(Marker::Start));
    drop(editor);
    assert_eq!(live.get(), 0);
}

#[test]
fn test_invalid_config_rejected() {
    let (tx, rx) = event_channel();
    let engine = ScriptedEngine::new(EngineKind::FullTrack, tx);
    let config = EditorConfig {
        clip_length_ms: 0,
        ..EditorConfig::default()
    };
    assert!(matches!(
        ClipEditor::new(config, engine, rx),
        Err(EditorError::Config(_))
    ));
}

#[test]
fn test_configured_clip_length() {
    init_logging();
    let (tx, rx) = event_channel();
    let engine = ScriptedEngine::new(EngineKind::FullTrack, tx);
    let config = EditorConfig::from_json_str(r#"{ "clip_length_ms": 15000 }"#).unwrap();
    let mut editor = ClipEditor::new(config, engine, rx).unwrap();

    editor.edit_start_text("1:00").unwrap();
    assert_eq!(editor.window().end_ms(), 75_000);
}

// === Preview audio element ===

#[derive(Default)]
struct FakeAudio {
    current_time: f64,
    playing: bool,
}

impl AudioElement for FakeAudio {
    fn set_source(&mut self, _url: &str) -> Result<(), EngineError> {
        self.current_time = 0.0;
        Ok(())
    }

    fn play(&mut self) -> Result<(), EngineError> {
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        self.playing = false;
        Ok(())
    }

    fn set_current_time(&mut self, seconds: f64) -> Result<(), EngineError> {
        self.current_time = seconds;
        Ok(())
    }

    fn current_time(&self) -> f64 {
        self.current_time
    }

    fn duration(&self) -> f64 {
        30.0
    }

    fn set_volume(&mut self, _volume: f32) -> Result<(), EngineError> {
        Ok(())
    }
}

#[test]
fn test_preview_track_session() {
    init_logging();
    let (tx, rx) = event_channel();
    let engine = PreviewEngine::new(FakeAudio::default(), tx);
    let element_events = engine.events();
    let mut editor = ClipEditor::new(EditorConfig::default(), engine, rx).unwrap();
    editor.set_timeline_rect(Rect::from_min_size(pos2(0.0, 0.0), vec2(300.0, 20.0)));

    editor
        .select_track(Track::preview("p1", "https://p.scdn.co/mp3-preview/p1"))
        .unwrap();
    // preview length is known right away
    assert_eq!(editor.window().duration_ms(), Some(30_000));
    assert_eq!(editor.window().end_ms(), 30_000);

    element_events.loaded_metadata(29.5);
    editor.pump();
    assert_eq!(editor.window().end_ms(), 29_500);
    assert_eq!(editor.window().start_ms(), 0);

    editor.timeline_click(pos2(150.0, 10.0)).unwrap();
    assert_eq!(editor.engine().element().current_time, 14.75);

    editor.preview_clip().unwrap();
    assert!(editor.engine().element().playing);
    element_events.time_update(12.0);
    editor.pump();
    assert!(editor.playback().is_playing);
    element_events.time_update(29.6);
    editor.pump();
    assert!(!editor.playback().is_playing);
    assert!(!editor.engine().element().playing);
}

// === Polled remote SDK ===

#[derive(Clone, Default)]
struct SharedSdk(Rc<RefCell<Option<RemoteState>>>);

impl RemotePlayer for SharedSdk {
    fn load_track(&mut self, _uri: &str) -> Result<(), EngineError> {
        *self.0.borrow_mut() = Some(RemoteState {
            position_ms: 0,
            duration_ms: 213_000,
            paused: true,
        });
        Ok(())
    }

    fn resume(&mut self) -> Result<(), EngineError> {
        if let Some(state) = self.0.borrow_mut().as_mut() {
            state.paused = false;
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<(), EngineError> {
        if let Some(state) = self.0.borrow_mut().as_mut() {
            state.paused = true;
        }
        Ok(())
    }

    fn seek(&mut self, position_ms: Millis) -> Result<(), EngineError> {
        if let Some(state) = self.0.borrow_mut().as_mut() {
            state.position_ms = position_ms;
        }
        Ok(())
    }

    fn set_volume(&mut self, _volume: f32) -> Result<(), EngineError> {
        Ok(())
    }

    fn current_state(&mut self) -> Result<Option<RemoteState>, EngineError> {
        Ok(*self.0.borrow())
    }
}

#[test]
fn test_polled_sdk_session() {
    init_logging();
    let sdk = SharedSdk::default();
    let remote = sdk.0.clone();
    let (tx, rx) = event_channel();
    let engine = PolledEngine::new(sdk, tx, Duration::from_millis(5));
    let mut editor = ClipEditor::new(EditorConfig::default(), engine, rx).unwrap();

    editor.select_track(Track::full("t1", "spotify:track:t1")).unwrap();
    editor.preview_clip().unwrap();
    assert!(editor.engine().is_polling());

    std::thread::sleep(Duration::from_millis(20));
    editor.pump();
    assert_eq!(editor.window().duration_ms(), Some(213_000));
    assert_eq!(editor.window().end_ms(), 30_000);
    assert!(editor.playback().is_playing);

    // the SDK plays on past the end marker
    remote.borrow_mut().as_mut().unwrap().position_ms = 30_500;
    std::thread::sleep(Duration::from_millis(20));
    editor.pump();
    assert!(!editor.playback().is_playing);
    assert!(!editor.engine().is_polling());
    assert!(remote.borrow().unwrap().paused);
}
