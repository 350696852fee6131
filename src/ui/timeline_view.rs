//! Timeline gestures: marker drags and click-to-seek.
//!
//! The view maps pointer positions over the timeline rectangle to track time
//! and routes them into the clip window. While a marker is being dragged the
//! host's window-wide pointer listeners are held through [`PointerCapture`];
//! they are released on pointer-up, on cancel and when the view is dropped.

use egui::{Pos2, Rect};
use crate::core::clip::{ClipWindow, Marker};
use crate::core::time::Millis;

/// Distance in points within which a press grabs a marker
pub const MARKER_GRAB_RADIUS: f32 = 8.0;

/// Window-level pointer-move/pointer-up listener registration
pub trait PointerCapture {
    fn acquire(&mut self);
    fn release(&mut self);
}

/// For hosts that already route pointer events to the dragged widget
#[derive(Debug, Default, Clone, Copy)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn acquire(&mut self) {}
    fn release(&mut self) {}
}

/// Drag lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    DraggingStart,
    DraggingEnd,
}

impl DragState {
    pub fn active_marker(self) -> Option<Marker> {
        match self {
            DragState::Idle => None,
            DragState::DraggingStart => Some(Marker::Start),
            DragState::DraggingEnd => Some(Marker::End),
        }
    }

    pub fn is_dragging(self) -> bool {
        self != DragState::Idle
    }
}

impl From<Marker> for DragState {
    fn from(marker: Marker) -> Self {
        match marker {
            Marker::Start => DragState::DraggingStart,
            Marker::End => DragState::DraggingEnd,
        }
    }
}

/// Timeline gesture controller
pub struct TimelineView<C: PointerCapture = NoCapture> {
    rect: Rect,
    drag: DragState,
    capture: C,
    captured: bool,
}

impl<C: PointerCapture> TimelineView<C> {
    pub fn new(capture: C) -> Self {
        Self {
            rect: Rect::ZERO,
            drag: DragState::Idle,
            capture,
            captured: false,
        }
    }

    /// Update the on-screen timeline bounds (after layout)
    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn drag_state(&self) -> DragState {
        self.drag
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    /// Fraction of the timeline width left of `x`, clamped to `0.0..=1.0`
    pub fn fraction_at(&self, x: f32) -> f64 {
        let width = self.rect.width();
        if !width.is_finite() || width <= 0.0 {
            return 0.0;
        }
        let offset = (x - self.rect.left()).clamp(0.0, width);
        (offset / width) as f64
    }

    /// Track time under the pointer, floored to whole milliseconds.
    ///
    /// `None` while the track length is unknown.
    pub fn time_at(&self, pos: Pos2, duration_ms: Option<Millis>) -> Option<Millis> {
        let duration = duration_ms.filter(|d| *d > 0)?;
        Some((self.fraction_at(pos.x) * duration as f64).floor() as Millis)
    }

    /// Screen x of a marker
    pub fn marker_x(&self, window: &ClipWindow, marker: Marker) -> f32 {
        let percent = match marker {
            Marker::Start => window.start_percent(),
            Marker::End => window.end_percent(),
        };
        self.rect.left() + self.rect.width() * percent / 100.0
    }

    /// Marker under the pointer, nearest first
    pub fn hit_marker(&self, pos: Pos2, window: &ClipWindow) -> Option<Marker> {
        if !self.rect.expand(MARKER_GRAB_RADIUS).contains(pos) {
            return None;
        }

        let start = (pos.x - self.marker_x(window, Marker::Start)).abs();
        let end = (pos.x - self.marker_x(window, Marker::End)).abs();
        let (marker, distance) = if end < start {
            (Marker::End, end)
        } else {
            (Marker::Start, start)
        };
        (distance <= MARKER_GRAB_RADIUS).then_some(marker)
    }

    /// Pointer pressed on a marker: begin dragging it.
    ///
    /// Ignored while another drag is in progress (single pointer).
    pub fn pointer_down(&mut self, marker: Marker) -> bool {
        if self.is_dragging() {
            return false;
        }
        self.drag = DragState::from(marker);
        if !self.captured {
            self.capture.acquire();
            self.captured = true;
        }
        log::debug!("drag started on {:?} marker", marker);
        true
    }

    /// Pointer moved anywhere: move the dragged marker.
    ///
    /// Returns true when the window changed.
    pub fn pointer_move(&mut self, pos: Pos2, window: &mut ClipWindow) -> bool {
        let Some(marker) = self.drag.active_marker() else {
            return false;
        };
        let Some(time) = self.time_at(pos, window.duration_ms()) else {
            return false;
        };

        let before = (window.start_ms(), window.end_ms());
        window.move_marker(marker, time);
        before != (window.start_ms(), window.end_ms())
    }

    /// Pointer released anywhere: end the drag
    pub fn pointer_up(&mut self) {
        if self.is_dragging() {
            log::debug!("drag ended");
        }
        self.end_drag();
    }

    /// Abandon any drag without a pointer-up (track change, teardown)
    pub fn cancel(&mut self) {
        self.end_drag();
    }

    /// Seek target for a click on the timeline background.
    ///
    /// `None` during a drag, so a drag never doubles as a seek, and while the
    /// track length is unknown.
    pub fn click_target(&self, pos: Pos2, duration_ms: Option<Millis>) -> Option<Millis> {
        if self.is_dragging() {
            return None;
        }
        self.time_at(pos, duration_ms)
    }

    fn end_drag(&mut self) {
        self.drag = DragState::Idle;
        if self.captured {
            self.capture.release();
            self.captured = false;
        }
    }
}

impl Default for TimelineView<NoCapture> {
    fn default() -> Self {
        Self::new(NoCapture)
    }
}

impl<C: PointerCapture> Drop for TimelineView<C> {
    fn drop(&mut self) {
        self.end_drag();
    }
}
