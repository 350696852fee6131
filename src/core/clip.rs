//! Clip window: the fixed-length excerpt of a track used in the game.
//!
//! The start and end markers always sit exactly `clip_length_ms` apart. When
//! the track turns out to be shorter than one clip, the window collapses to
//! the whole track (`[0, duration]`) and marker moves keep it there.

use crate::core::cut::{ClipChange, ClipCut};
use crate::core::time::{self, Millis};

/// Which marker a gesture or edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Start,
    End,
}

/// The selected excerpt of a track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipWindow {
    start_ms: Millis,
    end_ms: Millis,
    clip_length_ms: Millis,
    /// Known track length; `None` until the engine reports one
    duration_ms: Option<Millis>,
}

impl ClipWindow {
    /// Create a window at the start of a track of unknown length
    pub fn new(clip_length_ms: Millis) -> Self {
        Self {
            start_ms: 0,
            end_ms: clip_length_ms,
            clip_length_ms,
            duration_ms: None,
        }
    }

    /// Restore a window from a persisted record.
    ///
    /// The start offset is authoritative and the end is re-derived from it.
    /// A row with only a stop offset is placed one clip length before it; with
    /// neither, the default window is used.
    pub fn from_cut(cut: &ClipCut, clip_length_ms: Millis) -> Self {
        let mut window = Self::new(clip_length_ms);
        match (cut.start_ms(), cut.stop_ms()) {
            (Some(start), stop) => {
                window.set_start_unclamped(start);
                if let Some(stop) = stop.filter(|stop| *stop != window.end_ms) {
                    log::warn!(
                        "persisted stopCut {} ms disagrees with startCut; using {} ms",
                        stop,
                        window.end_ms
                    );
                }
            }
            (None, Some(stop)) => {
                window.set_start_unclamped(stop.saturating_sub(clip_length_ms));
                log::warn!(
                    "persisted row has no startCut; deriving {} ms .. {} ms from stopCut",
                    window.start_ms,
                    window.end_ms
                );
            }
            (None, None) => {}
        }
        window
    }

    pub fn start_ms(&self) -> Millis {
        self.start_ms
    }

    pub fn end_ms(&self) -> Millis {
        self.end_ms
    }

    pub fn clip_length_ms(&self) -> Millis {
        self.clip_length_ms
    }

    pub fn duration_ms(&self) -> Option<Millis> {
        self.duration_ms
    }

    /// Distance between the markers
    pub fn span_ms(&self) -> Millis {
        self.end_ms - self.start_ms
    }

    /// True when the known track is shorter than one clip
    pub fn is_collapsed(&self) -> bool {
        self.duration_ms
            .map_or(false, |duration| duration < self.clip_length_ms)
    }

    /// Check whether a playback position lies inside the window
    pub fn contains(&self, position: Millis) -> bool {
        position >= self.start_ms && position <= self.end_ms
    }

    /// Return both markers to the top of the track and forget the duration
    pub fn reset(&mut self) {
        self.start_ms = 0;
        self.end_ms = self.clip_length_ms;
        self.duration_ms = None;
    }

    /// Initial window for a freshly selected track whose length just arrived
    pub fn reset_for_duration(&mut self, duration_ms: Millis) {
        self.start_ms = 0;
        if duration_ms > 0 {
            self.duration_ms = Some(duration_ms);
            self.end_ms = self.clip_length_ms.min(duration_ms);
        } else {
            self.duration_ms = None;
            self.end_ms = self.clip_length_ms;
        }
    }

    /// Record the track length and pull the window inside it.
    ///
    /// Zero or negative durations mean "unknown" and leave the markers alone.
    pub fn set_duration(&mut self, duration_ms: Millis) {
        if duration_ms <= 0 {
            self.duration_ms = None;
            return;
        }

        self.duration_ms = Some(duration_ms);
        // re-open a window collapsed against an earlier, shorter duration
        if self.span_ms() < self.clip_length_ms {
            self.end_ms = self.start_ms.saturating_add(self.clip_length_ms);
        }
        if self.end_ms > duration_ms {
            self.end_ms = duration_ms;
            self.start_ms = (self.end_ms - self.clip_length_ms).max(0);
        }
        self.debug_check();
    }

    /// Move the start marker; the end marker follows one clip length later.
    ///
    /// Clamped to `[0, duration - clip_length]`, the upper bound applying only
    /// once the duration is known.
    pub fn move_start(&mut self, candidate_ms: Millis) {
        if self.collapse_if_short() {
            return;
        }

        let mut start = candidate_ms.clamp(0, self.latest_start());
        if let Some(duration) = self.duration_ms {
            start = start.min(duration - self.clip_length_ms);
        }
        self.start_ms = start;
        self.end_ms = start + self.clip_length_ms;
        self.debug_check();
    }

    /// Move the end marker; the start marker follows one clip length earlier.
    ///
    /// Clamped to `[clip_length, duration]`, the upper bound applying only
    /// once the duration is known.
    pub fn move_end(&mut self, candidate_ms: Millis) {
        if self.collapse_if_short() {
            return;
        }

        let mut end = candidate_ms.max(self.clip_length_ms);
        if let Some(duration) = self.duration_ms {
            end = end.min(duration);
        }
        self.end_ms = end;
        self.start_ms = end - self.clip_length_ms;
        self.debug_check();
    }

    /// Route a time to whichever marker is being moved
    pub fn move_marker(&mut self, marker: Marker, candidate_ms: Millis) {
        match marker {
            Marker::Start => self.move_start(candidate_ms),
            Marker::End => self.move_end(candidate_ms),
        }
    }

    /// Apply a typed start time in seconds.
    ///
    /// Only non-negativity is enforced; the end lands at `start + clip_length`
    /// even past the known duration. Drags clamp, typed values do not.
    pub fn set_from_manual_start(&mut self, seconds: i64) {
        self.set_start_unclamped(time::from_seconds(seconds));
    }

    /// Apply the raw text of the start field.
    ///
    /// Empty text resets the markers to `0` / `clip_length`.
    pub fn set_from_manual_text(&mut self, text: &str) {
        if text.is_empty() {
            self.start_ms = 0;
            self.end_ms = self.clip_length_ms;
            return;
        }
        self.set_from_manual_start(time::parse_time_input(text));
    }

    /// Text shown in the editable start field
    pub fn start_text(&self) -> String {
        time::format_compact_time(time::to_secs_f64(self.start_ms))
    }

    /// Text shown in the read-only end field
    pub fn end_text(&self) -> String {
        time::format_compact_time(time::to_secs_f64(self.end_ms))
    }

    pub fn start_percent(&self) -> f32 {
        time::percent_of(self.start_ms, self.duration_ms.unwrap_or(0))
    }

    pub fn end_percent(&self) -> f32 {
        time::percent_of(self.end_ms, self.duration_ms.unwrap_or(0))
    }

    /// Width of the highlighted clip region
    pub fn width_percent(&self) -> f32 {
        time::percent_of(self.span_ms(), self.duration_ms.unwrap_or(0))
    }

    pub fn to_cut(&self) -> ClipCut {
        ClipCut::from_millis(self.start_ms, self.end_ms)
    }

    pub fn change(&self) -> ClipChange {
        ClipChange::new(self.start_ms, self.end_ms)
    }

    fn set_start_unclamped(&mut self, start_ms: Millis) {
        self.start_ms = start_ms.clamp(0, self.latest_start());
        self.end_ms = self.start_ms + self.clip_length_ms;
    }

    /// Largest start whose end marker is still representable
    fn latest_start(&self) -> Millis {
        Millis::MAX.saturating_sub(self.clip_length_ms).max(0)
    }

    fn collapse_if_short(&mut self) -> bool {
        match self.duration_ms {
            Some(duration) if duration < self.clip_length_ms => {
                self.start_ms = 0;
                self.end_ms = duration;
                true
            }
            _ => false,
        }
    }

    fn debug_check(&self) {
        debug_assert!(self.start_ms >= 0, "start marker below zero");
        if let Some(duration) = self.duration_ms {
            debug_assert!(self.end_ms <= duration, "end marker past the track");
        }
        if !self.is_collapsed() {
            debug_assert_eq!(self.span_ms(), self.clip_length_ms, "marker gap drifted");
        }
    }
}
