//! Records that carry a clip window across the crate boundary.
//!
//! [`ClipCut`] is the shape the persistence layer stores (seconds as text in
//! the `startCut`/`stopCut` columns). [`ClipChange`] is the notification the
//! host receives whenever the window moves.

use serde::{Deserialize, Serialize};
use crate::core::time::{self, Millis};

/// Persisted form of a clip window, seconds as strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipCut {
    #[serde(default)]
    pub start_cut: String,
    #[serde(default)]
    pub stop_cut: String,
}

impl ClipCut {
    /// Build a record from a window given in milliseconds
    pub fn from_millis(start_ms: Millis, end_ms: Millis) -> Self {
        Self {
            start_cut: seconds_text(start_ms),
            stop_cut: seconds_text(end_ms),
        }
    }

    /// Start offset in milliseconds, `None` when blank or not a number
    pub fn start_ms(&self) -> Option<Millis> {
        parse_seconds(&self.start_cut)
    }

    /// Stop offset in milliseconds, `None` when blank or not a number
    pub fn stop_ms(&self) -> Option<Millis> {
        parse_seconds(&self.stop_cut)
    }
}

/// Snapshot published to the host after the window changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClipChange {
    pub start_time_sec: f64,
    pub end_time_sec: f64,
    pub start_time_ms: Millis,
    pub end_time_ms: Millis,
}

impl ClipChange {
    pub fn new(start_ms: Millis, end_ms: Millis) -> Self {
        Self {
            start_time_sec: time::to_secs_f64(start_ms),
            end_time_sec: time::to_secs_f64(end_ms),
            start_time_ms: start_ms,
            end_time_ms: end_ms,
        }
    }

    /// The persisted record for this window
    pub fn to_cut(&self) -> ClipCut {
        ClipCut::from_millis(self.start_time_ms, self.end_time_ms)
    }
}

/// Whole seconds print without a fraction ("150"), others keep it ("12.345").
fn seconds_text(millis: Millis) -> String {
    if millis % time::constants::MILLIS_PER_SECOND == 0 {
        time::to_seconds(millis).to_string()
    } else {
        time::to_secs_f64(millis).to_string()
    }
}

fn parse_seconds(text: &str) -> Option<Millis> {
    let seconds = text.trim().parse::<f64>().ok()?;
    seconds.is_finite().then(|| time::from_secs_f64(seconds))
}
