//! Time representation and text conversions for clip editing.
//!
//! All clip-window state is kept in whole milliseconds (i64). Seconds only
//! appear at the edges: text fields, the preview audio clock (f64 seconds)
//! and the persisted `startCut`/`stopCut` columns.

/// Time in milliseconds since the start of the track
pub type Millis = i64;

/// Time constants for conversions
pub mod constants {
    use super::Millis;

    pub const MILLIS_PER_SECOND: Millis = 1_000;
    pub const SECONDS_PER_MINUTE: i64 = 60;
}

/// Time zero constant
pub const ZERO: Millis = 0;

/// Unit of a raw time value handed to [`format_clock_time`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millis,
    Seconds,
}

/// Convert whole seconds to milliseconds, saturating at the `Millis` range
#[inline]
pub fn from_seconds(seconds: i64) -> Millis {
    seconds.saturating_mul(constants::MILLIS_PER_SECOND)
}

/// Convert milliseconds to whole seconds (floored)
#[inline]
pub fn to_seconds(millis: Millis) -> i64 {
    millis.div_euclid(constants::MILLIS_PER_SECOND)
}

/// Convert fractional seconds (audio element clock) to milliseconds, rounded
#[inline]
pub fn from_secs_f64(seconds: f64) -> Millis {
    if !seconds.is_finite() {
        return ZERO;
    }
    (seconds * constants::MILLIS_PER_SECOND as f64).round() as Millis
}

/// Convert milliseconds to fractional seconds
#[inline]
pub fn to_secs_f64(millis: Millis) -> f64 {
    millis as f64 / constants::MILLIS_PER_SECOND as f64
}

/// Percentage of `part` within `whole`.
///
/// Returns 0.0 when `whole` is zero or negative (unknown duration), so layout
/// code never sees NaN or infinity.
pub fn percent_of(part: Millis, whole: Millis) -> f32 {
    if whole <= 0 {
        return 0.0;
    }
    (part as f64 / whole as f64 * 100.0) as f32
}

/// Format a time as `M:SS`.
///
/// Minutes are not padded, seconds always are. Fractions are dropped and
/// negative values render as zero.
pub fn format_clock_time(value: f64, unit: TimeUnit) -> String {
    let seconds = match unit {
        TimeUnit::Millis => value / constants::MILLIS_PER_SECOND as f64,
        TimeUnit::Seconds => value,
    };
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as i64
    } else {
        0
    };
    clock(total)
}

/// Format seconds for an editable field: bare seconds below one minute,
/// `M:SS` from one minute on. Short clips can then be typed without a colon.
pub fn format_compact_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as i64
    } else {
        0
    };
    if total < constants::SECONDS_PER_MINUTE {
        total.to_string()
    } else {
        clock(total)
    }
}

/// Format a persisted cut value (seconds as text) for an editable field.
///
/// Blank or non-numeric values render as an empty string.
pub fn format_compact_cut(text: &str) -> String {
    match text.trim().parse::<f64>() {
        Ok(seconds) if seconds.is_finite() => format_compact_time(seconds),
        _ => String::new(),
    }
}

/// Parse free-form time input into seconds.
///
/// Accepts `"90"` and `"1:30"`. Never fails: empty or unparseable input
/// yields 0, and each `:`-separated part falls back to 0 on its own.
pub fn parse_time_input(text: &str) -> i64 {
    if text.is_empty() {
        return 0;
    }

    if text.contains(':') {
        let mut parts = text.split(':');
        let minutes = parts.next().map(lenient_int).unwrap_or(0);
        let seconds = parts.next().map(lenient_int).unwrap_or(0);
        return minutes
            .saturating_mul(constants::SECONDS_PER_MINUTE)
            .saturating_add(seconds);
    }

    lenient_int(text)
}

fn clock(total_seconds: i64) -> String {
    let minutes = total_seconds / constants::SECONDS_PER_MINUTE;
    let seconds = total_seconds % constants::SECONDS_PER_MINUTE;
    format!("{}:{:02}", minutes, seconds)
}

/// Leading-integer parse: optional whitespace and sign, then digits.
/// `"12s"` is 12, `"abc"` is 0.
fn lenient_int(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, digits) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let mut value: i64 = 0;
    for byte in digits.bytes() {
        if !byte.is_ascii_digit() {
            break;
        }
        value = value
            .saturating_mul(10)
            .saturating_add(i64::from(byte - b'0'));
    }

    if negative {
        -value
    } else {
        value
    }
}
