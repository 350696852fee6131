//! Clip-window selection and playback synchronization for the song guessing
//! backoffice.
//!
//! An administrator picks a track, drags (or types) a fixed-length clip
//! window over it, previews the excerpt and saves the window as the
//! `startCut`/`stopCut` pair of a dataset row. [`ClipEditor`] is the entry
//! point; it owns the [`ClipWindow`], the timeline gesture state and a
//! [`PlaybackEngine`] (either a polled remote SDK or a local preview element).

pub mod core;
pub mod editor;
pub mod error;
pub mod playback;
pub mod ui;

pub use crate::core::{ClipChange, ClipCut, ClipWindow, EditorConfig, Marker, Millis};
pub use editor::ClipEditor;
pub use error::EditorError;
pub use playback::{PlaybackEngine, Track};
