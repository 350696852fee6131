//! Core types for clip editing.
//!
//! This module provides the clip window and its invariants, the records that
//! cross the persistence boundary, session configuration and the time
//! representation. All internal time values are milliseconds (i64).

pub mod clip;
pub mod config;
pub mod cut;
pub mod time;

// Re-export core data structures for easier access.
pub use clip::{ClipWindow, Marker};
pub use config::{ConfigError, EditorConfig};
pub use cut::{ClipChange, ClipCut};
pub use time::{Millis, TimeUnit, ZERO};
