//! Pointer-facing pieces of the clip editor.
//! Rendering stays with the host; this module only interprets gestures.

pub mod timeline_view;

pub use timeline_view::{DragState, NoCapture, PointerCapture, TimelineView};
