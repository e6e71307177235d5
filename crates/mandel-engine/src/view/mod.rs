//! View math: the pixel → plane transform and the pointer policy that edits it.
//!
//! Convention:
//! - Window pixels are GL-style for the transform input (origin bottom-left, +Y up).
//! - Pointer events arrive in window pixels (origin top-left, +Y down); the
//!   controller converts them to window-centred, +Y-up view coordinates.

mod interaction;
mod transform;

pub use interaction::{InteractionConfig, InteractionController, WheelRotation, WheelZoom};
pub use transform::ViewTransform;
