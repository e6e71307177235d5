//! Window-space sizes shared by the view transform and runtime.
//!
//! Framebuffer pixels; `Viewport` carries only the extent.

mod viewport;

pub use viewport::Viewport;
