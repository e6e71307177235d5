//! Frame-level render plumbing.
//!
//! Backends record into a [`RenderTarget`] borrowed from the frame the
//! runtime acquired; the runtime submits and presents afterwards.

mod ctx;

pub use ctx::RenderTarget;
