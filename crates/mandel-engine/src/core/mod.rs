//! Core engine-facing contracts.
//!
//! The stable interface between the runtime (platform loop) and the
//! application: the [`Handler`] callbacks and the per-frame context.

mod app;
mod ctx;

pub use app::{AppControl, Handler};
pub use ctx::FrameCtx;
