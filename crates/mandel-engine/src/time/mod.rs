//! Time subsystem.
//!
//! One `FrameTicker` per window: the runtime waits for `next_deadline()` and
//! calls `tick()` once per presented frame to obtain `FrameTime`.

mod ticker;

pub use ticker::{FrameTicker, FrameTime};
