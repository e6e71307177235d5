use crate::gfx::GraphicsContext;
use crate::time::FrameTime;

/// Per-frame context passed to [`Handler::on_frame`](super::Handler::on_frame).
///
/// Draw calls made through `gfx` are recorded and flushed into the frame by
/// the runtime after the callback returns.
pub struct FrameCtx<'a> {
    pub gfx: &'a mut dyn GraphicsContext,
    pub time: FrameTime,
    /// Framebuffer size in physical pixels.
    pub size: (f32, f32),
}

impl<'a> FrameCtx<'a> {
    pub fn new(gfx: &'a mut dyn GraphicsContext, time: FrameTime, size: (f32, f32)) -> Self {
        Self { gfx, time, size }
    }
}
