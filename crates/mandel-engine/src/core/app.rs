use crate::gfx::GraphicsContext;
use crate::view::WheelRotation;

use super::ctx::FrameCtx;

/// Control directive returned by handler callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract driven by the runtime.
///
/// Sizes and positions are framebuffer pixels; pointer positions use a
/// top-left origin with +Y down. Callbacks run on the event-loop thread, one at
/// a time.
pub trait Handler {
    /// Called once after the graphics context exists and before the first
    /// frame. An error aborts startup.
    fn on_init(&mut self, gfx: &mut dyn GraphicsContext, width: f32, height: f32) -> anyhow::Result<()>;

    fn on_resize(&mut self, width: f32, height: f32) {
        let _ = (width, height);
    }

    /// Left button pressed.
    fn on_press(&mut self, x: f32, y: f32) {
        let _ = (x, y);
    }

    /// Pointer moved with the left button held.
    fn on_drag(&mut self, x: f32, y: f32) {
        let _ = (x, y);
    }

    /// One wheel notch; `modifier_down` is the control key.
    fn on_wheel(&mut self, rotation: WheelRotation, modifier_down: bool, x: f32, y: f32) {
        let _ = (rotation, modifier_down, x, y);
    }

    /// Called once per scheduled frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl;

    /// Called exactly once before the runtime exits, while the graphics
    /// context is still alive.
    fn on_dispose(&mut self, gfx: &mut dyn GraphicsContext) {
        let _ = gfx;
    }
}
