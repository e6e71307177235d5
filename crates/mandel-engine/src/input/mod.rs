//! Input subsystem.
//!
//! Public API is platform-agnostic and does not expose winit types.
//! `platform` translates winit events into `InputEvent`s; `Gesture` turns
//! those into the pointer/keyboard actions the viewer responds to.

mod gesture;
pub(crate) mod platform;
mod state;
mod types;

pub use gesture::Gesture;
pub use state::InputState;
pub use types::{
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    MouseWheelDelta,
    PointerButtonEvent,
};
