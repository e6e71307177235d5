use crate::view::WheelRotation;

use super::{InputEvent, InputState, Key, KeyState, MouseButton, MouseButtonState};

/// Viewer-level meaning of one input event.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Gesture {
    /// Left button went down at `(x, y)`.
    Press { x: f32, y: f32 },
    /// Pointer moved to `(x, y)` with the left button held.
    Drag { x: f32, y: f32 },
    /// One wheel notch at `(x, y)`; `modifier` is the control key.
    Wheel {
        rotation: WheelRotation,
        modifier: bool,
        x: f32,
        y: f32,
    },
    /// Escape was pressed.
    Quit,
}

impl Gesture {
    /// Classifies `ev`. `state` must already include `ev`.
    pub fn classify(state: &InputState, ev: &InputEvent) -> Option<Gesture> {
        match ev {
            InputEvent::PointerButton(b)
                if b.button == MouseButton::Left && b.state == MouseButtonState::Pressed =>
            {
                Some(Gesture::Press { x: b.x, y: b.y })
            }

            InputEvent::PointerMoved { x, y } if state.button_down(MouseButton::Left) => {
                Some(Gesture::Drag { x: *x, y: *y })
            }

            InputEvent::MouseWheel { delta, modifiers } => {
                let rotation = WheelRotation::from_delta(delta.vertical())?;
                let (x, y) = state.pointer_pos.unwrap_or((0.0, 0.0));
                Some(Gesture::Wheel {
                    rotation,
                    modifier: modifiers.ctrl,
                    x,
                    y,
                })
            }

            InputEvent::Key {
                key: Key::Escape,
                state: KeyState::Pressed,
                repeat: false,
                ..
            } => Some(Gesture::Quit),

            _ => None,
        }
    }
}
