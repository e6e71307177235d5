use super::ViewTransform;

/// Direction of one wheel notch.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum WheelRotation {
    Up,
    Down,
}

impl WheelRotation {
    /// Sign of a vertical wheel delta; `None` for zero or non-finite input.
    pub fn from_delta(dy: f32) -> Option<Self> {
        if !dy.is_finite() || dy == 0.0 {
            None
        } else if dy > 0.0 {
            Some(WheelRotation::Up)
        } else {
            Some(WheelRotation::Down)
        }
    }
}

/// Which wheel direction magnifies.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum WheelZoom {
    #[default]
    UpZoomsIn,
    UpZoomsOut,
}

/// Pointer policy knobs.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct InteractionConfig {
    /// Magnification per zoom-in notch (> 1).
    pub scale_up_factor: f32,
    /// Magnification per zoom-out notch (in `(0, 1)`).
    pub scale_down_factor: f32,
    pub start_iteration: u32,
    /// Floor for the iteration count; never below 1.
    pub min_iteration: u32,
    pub wheel_zoom: WheelZoom,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            scale_up_factor: 1.1,
            scale_down_factor: 0.9,
            start_iteration: 360,
            min_iteration: 1,
            wheel_zoom: WheelZoom::UpZoomsIn,
        }
    }
}

/// Turns raw pointer events into view edits and iteration-count changes.
///
/// Single-threaded: events are applied synchronously before the next frame
/// reads `view().compose()`.
#[derive(Debug, Clone)]
pub struct InteractionController {
    view: ViewTransform,
    config: InteractionConfig,
    last_cursor: (f32, f32),
    max_iteration: u32,
}

impl InteractionController {
    pub fn new(view: ViewTransform, config: InteractionConfig) -> Self {
        let min_iteration = config.min_iteration.max(1);
        Self {
            view,
            config: InteractionConfig {
                min_iteration,
                ..config
            },
            last_cursor: (0.0, 0.0),
            max_iteration: config.start_iteration.max(min_iteration),
        }
    }

    pub fn on_resize(&mut self, width: f32, height: f32) {
        self.view.on_resize(width, height);
    }

    /// Starts a drag at `(x, y)` (window pixels, +Y down).
    pub fn on_press(&mut self, x: f32, y: f32) {
        self.last_cursor = (x, y);
    }

    /// Pans by the motion since the previous press/drag position.
    pub fn on_drag(&mut self, x: f32, y: f32) {
        let (lx, ly) = self.last_cursor;
        let (dx, dy) = (x - lx, y - ly);
        self.last_cursor = (x, y);

        if dx != 0.0 || dy != 0.0 {
            self.view.pan(dx, dy);
        }
    }

    /// One wheel notch at `(x, y)`.
    ///
    /// With the modifier held it steps the iteration count (floored at
    /// `min_iteration`); otherwise it zooms about the pointer.
    pub fn on_wheel(&mut self, rotation: WheelRotation, modifier_down: bool, x: f32, y: f32) {
        if modifier_down {
            self.max_iteration = match rotation {
                WheelRotation::Up => self.max_iteration.saturating_add(1),
                WheelRotation::Down => self
                    .max_iteration
                    .saturating_sub(1)
                    .max(self.config.min_iteration),
            };
            log::debug!("max iteration -> {}", self.max_iteration);
            return;
        }

        let zoom_in = match (self.config.wheel_zoom, rotation) {
            (WheelZoom::UpZoomsIn, WheelRotation::Up) | (WheelZoom::UpZoomsOut, WheelRotation::Down) => true,
            _ => false,
        };
        let factor = if zoom_in {
            self.config.scale_up_factor
        } else {
            self.config.scale_down_factor
        };

        let (cx, cy) = self.view.cursor_to_view(x, y);
        self.view.zoom_at(cx, cy, factor);
    }

    pub fn max_iteration(&self) -> u32 {
        self.max_iteration
    }

    pub fn last_cursor(&self) -> (f32, f32) {
        self.last_cursor
    }

    pub fn view(&self) -> &ViewTransform {
        &self.view
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use glam::Mat4;

    use super::*;

    fn controller() -> InteractionController {
        InteractionController::new(ViewTransform::new(800.0, 800.0), InteractionConfig::default())
    }

    // ── iteration count ───────────────────────────────────────────────────

    #[test]
    fn starts_at_configured_iteration() {
        assert_eq!(controller().max_iteration(), 360);
    }

    #[test]
    fn modifier_wheel_up_increments_by_one() {
        let mut c = controller();
        for i in 1..=5 {
            c.on_wheel(WheelRotation::Up, true, 10.0, 10.0);
            assert_eq!(c.max_iteration(), 360 + i);
        }
        // Iteration edits leave the view alone.
        assert_eq!(c.view().user_transform(), Mat4::IDENTITY);
    }

    #[test]
    fn modifier_wheel_down_floors_at_one() {
        let config = InteractionConfig {
            start_iteration: 3,
            ..Default::default()
        };
        let mut c = InteractionController::new(ViewTransform::new(800.0, 800.0), config);

        for _ in 0..10 {
            c.on_wheel(WheelRotation::Down, true, 0.0, 0.0);
        }
        assert_eq!(c.max_iteration(), 1);
    }

    #[test]
    fn zero_min_iteration_is_raised_to_one() {
        let config = InteractionConfig {
            start_iteration: 0,
            min_iteration: 0,
            ..Default::default()
        };
        let mut c = InteractionController::new(ViewTransform::new(10.0, 10.0), config);
        assert_eq!(c.max_iteration(), 1);

        c.on_wheel(WheelRotation::Down, true, 0.0, 0.0);
        assert_eq!(c.max_iteration(), 1);
    }

    // ── drag ──────────────────────────────────────────────────────────────

    #[test]
    fn drag_pans_by_delta_from_anchor() {
        let mut c = controller();
        c.on_press(100.0, 100.0);
        c.on_drag(130.0, 90.0);

        let mut expected = ViewTransform::new(800.0, 800.0);
        expected.pan(30.0, -10.0);
        assert_eq!(c.view().user_transform(), expected.user_transform());
        assert_eq!(c.last_cursor(), (130.0, 90.0));
    }

    #[test]
    fn consecutive_drags_accumulate() {
        let mut c = controller();
        c.on_press(0.0, 0.0);
        c.on_drag(10.0, 0.0);
        c.on_drag(25.0, 5.0);

        let mut expected = ViewTransform::new(800.0, 800.0);
        expected.pan(25.0, 5.0);
        assert!(c.view().user_transform().abs_diff_eq(expected.user_transform(), 1e-5));
    }

    #[test]
    fn new_press_resets_anchor() {
        let mut c = controller();
        c.on_press(0.0, 0.0);
        c.on_drag(50.0, 50.0);
        c.on_press(400.0, 400.0);
        c.on_drag(400.0, 400.0);

        let mut expected = ViewTransform::new(800.0, 800.0);
        expected.pan(50.0, 50.0);
        assert_eq!(c.view().user_transform(), expected.user_transform());
    }

    // ── zoom ──────────────────────────────────────────────────────────────

    #[test]
    fn wheel_up_zooms_in_about_pointer() {
        let mut c = controller();
        let gl = (600.0, 800.0 - 150.0);
        let before = c.view().pixel_to_plane(gl.0, gl.1);

        c.on_wheel(WheelRotation::Up, false, 600.0, 150.0);

        let mut expected = ViewTransform::new(800.0, 800.0);
        expected.zoom_at(200.0, 250.0, 1.1);
        assert_eq!(c.view().user_transform(), expected.user_transform());

        let after = c.view().pixel_to_plane(gl.0, gl.1);
        assert!((before.0 - after.0).abs() < 1e-5 && (before.1 - after.1).abs() < 1e-5);
    }

    #[test]
    fn wheel_down_zooms_out() {
        let mut c = controller();
        c.on_wheel(WheelRotation::Down, false, 400.0, 400.0);

        let mut expected = ViewTransform::new(800.0, 800.0);
        expected.zoom_at(0.0, 0.0, 0.9);
        assert_eq!(c.view().user_transform(), expected.user_transform());
    }

    #[test]
    fn inverted_wheel_mapping() {
        let config = InteractionConfig {
            wheel_zoom: WheelZoom::UpZoomsOut,
            ..Default::default()
        };
        let mut c = InteractionController::new(ViewTransform::new(800.0, 800.0), config);
        c.on_wheel(WheelRotation::Up, false, 400.0, 400.0);

        let mut expected = ViewTransform::new(800.0, 800.0);
        expected.zoom_at(0.0, 0.0, 0.9);
        assert_eq!(c.view().user_transform(), expected.user_transform());
    }

    #[test]
    fn resize_forwards_to_view() {
        let mut c = controller();
        c.on_resize(200.0, 100.0);
        assert_eq!(c.view().side(), 50.0);
    }

    #[test]
    fn rotation_from_delta() {
        assert_eq!(WheelRotation::from_delta(1.0), Some(WheelRotation::Up));
        assert_eq!(WheelRotation::from_delta(-0.25), Some(WheelRotation::Down));
        assert_eq!(WheelRotation::from_delta(0.0), None);
        assert_eq!(WheelRotation::from_delta(f32::NAN), None);
    }
}
