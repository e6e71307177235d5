use glam::{Mat4, Vec3, Vec4};

use crate::coords::Viewport;
use crate::gfx::FramebufferOrigin;

/// Pixel → plane transform, split into window normalization and user pan/zoom.
///
/// `compose()` is `window_scale * user * window_translate`:
/// 1. `window_translate` moves the window centre to the origin,
/// 2. `user` applies accumulated pan/zoom in that centred space,
/// 3. `window_scale` divides by half the short side so the shorter axis spans
///    `[-1, 1]` regardless of aspect ratio.
///
/// The composed matrix is never stored; it is rebuilt from the three factors on
/// every call.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewTransform {
    viewport: Viewport,
    side: f32,
    window_scale: Mat4,
    window_translate: Mat4,
    user: Mat4,
}

impl ViewTransform {
    pub fn new(width: f32, height: f32) -> Self {
        let mut vt = Self {
            viewport: Viewport::default(),
            side: 1.0,
            window_scale: Mat4::IDENTITY,
            window_translate: Mat4::IDENTITY,
            user: Mat4::IDENTITY,
        };
        vt.on_resize(width, height);
        vt
    }

    /// Recomputes the window factors. User pan/zoom is untouched.
    ///
    /// `side` is clamped to at least one pixel so degenerate sizes never divide
    /// by zero.
    pub fn on_resize(&mut self, width: f32, height: f32) {
        let width = sanitize(width);
        let height = sanitize(height);

        self.viewport = Viewport::new(width, height);
        self.side = (self.viewport.shorter_side() / 2.0).max(1.0);

        let inv = 1.0 / self.side;
        self.window_scale = Mat4::from_scale(Vec3::new(inv, inv, 1.0));
        self.window_translate = Mat4::from_translation(Vec3::new(-width / 2.0, -height / 2.0, 0.0));
    }

    /// Accumulates a drag of `(dx, dy)` screen pixels (+Y down).
    ///
    /// Applied on the view side of the user transform, so the plane follows the
    /// pointer one-to-one at any zoom level.
    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.user *= Mat4::from_translation(Vec3::new(-dx, dy, 0.0));
    }

    /// Magnifies by `factor` about `(cx, cy)` in centred view coordinates (+Y up).
    ///
    /// `factor > 1` zooms in and the plane point under the anchor stays put.
    ///
    /// The scale multiplied into the user matrix is the reciprocal, `1 / factor`:
    /// this matrix maps screen to plane, so showing the plane `factor` times
    /// larger means each pixel covers `1 / factor` as much of it.
    pub fn zoom_at(&mut self, cx: f32, cy: f32, factor: f32) {
        if !factor.is_finite() || factor <= 0.0 {
            log::warn!("ignoring zoom with invalid factor {factor}");
            return;
        }

        let anchor = Vec3::new(cx, cy, 0.0);
        let inv = 1.0 / factor;
        self.user *= Mat4::from_translation(anchor)
            * Mat4::from_scale(Vec3::new(inv, inv, 1.0))
            * Mat4::from_translation(-anchor);
    }

    /// Final transform for GL-style pixel input.
    pub fn compose(&self) -> Mat4 {
        self.window_scale * self.user * self.window_translate
    }

    /// Final transform for a backend whose fragment coordinates use `origin`.
    ///
    /// Top-left framebuffers get a `y → height - y` flip ahead of `compose()`.
    pub fn compose_for(&self, origin: FramebufferOrigin) -> Mat4 {
        match origin {
            FramebufferOrigin::BottomLeft => self.compose(),
            FramebufferOrigin::TopLeft => {
                let flip = Mat4::from_translation(Vec3::new(0.0, self.viewport.height, 0.0))
                    * Mat4::from_scale(Vec3::new(1.0, -1.0, 1.0));
                self.compose() * flip
            }
        }
    }

    /// Converts a pointer position (top-left origin, +Y down) to centred view
    /// coordinates (+Y up).
    pub fn cursor_to_view(&self, x: f32, y: f32) -> (f32, f32) {
        let (cx, cy) = self.viewport.center();
        (x - cx, cy - y)
    }

    /// Maps a GL-style pixel position through `compose()`.
    pub fn pixel_to_plane(&self, x: f32, y: f32) -> (f32, f32) {
        let p = self.compose() * Vec4::new(x, y, 0.0, 1.0);
        (p.x, p.y)
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn side(&self) -> f32 {
        self.side
    }

    pub fn window_scale(&self) -> Mat4 {
        self.window_scale
    }

    pub fn window_translate(&self) -> Mat4 {
        self.window_translate
    }

    pub fn user_transform(&self) -> Mat4 {
        self.user
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

fn sanitize(v: f32) -> f32 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn close(a: (f32, f32), b: (f32, f32)) -> bool {
        (a.0 - b.0).abs() < EPS && (a.1 - b.1).abs() < EPS
    }

    // ── on_resize ─────────────────────────────────────────────────────────

    #[test]
    fn square_window_factors() {
        let vt = ViewTransform::new(800.0, 800.0);

        assert_eq!(vt.side(), 400.0);
        assert_eq!(
            vt.window_scale(),
            Mat4::from_diagonal(Vec4::new(1.0 / 400.0, 1.0 / 400.0, 1.0, 1.0))
        );
        assert_eq!(
            vt.window_translate(),
            Mat4::from_translation(Vec3::new(-400.0, -400.0, 0.0))
        );
    }

    #[test]
    fn side_uses_shorter_axis() {
        assert_eq!(ViewTransform::new(1280.0, 720.0).side(), 360.0);
        assert_eq!(ViewTransform::new(300.0, 900.0).side(), 150.0);
    }

    #[test]
    fn degenerate_sizes_clamp_side() {
        for (w, h) in [(0.0, 0.0), (1.0, 1.0), (0.0, 500.0), (1.0, 1000.0), (f32::NAN, 10.0)] {
            let vt = ViewTransform::new(w, h);
            assert_eq!(vt.side(), 1.0, "size {w}x{h}");
            assert!(vt.compose().is_finite());
        }
    }

    #[test]
    fn resize_keeps_user_transform() {
        let mut vt = ViewTransform::new(800.0, 600.0);
        vt.pan(10.0, 5.0);
        let user = vt.user_transform();

        vt.on_resize(400.0, 400.0);
        assert_eq!(vt.user_transform(), user);
    }

    #[test]
    fn window_centre_maps_to_origin() {
        let vt = ViewTransform::new(1024.0, 768.0);
        assert!(close(vt.pixel_to_plane(512.0, 384.0), (0.0, 0.0)));
        // Half the short side away from centre is one plane unit.
        assert!(close(vt.pixel_to_plane(512.0, 384.0 + 384.0), (0.0, 1.0)));
    }

    // ── compose ───────────────────────────────────────────────────────────

    #[test]
    fn compose_is_pure() {
        let mut vt = ViewTransform::new(640.0, 480.0);
        vt.pan(3.0, -7.0);
        vt.zoom_at(12.0, 40.0, 1.1);

        let a = vt.compose();
        let b = vt.compose();
        assert_eq!(a.to_cols_array(), b.to_cols_array());
    }

    #[test]
    fn top_left_origin_flips_rows() {
        let mut vt = ViewTransform::new(800.0, 600.0);
        vt.zoom_at(50.0, -20.0, 1.7);

        let gl = vt.compose() * Vec4::new(123.0, 600.0 - 45.0, 0.0, 1.0);
        let tl = vt.compose_for(FramebufferOrigin::TopLeft) * Vec4::new(123.0, 45.0, 0.0, 1.0);
        assert!((gl - tl).abs().max_element() < EPS);
        assert_eq!(vt.compose_for(FramebufferOrigin::BottomLeft), vt.compose());
    }

    // ── zoom ──────────────────────────────────────────────────────────────

    #[test]
    fn zoom_at_origin_keeps_window_centre() {
        let mut vt = ViewTransform::new(800.0, 800.0);
        let before = vt.compose() * Vec4::new(400.0, 400.0, 0.0, 1.0);

        vt.zoom_at(0.0, 0.0, 1.1);
        let after = vt.compose() * Vec4::new(400.0, 400.0, 0.0, 1.0);

        assert!((before - after).abs().max_element() < EPS);
    }

    #[test]
    fn zoom_keeps_point_under_cursor() {
        let mut vt = ViewTransform::new(800.0, 600.0);
        vt.pan(-35.0, 12.0);

        // Pointer at (600, 200) in window pixels.
        let (cx, cy) = vt.cursor_to_view(600.0, 200.0);
        let gl_pixel = (600.0, 600.0 - 200.0);
        let before = vt.pixel_to_plane(gl_pixel.0, gl_pixel.1);

        vt.zoom_at(cx, cy, 1.1);
        vt.zoom_at(cx, cy, 1.1);

        assert!(close(vt.pixel_to_plane(gl_pixel.0, gl_pixel.1), before));
    }

    #[test]
    fn zoom_in_shrinks_visible_extent() {
        let mut vt = ViewTransform::new(800.0, 800.0);
        vt.zoom_at(0.0, 0.0, 2.0);
        assert!(close(vt.pixel_to_plane(800.0, 400.0), (0.5, 0.0)));
    }

    #[test]
    fn zoom_then_inverse_restores_user_transform() {
        let mut vt = ViewTransform::new(800.0, 600.0);
        vt.pan(20.0, 30.0);
        let before = vt.user_transform();

        vt.zoom_at(-120.0, 75.0, 1.1);
        vt.zoom_at(-120.0, 75.0, 1.0 / 1.1);

        assert!(vt.user_transform().abs_diff_eq(before, EPS));
    }

    #[test]
    fn invalid_zoom_factor_is_ignored() {
        let mut vt = ViewTransform::new(800.0, 600.0);
        for f in [0.0, -1.0, f32::INFINITY, f32::NAN] {
            vt.zoom_at(1.0, 1.0, f);
        }
        assert_eq!(vt.user_transform(), Mat4::IDENTITY);
    }

    // ── pan ───────────────────────────────────────────────────────────────

    #[test]
    fn pan_moves_plane_with_pointer() {
        let mut vt = ViewTransform::new(800.0, 800.0);
        vt.zoom_at(0.0, 0.0, 3.0);
        let under = vt.pixel_to_plane(500.0, 500.0);

        // Drag right 40px and down 25px (screen); in GL pixels the row goes down.
        vt.pan(40.0, 25.0);
        assert!(close(vt.pixel_to_plane(540.0, 475.0), under));
    }

    #[test]
    fn zoom_in_scales_user_matrix_by_reciprocal() {
        let mut vt = ViewTransform::new(800.0, 800.0);
        vt.zoom_at(0.0, 0.0, 4.0);

        let m = vt.user_transform();
        assert_eq!(m.x_axis.x, 0.25);
        assert_eq!(m.y_axis.y, 0.25);
        assert_eq!(m.z_axis.z, 1.0);
    }
}
