use anyhow::bail;

use mandel_engine::core::{AppControl, FrameCtx, Handler};
use mandel_engine::gfx::{GraphicsContext, QUAD_INDEX_COUNT};
use mandel_engine::shader::LinkStatus;
use mandel_engine::view::{InteractionConfig, InteractionController, ViewTransform, WheelRotation};

use crate::program::{FrameUniforms, MandelbrotProgram};

const CLEAR_COLOR: [f32; 4] = [0.0, 0.0, 0.0, 1.0];

/// Viewer application: owns the program and the pointer controller.
pub struct MandelbrotApp {
    program: MandelbrotProgram,
    controller: InteractionController,
    max_value: f32,
}

impl MandelbrotApp {
    pub fn new(program: MandelbrotProgram, interaction: InteractionConfig, max_value: f32) -> Self {
        Self {
            program,
            controller: InteractionController::new(ViewTransform::default(), interaction),
            max_value,
        }
    }

    fn drain_errors(gfx: &mut dyn GraphicsContext) {
        while let Some(err) = gfx.take_error() {
            log::warn!("graphics error 0x{:04X} ({}): {err}", err.code(), err.category());
        }
    }
}

impl Handler for MandelbrotApp {
    fn on_init(&mut self, gfx: &mut dyn GraphicsContext, width: f32, height: f32) -> anyhow::Result<()> {
        self.controller.on_resize(width, height);

        let status = self.program.build(gfx);
        if status != LinkStatus::LinkedSuccess {
            bail!(
                "shader program '{}' did not link ({status:?})",
                self.program.program().name()
            );
        }
        Ok(())
    }

    fn on_resize(&mut self, width: f32, height: f32) {
        self.controller.on_resize(width, height);
    }

    fn on_press(&mut self, x: f32, y: f32) {
        self.controller.on_press(x, y);
    }

    fn on_drag(&mut self, x: f32, y: f32) {
        self.controller.on_drag(x, y);
    }

    fn on_wheel(&mut self, rotation: WheelRotation, modifier_down: bool, x: f32, y: f32) {
        self.controller.on_wheel(rotation, modifier_down, x, y);
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_>) -> AppControl {
        ctx.gfx.clear(CLEAR_COLOR);

        if self.program.is_linked() {
            let origin = ctx.gfx.framebuffer_origin();
            let uniforms = FrameUniforms {
                max_iteration: self.controller.max_iteration() as f32,
                max_value: self.max_value,
                transform: self.controller.view().compose_for(origin).to_cols_array(),
            };

            self.program.bind(&mut *ctx.gfx, &uniforms);
            ctx.gfx.draw_indexed_triangles(QUAD_INDEX_COUNT);
        }

        Self::drain_errors(&mut *ctx.gfx);
        AppControl::Continue
    }

    fn on_dispose(&mut self, gfx: &mut dyn GraphicsContext) {
        self.program.delete(gfx);
        Self::drain_errors(gfx);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use mandel_engine::gfx::UniformKind;
    use mandel_engine::gfx::fake::FakeContext;
    use mandel_engine::time::FrameTime;

    use super::*;
    use crate::program::{MAX_ITERATION, MAX_VALUE, TRANSFORM};

    fn context() -> FakeContext {
        FakeContext::with_uniforms(&[
            (MAX_ITERATION, UniformKind::Float),
            (MAX_VALUE, UniformKind::Float),
            (TRANSFORM, UniformKind::Mat4),
        ])
    }

    fn app(fragment: &str) -> MandelbrotApp {
        MandelbrotApp::new(
            MandelbrotProgram::from_sources("vertex", fragment),
            InteractionConfig::default(),
            2.0,
        )
    }

    fn frame(app: &mut MandelbrotApp, gfx: &mut FakeContext) -> AppControl {
        let time = FrameTime {
            dt: 1.0 / 60.0,
            now: Instant::now(),
            frame_index: 0,
        };
        let mut ctx = FrameCtx::new(gfx, time, (800.0, 800.0));
        app.on_frame(&mut ctx)
    }

    fn location(gfx: &FakeContext, name: &str) -> u32 {
        gfx.uniforms[name].offset
    }

    fn transform_point(m: &[f32; 16], x: f32, y: f32) -> (f32, f32) {
        // Column-major: element (row r, col c) lives at c * 4 + r.
        (m[0] * x + m[4] * y + m[12], m[1] * x + m[5] * y + m[13])
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn init_builds_and_frame_uploads_uniforms() {
        let mut gfx = context();
        let mut app = app("fragment");
        app.on_init(&mut gfx, 800.0, 800.0).unwrap();

        assert_eq!(frame(&mut app, &mut gfx), AppControl::Continue);
        assert_eq!(gfx.draws, 1);
        assert_eq!(gfx.floats[&location(&gfx, MAX_ITERATION)], 360.0);
        assert_eq!(gfx.floats[&location(&gfx, MAX_VALUE)], 2.0);

        // Window centre maps to the plane origin.
        let m = transform_point(&gfx.mats[&location(&gfx, TRANSFORM)], 400.0, 400.0);
        assert!(m.0.abs() < 1e-6 && m.1.abs() < 1e-6);

        app.on_dispose(&mut gfx);
    }

    #[test]
    fn failed_compile_aborts_init() {
        let mut gfx = context();
        let mut app = app("#error");

        let err = app.on_init(&mut gfx, 400.0, 400.0).unwrap_err();
        assert!(err.to_string().contains("did not link"));

        // Frames after a failed init clear but never draw.
        frame(&mut app, &mut gfx);
        assert_eq!(gfx.draws, 0);

        app.on_dispose(&mut gfx);
        assert_eq!(gfx.deleted_programs, 1);
    }

    #[test]
    fn dispose_releases_native_objects() {
        let mut gfx = context();
        let mut app = app("fragment");
        app.on_init(&mut gfx, 400.0, 400.0).unwrap();

        app.on_dispose(&mut gfx);
        assert_eq!(gfx.deleted_programs, 1);
        assert_eq!(gfx.deleted_shaders, 2);
        assert!(gfx.programs.is_empty() && gfx.shaders.is_empty());
    }

    // ── input → uniforms ──────────────────────────────────────────────────

    #[test]
    fn ctrl_wheel_changes_uploaded_iteration() {
        let mut gfx = context();
        let mut app = app("fragment");
        app.on_init(&mut gfx, 400.0, 400.0).unwrap();

        app.on_wheel(WheelRotation::Up, true, 0.0, 0.0);
        app.on_wheel(WheelRotation::Up, true, 0.0, 0.0);
        frame(&mut app, &mut gfx);
        assert_eq!(gfx.floats[&location(&gfx, MAX_ITERATION)], 362.0);

        app.on_dispose(&mut gfx);
    }

    #[test]
    fn missing_uniform_is_skipped_without_errors() {
        let mut gfx = FakeContext::with_uniforms(&[(TRANSFORM, UniformKind::Mat4)]);
        let mut app = app("fragment");
        app.on_init(&mut gfx, 400.0, 400.0).unwrap();

        frame(&mut app, &mut gfx);
        assert_eq!(gfx.draws, 1);
        assert!(gfx.floats.is_empty());
        assert!(gfx.errors.is_empty());

        app.on_dispose(&mut gfx);
    }

    #[test]
    fn frame_drains_recorded_errors() {
        // maxIteration registered as a matrix: the float upload is rejected.
        let mut gfx = FakeContext::with_uniforms(&[(MAX_ITERATION, UniformKind::Mat4)]);
        let mut app = app("fragment");
        app.on_init(&mut gfx, 400.0, 400.0).unwrap();

        frame(&mut app, &mut gfx);
        assert!(gfx.errors.is_empty());
        assert_eq!(gfx.draws, 1);

        app.on_dispose(&mut gfx);
    }
}
