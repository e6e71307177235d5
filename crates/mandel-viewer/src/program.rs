use std::path::Path;

use mandel_engine::gfx::GraphicsContext;
use mandel_engine::shader::{LinkStatus, ShaderProgram, ShaderStage, ShaderUnit, SourceError, load_source};

pub const MAX_ITERATION: &str = "maxIteration";
pub const MAX_VALUE: &str = "maxValue";
pub const TRANSFORM: &str = "transform";

/// Uniforms the fragment shader reads each frame.
pub const UNIFORMS: [&str; 3] = [MAX_ITERATION, MAX_VALUE, TRANSFORM];

/// Per-frame uniform values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub max_iteration: f32,
    pub max_value: f32,
    /// Column-major pixel → plane matrix.
    pub transform: [f32; 16],
}

/// The vertex + fragment program that draws the set.
#[derive(Debug)]
pub struct MandelbrotProgram {
    program: ShaderProgram,
}

impl MandelbrotProgram {
    /// Reads both stages from disk. Nothing is created on the GPU yet.
    pub fn load(vertex: &Path, fragment: &Path) -> Result<Self, SourceError> {
        let vs = load_source(vertex)?;
        let fs = load_source(fragment)?;
        Ok(Self::from_sources(vs, fs))
    }

    pub fn from_sources(vertex: impl Into<String>, fragment: impl Into<String>) -> Self {
        let program = ShaderProgram::new("mandelbrot")
            .add_unit(ShaderUnit::with_source(ShaderStage::Vertex, "mandelbrot.vert", vertex))
            .add_unit(ShaderUnit::with_source(ShaderStage::Fragment, "mandelbrot.frag", fragment));
        Self { program }
    }

    /// Compiles, links and resolves [`UNIFORMS`]; the build log goes to `info`.
    pub fn build(&mut self, gfx: &mut dyn GraphicsContext) -> LinkStatus {
        let status = self.program.build(gfx, &UNIFORMS);
        log::info!("{}", self.program.build_log().trim_end());
        status
    }

    /// Makes the program current and uploads `uniforms`.
    ///
    /// Uniforms the linker did not expose are skipped.
    pub fn bind(&self, gfx: &mut dyn GraphicsContext, uniforms: &FrameUniforms) {
        let Some(handle) = self.program.handle() else {
            return;
        };
        gfx.use_program(handle);

        if let Some(loc) = self.program.uniform_location(MAX_ITERATION) {
            gfx.set_uniform_f32(loc, uniforms.max_iteration);
        }
        if let Some(loc) = self.program.uniform_location(MAX_VALUE) {
            gfx.set_uniform_f32(loc, uniforms.max_value);
        }
        if let Some(loc) = self.program.uniform_location(TRANSFORM) {
            gfx.set_uniform_mat4(loc, &uniforms.transform);
        }
    }

    pub fn delete(&mut self, gfx: &mut dyn GraphicsContext) {
        self.program.delete(gfx);
    }

    pub fn is_linked(&self) -> bool {
        self.program.is_linked()
    }

    pub fn program(&self) -> &ShaderProgram {
        &self.program
    }
}
