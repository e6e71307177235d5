use std::num::NonZeroU32;

use crate::shader::ShaderStage;

use super::GraphicsError;

/// Native shader object handle. Never zero; "unallocated" is `Option::None`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderHandle(NonZeroU32);

impl ShaderHandle {
    #[inline]
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Native program object handle. Never zero; "unallocated" is `Option::None`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramHandle(NonZeroU32);

impl ProgramHandle {
    #[inline]
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Value type of a resolved uniform.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    Float,
    Mat4,
    /// Present in the block but not settable through this API.
    Other,
}

/// Resolved uniform location: byte offset inside the program's uniform block.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation {
    pub offset: u32,
    pub kind: UniformKind,
}

/// Where pixel row zero lives in the framebuffer the backend renders into.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum FramebufferOrigin {
    /// GL convention: fragment Y grows upward.
    #[default]
    BottomLeft,
    /// wgpu / D3D / Metal convention: fragment Y grows downward.
    TopLeft,
}

/// Primitive graphics operations used by the shader lifecycle and the frame loop.
///
/// Errors follow the "record, don't raise" model: compile and link results are
/// queried through status/log accessors, and misuse (unknown handle, wrong uniform
/// type, draw without a linked program) is recorded and drained with
/// [`GraphicsContext::take_error`].
pub trait GraphicsContext {
    // ── shader objects ────────────────────────────────────────────────────

    /// Allocates a shader object for `stage`. `None` when allocation fails.
    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderHandle>;

    /// Replaces the source of `shader` with the ordered fragments in `source`.
    fn shader_source(&mut self, shader: ShaderHandle, source: &[String]);

    fn compile_shader(&mut self, shader: ShaderHandle);

    fn shader_compile_status(&self, shader: ShaderHandle) -> bool;

    /// Compiler diagnostics of the last compile; empty when there are none.
    fn shader_info_log(&self, shader: ShaderHandle) -> String;

    fn delete_shader(&mut self, shader: ShaderHandle);

    // ── program objects ───────────────────────────────────────────────────

    fn create_program(&mut self) -> Option<ProgramHandle>;

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle);

    fn link_program(&mut self, program: ProgramHandle);

    fn program_link_status(&self, program: ProgramHandle) -> bool;

    fn program_info_log(&self, program: ProgramHandle) -> String;

    /// Looks up a uniform in a linked program. `None` means "not found".
    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;

    fn delete_program(&mut self, program: ProgramHandle);

    // ── per-frame state ───────────────────────────────────────────────────

    /// Makes `program` current for uniform uploads and draws.
    fn use_program(&mut self, program: ProgramHandle);

    fn set_uniform_f32(&mut self, location: UniformLocation, value: f32);

    /// Uploads a column-major 4×4 matrix.
    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &[f32; 16]);

    fn clear(&mut self, color: [f32; 4]);

    /// Draws `index_count` indices of the bound quad geometry as triangles.
    fn draw_indexed_triangles(&mut self, index_count: u32);

    /// Returns and clears the oldest recorded error, if any.
    fn take_error(&mut self) -> Option<GraphicsError>;

    fn framebuffer_origin(&self) -> FramebufferOrigin {
        FramebufferOrigin::BottomLeft
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    //! Recording context used by lifecycle tests. Compiles succeed unless the
    //! source contains `#error`; links succeed when one vertex and one fragment
    //! shader compiled successfully.

    use std::collections::HashMap;

    use super::*;
    use crate::gfx::ErrorQueue;

    #[derive(Debug, Default)]
    pub struct FakeShader {
        pub stage: Option<ShaderStage>,
        pub source: Vec<String>,
        pub compiled: bool,
        pub log: String,
    }

    #[derive(Debug, Default)]
    pub struct FakeProgram {
        pub attached: Vec<ShaderHandle>,
        pub linked: bool,
        pub log: String,
    }

    #[derive(Debug, Default)]
    pub struct FakeContext {
        pub next_id: u32,
        pub shaders: HashMap<u32, FakeShader>,
        pub programs: HashMap<u32, FakeProgram>,
        pub uniforms: HashMap<String, UniformLocation>,
        pub fail_shader_alloc: bool,
        pub calls: usize,
        pub deleted_shaders: usize,
        pub deleted_programs: usize,
        pub current: Option<ProgramHandle>,
        pub floats: HashMap<u32, f32>,
        pub mats: HashMap<u32, [f32; 16]>,
        pub draws: usize,
        pub errors: ErrorQueue,
    }

    impl FakeContext {
        pub fn with_uniforms(names: &[(&str, UniformKind)]) -> Self {
            let mut ctx = Self::default();
            for (i, (name, kind)) in names.iter().enumerate() {
                ctx.uniforms.insert(
                    name.to_string(),
                    UniformLocation {
                        offset: (i as u32) * 16,
                        kind: *kind,
                    },
                );
            }
            ctx
        }

        fn alloc(&mut self) -> u32 {
            self.next_id += 1;
            self.next_id
        }
    }

    impl GraphicsContext for FakeContext {
        fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderHandle> {
            self.calls += 1;
            if self.fail_shader_alloc {
                return None;
            }
            let id = self.alloc();
            self.shaders.insert(
                id,
                FakeShader {
                    stage: Some(stage),
                    ..Default::default()
                },
            );
            ShaderHandle::new(id)
        }

        fn shader_source(&mut self, shader: ShaderHandle, source: &[String]) {
            self.calls += 1;
            if let Some(s) = self.shaders.get_mut(&shader.get()) {
                s.source = source.to_vec();
            }
        }

        fn compile_shader(&mut self, shader: ShaderHandle) {
            self.calls += 1;
            if let Some(s) = self.shaders.get_mut(&shader.get()) {
                s.compiled = !s.source.iter().any(|l| l.contains("#error"));
                s.log = if s.compiled {
                    String::new()
                } else {
                    "error: unexpected `#error`".to_string()
                };
            }
        }

        fn shader_compile_status(&self, shader: ShaderHandle) -> bool {
            self.shaders.get(&shader.get()).is_some_and(|s| s.compiled)
        }

        fn shader_info_log(&self, shader: ShaderHandle) -> String {
            self.shaders
                .get(&shader.get())
                .map(|s| s.log.clone())
                .unwrap_or_default()
        }

        fn delete_shader(&mut self, shader: ShaderHandle) {
            self.calls += 1;
            if self.shaders.remove(&shader.get()).is_some() {
                self.deleted_shaders += 1;
            }
        }

        fn create_program(&mut self) -> Option<ProgramHandle> {
            self.calls += 1;
            let id = self.alloc();
            self.programs.insert(id, FakeProgram::default());
            ProgramHandle::new(id)
        }

        fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
            self.calls += 1;
            if let Some(p) = self.programs.get_mut(&program.get()) {
                p.attached.push(shader);
            }
        }

        fn link_program(&mut self, program: ProgramHandle) {
            self.calls += 1;
            let Some(p) = self.programs.get(&program.get()) else { return };
            let compiled_stage = |stage: ShaderStage| {
                p.attached.iter().any(|h| {
                    self.shaders
                        .get(&h.get())
                        .is_some_and(|s| s.compiled && s.stage == Some(stage))
                })
            };
            let linked = compiled_stage(ShaderStage::Vertex) && compiled_stage(ShaderStage::Fragment);
            if let Some(p) = self.programs.get_mut(&program.get()) {
                p.linked = linked;
                p.log = if linked {
                    String::new()
                } else {
                    "link error: missing compiled stage".to_string()
                };
            }
        }

        fn program_link_status(&self, program: ProgramHandle) -> bool {
            self.programs.get(&program.get()).is_some_and(|p| p.linked)
        }

        fn program_info_log(&self, program: ProgramHandle) -> String {
            self.programs
                .get(&program.get())
                .map(|p| p.log.clone())
                .unwrap_or_default()
        }

        fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
            if !self.program_link_status(program) {
                return None;
            }
            self.uniforms.get(name).copied()
        }

        fn delete_program(&mut self, program: ProgramHandle) {
            self.calls += 1;
            if self.programs.remove(&program.get()).is_some() {
                self.deleted_programs += 1;
            }
        }

        fn use_program(&mut self, program: ProgramHandle) {
            self.current = Some(program);
        }

        fn set_uniform_f32(&mut self, location: UniformLocation, value: f32) {
            if location.kind != UniformKind::Float {
                self.errors
                    .push(GraphicsError::InvalidOperation("uniform type mismatch".into()));
                return;
            }
            self.floats.insert(location.offset, value);
        }

        fn set_uniform_mat4(&mut self, location: UniformLocation, value: &[f32; 16]) {
            if location.kind != UniformKind::Mat4 {
                self.errors
                    .push(GraphicsError::InvalidOperation("uniform type mismatch".into()));
                return;
            }
            self.mats.insert(location.offset, *value);
        }

        fn clear(&mut self, _color: [f32; 4]) {}

        fn draw_indexed_triangles(&mut self, _index_count: u32) {
            if self.current.is_none() {
                self.errors
                    .push(GraphicsError::InvalidOperation("no program in use".into()));
                return;
            }
            self.draws += 1;
        }

        fn take_error(&mut self) -> Option<GraphicsError> {
            self.errors.take()
        }
    }
}
