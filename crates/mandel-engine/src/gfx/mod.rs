//! Graphics-context abstraction.
//!
//! Shader lifecycle code talks to the GPU only through [`GraphicsContext`], a small
//! GL-flavoured command set (create/compile/link/uniform/draw). The wgpu backend
//! implements it on top of naga (WGSL compile + reflection) and a render pipeline
//! per linked program.

mod compile;
mod context;
mod error;
mod geometry;
mod wgpu_backend;

pub use compile::{CompiledModule, UniformBlock, compile_wgsl, reflect_uniform_block};
pub use context::{
    FramebufferOrigin, GraphicsContext, ProgramHandle, ShaderHandle, UniformKind, UniformLocation,
};
pub use error::{ErrorQueue, GraphicsError};
pub use geometry::{QUAD_INDEX_COUNT, QUAD_INDICES, QUAD_VERTICES, QuadVertex};
pub use wgpu_backend::WgpuGraphics;

#[cfg(any(test, feature = "test-support"))]
pub use context::fake;
