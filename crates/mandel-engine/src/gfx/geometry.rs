//! Fixed full-screen quad fed to every linked program.

use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct QuadVertex {
    pub pos: [f32; 3], // clip space, z = 0
}

impl QuadVertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<QuadVertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [1.0, 1.0, 0.0] },
    QuadVertex { pos: [1.0, -1.0, 0.0] },
    QuadVertex { pos: [-1.0, -1.0, 0.0] },
    QuadVertex { pos: [-1.0, 1.0, 0.0] },
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

pub const QUAD_INDEX_COUNT: u32 = QUAD_INDICES.len() as u32;
