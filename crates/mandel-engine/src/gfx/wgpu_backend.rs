use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::render::RenderTarget;
use crate::shader::ShaderStage;

use super::compile::{self, CompiledModule, UniformBlock};
use super::geometry::{QUAD_INDEX_COUNT, QUAD_INDICES, QUAD_VERTICES, QuadVertex};
use super::{
    ErrorQueue, FramebufferOrigin, GraphicsContext, GraphicsError, ProgramHandle, ShaderHandle,
    UniformKind, UniformLocation,
};

struct ShaderObject {
    stage: ShaderStage,
    source: Vec<String>,
    compiled: Option<CompiledModule>,
    info_log: String,
}

struct LinkedProgram {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: Option<wgpu::BindGroupLayout>,
    block: UniformBlock,
    /// CPU copy of the uniform block; snapshotted into a GPU buffer per draw.
    data: Vec<u8>,
}

#[derive(Default)]
struct ProgramObject {
    attached: Vec<ShaderHandle>,
    linked: Option<LinkedProgram>,
    info_log: String,
}

struct Draw {
    program: ProgramHandle,
    index_count: u32,
    uniforms: Vec<u8>,
}

/// wgpu implementation of [`GraphicsContext`].
///
/// Shader compile is naga parse + validate; link builds one render pipeline over
/// the fixed quad. Clear and draw calls are recorded and encoded into a single
/// render pass by [`WgpuGraphics::flush`].
pub struct WgpuGraphics {
    device: wgpu::Device,
    surface_format: wgpu::TextureFormat,

    quad_vbo: wgpu::Buffer,
    quad_ibo: wgpu::Buffer,

    next_id: u32,
    shaders: HashMap<u32, ShaderObject>,
    programs: HashMap<u32, ProgramObject>,
    current: Option<ProgramHandle>,

    clear_color: Option<[f32; 4]>,
    draws: Vec<Draw>,
    errors: ErrorQueue,
}

impl WgpuGraphics {
    /// Creates the context and uploads the static quad geometry.
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        let quad_vbo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mandel quad vbo"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let quad_ibo = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("mandel quad ibo"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            device: device.clone(),
            surface_format,
            quad_vbo,
            quad_ibo,
            next_id: 0,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            current: None,
            clear_color: None,
            draws: Vec::new(),
            errors: ErrorQueue::default(),
        }
    }

    /// Encodes everything recorded since the last flush into `target`.
    ///
    /// Nothing is encoded when the frame recorded neither a clear nor a draw.
    pub fn flush(&mut self, target: &mut RenderTarget<'_>) {
        let clear = self.clear_color.take();
        let draws = std::mem::take(&mut self.draws);
        if clear.is_none() && draws.is_empty() {
            return;
        }

        // Bind groups must outlive the pass that references them.
        let mut prepared = Vec::with_capacity(draws.len());
        for draw in &draws {
            let Some(linked) = self
                .programs
                .get(&draw.program.get())
                .and_then(|p| p.linked.as_ref())
            else {
                continue;
            };

            let bind_group = linked.bind_group_layout.as_ref().map(|layout| {
                let ubo = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: Some("mandel uniform block"),
                    contents: &draw.uniforms,
                    usage: wgpu::BufferUsages::UNIFORM,
                });
                self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                    label: Some("mandel uniform bind group"),
                    layout,
                    entries: &[wgpu::BindGroupEntry {
                        binding: 0,
                        resource: ubo.as_entire_binding(),
                    }],
                })
            });

            prepared.push((&linked.pipeline, bind_group, draw.index_count));
        }

        let load = match clear {
            Some([r, g, b, a]) => wgpu::LoadOp::Clear(wgpu::Color {
                r: r as f64,
                g: g as f64,
                b: b as f64,
                a: a as f64,
            }),
            None => wgpu::LoadOp::Load,
        };

        let mut rpass = target.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("mandel pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: target.color_view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load,
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });

        rpass.set_vertex_buffer(0, self.quad_vbo.slice(..));
        rpass.set_index_buffer(self.quad_ibo.slice(..), wgpu::IndexFormat::Uint32);

        for (pipeline, bind_group, index_count) in &prepared {
            rpass.set_pipeline(pipeline);
            if let Some(bg) = bind_group {
                rpass.set_bind_group(0, bg, &[]);
            }
            rpass.draw_indexed(0..*index_count, 0, 0..1);
        }
    }

    fn program_mut(&mut self, program: ProgramHandle) -> Option<&mut ProgramObject> {
        match self.programs.get_mut(&program.get()) {
            Some(p) => Some(p),
            None => {
                self.errors.push(GraphicsError::InvalidValue(format!(
                    "unknown program {}",
                    program.get()
                )));
                None
            }
        }
    }

    fn current_block_mut(&mut self, location: UniformLocation, want: UniformKind, len: usize) -> Option<&mut [u8]> {
        let Some(current) = self.current else {
            self.errors
                .push(GraphicsError::InvalidOperation("no program in use".into()));
            return None;
        };
        let Some(linked) = self
            .programs
            .get_mut(&current.get())
            .and_then(|p| p.linked.as_mut())
        else {
            self.errors.push(GraphicsError::InvalidOperation(format!(
                "program {} is not linked",
                current.get()
            )));
            return None;
        };

        if location.kind != want {
            self.errors.push(GraphicsError::InvalidOperation(format!(
                "uniform at offset {} is {:?}, not {:?}",
                location.offset, location.kind, want
            )));
            return None;
        }

        let start = location.offset as usize;
        let end = start + len;
        if end > linked.data.len() {
            self.errors.push(GraphicsError::InvalidValue(format!(
                "uniform offset {} outside block of {} bytes",
                location.offset,
                linked.data.len()
            )));
            return None;
        }
        Some(&mut linked.data[start..end])
    }

    fn link(&self, attached: &[ShaderHandle]) -> Result<LinkedProgram, String> {
        let find = |stage: ShaderStage| {
            attached
                .iter()
                .filter_map(|h| self.shaders.get(&h.get()))
                .find(|s| s.stage == stage)
        };

        let mut modules = Vec::with_capacity(2);
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            let shader = find(stage)
                .ok_or_else(|| format!("no {} shader attached", stage.label().to_lowercase()))?;
            let compiled = shader.compiled.as_ref().ok_or_else(|| {
                format!("{} shader is not compiled", stage.label().to_lowercase())
            })?;
            modules.push((stage, compiled));
        }

        // Both stages may declare the block; they must agree on its size.
        let mut block: Option<UniformBlock> = None;
        let mut visibility = wgpu::ShaderStages::NONE;
        for (stage, compiled) in &modules {
            let Some(b) = compile::reflect_uniform_block(&compiled.module) else { continue };
            visibility |= compile::wgpu_stage(*stage);
            block = match block.take() {
                None => Some(b),
                Some(existing) if existing.size != b.size => {
                    return Err(format!(
                        "uniform block size mismatch between stages ({} vs {} bytes)",
                        existing.size, b.size
                    ));
                }
                Some(mut existing) => {
                    existing.members.extend(b.members);
                    Some(existing)
                }
            };
        }

        // naga validated each module alone; cross-stage and device checks happen here.
        let scope = self.device.push_error_scope(wgpu::ErrorFilter::Validation);

        let bind_group_layout = block.as_ref().and_then(|b| {
            let min_size = std::num::NonZeroU64::new(b.size as u64)?;
            Some(self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some("mandel uniform bgl"),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: Some(min_size),
                    },
                    count: None,
                }],
            }))
        });

        let layouts: Vec<&wgpu::BindGroupLayout> = bind_group_layout.iter().collect();
        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("mandel pipeline layout"),
            bind_group_layouts: &layouts,
            immediate_size: 0,
        });

        let (_, vertex) = modules[0];
        let (_, fragment) = modules[1];

        let vs = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mandel vertex shader"),
            source: wgpu::ShaderSource::Wgsl(vertex.source.as_str().into()),
        });
        let fs = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("mandel fragment shader"),
            source: wgpu::ShaderSource::Wgsl(fragment.source.as_str().into()),
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("mandel pipeline"),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vs,
                entry_point: Some(vertex.entry_point.as_str()),
                compilation_options: Default::default(),
                buffers: &[QuadVertex::layout()],
            },

            fragment: Some(wgpu::FragmentState {
                module: &fs,
                entry_point: Some(fragment.entry_point.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        if let Some(err) = pollster::block_on(scope.pop()) {
            return Err(format!("pipeline creation failed: {err}"));
        }

        let block = block.unwrap_or_default();
        let data = vec![0u8; block.size as usize];

        Ok(LinkedProgram {
            pipeline,
            bind_group_layout,
            block,
            data,
        })
    }
}

impl GraphicsContext for WgpuGraphics {
    fn create_shader(&mut self, stage: ShaderStage) -> Option<ShaderHandle> {
        let id = self.next_id.checked_add(1)?;
        self.next_id = id;
        self.shaders.insert(
            id,
            ShaderObject {
                stage,
                source: Vec::new(),
                compiled: None,
                info_log: String::new(),
            },
        );
        ShaderHandle::new(id)
    }

    fn shader_source(&mut self, shader: ShaderHandle, source: &[String]) {
        match self.shaders.get_mut(&shader.get()) {
            Some(s) => s.source = source.to_vec(),
            None => self.errors.push(GraphicsError::InvalidValue(format!(
                "unknown shader {}",
                shader.get()
            ))),
        }
    }

    fn compile_shader(&mut self, shader: ShaderHandle) {
        let Some(s) = self.shaders.get_mut(&shader.get()) else {
            self.errors.push(GraphicsError::InvalidValue(format!(
                "unknown shader {}",
                shader.get()
            )));
            return;
        };

        let text = s.source.concat();
        match compile::compile_wgsl(&text, s.stage) {
            Ok(module) => {
                s.compiled = Some(module);
                s.info_log.clear();
            }
            Err(log) => {
                s.compiled = None;
                s.info_log = log;
            }
        }
    }

    fn shader_compile_status(&self, shader: ShaderHandle) -> bool {
        self.shaders
            .get(&shader.get())
            .is_some_and(|s| s.compiled.is_some())
    }

    fn shader_info_log(&self, shader: ShaderHandle) -> String {
        self.shaders
            .get(&shader.get())
            .map(|s| s.info_log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&mut self, shader: ShaderHandle) {
        if self.shaders.remove(&shader.get()).is_none() {
            log::trace!("delete of unknown shader {} ignored", shader.get());
        }
    }

    fn create_program(&mut self) -> Option<ProgramHandle> {
        let id = self.next_id.checked_add(1)?;
        self.next_id = id;
        self.programs.insert(id, ProgramObject::default());
        ProgramHandle::new(id)
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) {
        if !self.shaders.contains_key(&shader.get()) {
            self.errors.push(GraphicsError::InvalidValue(format!(
                "unknown shader {}",
                shader.get()
            )));
            return;
        }
        let duplicate = match self.program_mut(program) {
            None => return,
            Some(p) if p.attached.contains(&shader) => true,
            Some(p) => {
                p.attached.push(shader);
                false
            }
        };
        if duplicate {
            self.errors.push(GraphicsError::InvalidOperation(format!(
                "shader {} already attached to program {}",
                shader.get(),
                program.get()
            )));
        }
    }

    fn link_program(&mut self, program: ProgramHandle) {
        let Some(attached) = self.program_mut(program).map(|p| p.attached.clone()) else {
            return;
        };

        let result = self.link(&attached);

        if let Some(p) = self.programs.get_mut(&program.get()) {
            match result {
                Ok(linked) => {
                    p.linked = Some(linked);
                    p.info_log.clear();
                }
                Err(log) => {
                    p.linked = None;
                    p.info_log = log;
                }
            }
        }
    }

    fn program_link_status(&self, program: ProgramHandle) -> bool {
        self.programs
            .get(&program.get())
            .is_some_and(|p| p.linked.is_some())
    }

    fn program_info_log(&self, program: ProgramHandle) -> String {
        self.programs
            .get(&program.get())
            .map(|p| p.info_log.clone())
            .unwrap_or_default()
    }

    fn uniform_location(&self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.programs
            .get(&program.get())
            .and_then(|p| p.linked.as_ref())
            .and_then(|l| l.block.members.get(name).copied())
    }

    fn delete_program(&mut self, program: ProgramHandle) {
        if self.programs.remove(&program.get()).is_none() {
            log::trace!("delete of unknown program {} ignored", program.get());
        }
        if self.current == Some(program) {
            self.current = None;
        }
    }

    fn use_program(&mut self, program: ProgramHandle) {
        if self.program_mut(program).is_some() {
            self.current = Some(program);
        }
    }

    fn set_uniform_f32(&mut self, location: UniformLocation, value: f32) {
        if let Some(dst) = self.current_block_mut(location, UniformKind::Float, 4) {
            dst.copy_from_slice(bytemuck::bytes_of(&value));
        }
    }

    fn set_uniform_mat4(&mut self, location: UniformLocation, value: &[f32; 16]) {
        if let Some(dst) = self.current_block_mut(location, UniformKind::Mat4, 64) {
            dst.copy_from_slice(bytemuck::cast_slice(value));
        }
    }

    fn clear(&mut self, color: [f32; 4]) {
        // A clear discards anything drawn earlier in the same frame.
        self.draws.clear();
        self.clear_color = Some(color);
    }

    fn draw_indexed_triangles(&mut self, index_count: u32) {
        if index_count > QUAD_INDEX_COUNT || index_count % 3 != 0 {
            self.errors.push(GraphicsError::InvalidValue(format!(
                "index count {index_count} is not a triangle list within the quad"
            )));
            return;
        }

        let Some(program) = self.current else {
            self.errors
                .push(GraphicsError::InvalidOperation("draw with no program in use".into()));
            return;
        };

        let Some(linked) = self
            .programs
            .get(&program.get())
            .and_then(|p| p.linked.as_ref())
        else {
            self.errors.push(GraphicsError::InvalidOperation(format!(
                "draw with unlinked program {}",
                program.get()
            )));
            return;
        };

        self.draws.push(Draw {
            program,
            index_count,
            uniforms: linked.data.clone(),
        });
    }

    fn take_error(&mut self) -> Option<GraphicsError> {
        self.errors.take()
    }

    fn framebuffer_origin(&self) -> FramebufferOrigin {
        FramebufferOrigin::TopLeft
    }
}
