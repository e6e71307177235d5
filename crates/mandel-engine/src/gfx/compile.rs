//! WGSL compilation and uniform-block reflection (naga front-end).

use std::collections::HashMap;

use crate::shader::ShaderStage;

use super::{UniformKind, UniformLocation};

/// Native stage constants keyed by the engine's stage tag.
const STAGE_TABLE: [(ShaderStage, naga::ShaderStage, wgpu::ShaderStages); 2] = [
    (ShaderStage::Vertex, naga::ShaderStage::Vertex, wgpu::ShaderStages::VERTEX),
    (ShaderStage::Fragment, naga::ShaderStage::Fragment, wgpu::ShaderStages::FRAGMENT),
];

pub(crate) fn naga_stage(stage: ShaderStage) -> naga::ShaderStage {
    STAGE_TABLE
        .iter()
        .find(|(s, _, _)| *s == stage)
        .map(|(_, n, _)| *n)
        .unwrap_or(naga::ShaderStage::Vertex)
}

pub(crate) fn wgpu_stage(stage: ShaderStage) -> wgpu::ShaderStages {
    STAGE_TABLE
        .iter()
        .find(|(s, _, _)| *s == stage)
        .map(|(_, _, w)| *w)
        .unwrap_or(wgpu::ShaderStages::NONE)
}

/// A validated WGSL module together with the exact text it was built from.
#[derive(Debug, Clone)]
pub struct CompiledModule {
    pub module: naga::Module,
    pub source: String,
    /// Name of the entry point matching the requested stage.
    pub entry_point: String,
}

/// Uniform block found at `@group(0) @binding(0)`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformBlock {
    /// Total block size in bytes (struct span).
    pub size: u32,
    pub members: HashMap<String, UniformLocation>,
}

/// Parses and validates `source` for `stage`.
///
/// On failure the error is the human-readable diagnostic text, suitable for an
/// info log.
pub fn compile_wgsl(source: &str, stage: ShaderStage) -> Result<CompiledModule, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    let mut validator = naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::all(),
    );
    validator
        .validate(&module)
        .map_err(|e| e.emit_to_string(source))?;

    let wanted = naga_stage(stage);
    let entry_point = module
        .entry_points
        .iter()
        .find(|ep| ep.stage == wanted)
        .map(|ep| ep.name.clone())
        .ok_or_else(|| format!("no {} entry point found", stage.label().to_lowercase()))?;

    Ok(CompiledModule {
        module,
        source: source.to_string(),
        entry_point,
    })
}

/// Reflects the `var<uniform>` struct bound at group 0, binding 0.
///
/// Returns `None` when the module declares no such block.
pub fn reflect_uniform_block(module: &naga::Module) -> Option<UniformBlock> {
    for (_, var) in module.global_variables.iter() {
        if var.space != naga::AddressSpace::Uniform {
            continue;
        }
        let Some(binding) = &var.binding else { continue };
        if binding.group != 0 || binding.binding != 0 {
            continue;
        }
        let naga::TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
            continue;
        };

        let members = members
            .iter()
            .filter_map(|m| {
                let name = m.name.clone()?;
                let kind = uniform_kind(&module.types[m.ty].inner);
                Some((
                    name,
                    UniformLocation {
                        offset: m.offset,
                        kind,
                    },
                ))
            })
            .collect();

        return Some(UniformBlock {
            size: *span,
            members,
        });
    }
    None
}

fn uniform_kind(inner: &naga::TypeInner) -> UniformKind {
    const F32: naga::Scalar = naga::Scalar {
        kind: naga::ScalarKind::Float,
        width: 4,
    };

    match inner {
        naga::TypeInner::Scalar(s) if *s == F32 => UniformKind::Float,
        naga::TypeInner::Matrix {
            columns: naga::VectorSize::Quad,
            rows: naga::VectorSize::Quad,
            scalar,
        } if *scalar == F32 => UniformKind::Mat4,
        _ => UniformKind::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = r#"
struct Params {
    transform: mat4x4<f32>,
    scale: f32,
    bias: vec2<f32>,
};

@group(0) @binding(0) var<uniform> params: Params;

@vertex
fn vs_main(@location(0) pos: vec3<f32>) -> @builtin(position) vec4<f32> {
    return params.transform * vec4<f32>(pos * params.scale, 1.0);
}
"#;

    const FRAGMENT: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 0.0, 1.0);
}
"#;

    #[test]
    fn compiles_valid_vertex_shader() {
        let compiled = compile_wgsl(VERTEX, ShaderStage::Vertex).unwrap();
        assert_eq!(compiled.entry_point, "vs_main");
    }

    #[test]
    fn syntax_error_is_reported_as_text() {
        let err = compile_wgsl("fn broken( {", ShaderStage::Fragment).unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn missing_stage_entry_point_fails() {
        let err = compile_wgsl(FRAGMENT, ShaderStage::Vertex).unwrap_err();
        assert!(err.contains("no vertex entry point"));
    }

    #[test]
    fn reflects_member_offsets_and_kinds() {
        let compiled = compile_wgsl(VERTEX, ShaderStage::Vertex).unwrap();
        let block = reflect_uniform_block(&compiled.module).unwrap();

        assert_eq!(block.size, 80);
        assert_eq!(
            block.members["transform"],
            UniformLocation { offset: 0, kind: UniformKind::Mat4 }
        );
        assert_eq!(
            block.members["scale"],
            UniformLocation { offset: 64, kind: UniformKind::Float }
        );
        assert_eq!(block.members["bias"].kind, UniformKind::Other);
    }

    #[test]
    fn module_without_uniforms_reflects_nothing() {
        let compiled = compile_wgsl(FRAGMENT, ShaderStage::Fragment).unwrap();
        assert!(reflect_uniform_block(&compiled.module).is_none());
    }

    #[test]
    fn stage_table_covers_both_stages() {
        assert_eq!(naga_stage(ShaderStage::Fragment), naga::ShaderStage::Fragment);
        assert_eq!(wgpu_stage(ShaderStage::Vertex), wgpu::ShaderStages::VERTEX);
    }
}
