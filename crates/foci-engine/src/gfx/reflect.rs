//! WGSL front end: diagnostics and interface reflection via `naga`.
//!
//! A shader object holds one stage. Compiling it means parsing + validating
//! the module, locating the entry point of that stage, and recording what the
//! program linker needs: the uniform block members (byte offsets and types)
//! and the stage's `@location` inputs/outputs.

use naga::valid::{Capabilities, ValidationFlags, Validator};
use naga::{AddressSpace, Binding, Function, Handle, Module, Scalar, Type, TypeInner, VectorSize};

use super::backend::ShaderStage;
use super::uniform::UniformType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct UniformField {
    pub name: String,
    pub offset: u32,
    pub ty: UniformType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StageVar {
    pub name: String,
    pub location: u32,
}

/// Interface of one compiled stage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StageReflection {
    pub entry_point: String,
    pub uniform_fields: Vec<UniformField>,
    /// Span of the uniform block struct in bytes (0 when the stage has none).
    pub uniform_size: u32,
    pub inputs: Vec<StageVar>,
    pub outputs: Vec<StageVar>,
}

/// Parses, validates and reflects a single-stage WGSL source.
///
/// The error string is the compiler log shown to the developer.
pub(crate) fn reflect_stage(source: &str, stage: ShaderStage) -> Result<StageReflection, String> {
    let module = naga::front::wgsl::parse_str(source).map_err(|e| e.emit_to_string(source))?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|e| error_chain(e.as_inner()))?;

    let naga_stage = match stage {
        ShaderStage::Vertex => naga::ShaderStage::Vertex,
        ShaderStage::Fragment => naga::ShaderStage::Fragment,
    };
    let mut entries = module.entry_points.iter().filter(|ep| ep.stage == naga_stage);
    let entry = entries
        .next()
        .ok_or_else(|| format!("no {} entry point", stage.wgsl_attribute()))?;
    if entries.next().is_some() {
        return Err(format!(
            "more than one {} entry point; a shader object holds exactly one",
            stage.wgsl_attribute()
        ));
    }

    let (uniform_fields, uniform_size) = uniform_block(&module)?;

    Ok(StageReflection {
        entry_point: entry.name.clone(),
        uniform_fields,
        uniform_size,
        inputs: stage_inputs(&module, &entry.function),
        outputs: stage_outputs(&module, &entry.function),
    })
}

fn uniform_block(module: &Module) -> Result<(Vec<UniformField>, u32), String> {
    let mut block = None;

    for (_, var) in module.global_variables.iter() {
        let Some(binding) = &var.binding else { continue };
        let name = var.name.as_deref().unwrap_or("<unnamed>");
        if var.space != AddressSpace::Uniform || binding.group != 0 || binding.binding != 0 {
            return Err(format!(
                "resource `{name}` at @group({}) @binding({}) is not supported; \
                 only a uniform block at @group(0) @binding(0) is",
                binding.group, binding.binding
            ));
        }
        block = Some(var);
    }

    let Some(var) = block else { return Ok((Vec::new(), 0)) };

    let TypeInner::Struct { members, span } = &module.types[var.ty].inner else {
        return Err("the uniform block must be a struct".to_string());
    };

    let mut fields = Vec::with_capacity(members.len());
    for member in members {
        let name = member.name.clone().unwrap_or_default();
        let ty = uniform_type(&module.types[member.ty].inner).ok_or_else(|| {
            format!("uniform member `{name}` has a type this layer cannot upload")
        })?;
        fields.push(UniformField { name, offset: member.offset, ty });
    }

    Ok((fields, *span))
}

fn uniform_type(inner: &TypeInner) -> Option<UniformType> {
    match *inner {
        TypeInner::Scalar(s) if s == Scalar::F32 => Some(UniformType::F32),
        TypeInner::Vector { size, scalar } if scalar == Scalar::F32 => Some(match size {
            VectorSize::Bi => UniformType::Vec2,
            VectorSize::Tri => UniformType::Vec3,
            VectorSize::Quad => UniformType::Vec4,
        }),
        TypeInner::Matrix {
            columns: VectorSize::Tri,
            rows: VectorSize::Tri,
            scalar,
        } if scalar == Scalar::F32 => Some(UniformType::Mat3),
        _ => None,
    }
}

fn stage_inputs(module: &Module, function: &Function) -> Vec<StageVar> {
    let mut vars = Vec::new();
    for arg in &function.arguments {
        let name = arg.name.clone().unwrap_or_default();
        collect_locations(module, arg.binding.as_ref(), arg.ty, name, &mut vars);
    }
    vars
}

fn stage_outputs(module: &Module, function: &Function) -> Vec<StageVar> {
    let mut vars = Vec::new();
    if let Some(result) = &function.result {
        collect_locations(module, result.binding.as_ref(), result.ty, String::new(), &mut vars);
    }
    vars
}

/// A bound value contributes its own location; an unbound one must be a
/// struct whose members carry the bindings. Builtins are not interface slots.
fn collect_locations(
    module: &Module,
    binding: Option<&Binding>,
    ty: Handle<Type>,
    name: String,
    out: &mut Vec<StageVar>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => out.push(StageVar { name, location: *location }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    if let Some(Binding::Location { location, .. }) = &member.binding {
                        out.push(StageVar {
                            name: member.name.clone().unwrap_or_default(),
                            location: *location,
                        });
                    }
                }
            }
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(e) = source {
        msg.push_str(": ");
        msg.push_str(&e.to_string());
        source = e.source();
    }
    msg
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = r#"
struct Projection {
    trans_mat: mat3x3<f32>,
}
@group(0) @binding(0) var<uniform> projection: Projection;

struct VertexOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world: vec2<f32>,
}

@vertex
fn vs_main(@location(0) position: vec2<f32>) -> VertexOut {
    var out: VertexOut;
    let v = projection.trans_mat * vec3<f32>(position, 1.0);
    out.clip = vec4<f32>(v.xy, 0.0, 1.0);
    out.world = position;
    return out;
}
"#;

    const FRAGMENT: &str = r#"
struct Tint {
    trans_mat: mat3x3<f32>,
    center: vec2<f32>,
    radius: f32,
    color: vec3<f32>,
}
@group(0) @binding(0) var<uniform> tint: Tint;

@fragment
fn fs_main(@location(0) world: vec2<f32>) -> @location(0) vec4<f32> {
    let d = distance(world, tint.center);
    return vec4<f32>(tint.color, step(d, tint.radius));
}
"#;

    // ── entry points and io ───────────────────────────────────────────────

    #[test]
    fn vertex_stage_reports_entry_and_interface() {
        let r = reflect_stage(VERTEX, ShaderStage::Vertex).unwrap();
        assert_eq!(r.entry_point, "vs_main");
        assert_eq!(r.inputs, vec![StageVar { name: "position".into(), location: 0 }]);
        assert_eq!(r.outputs, vec![StageVar { name: "world".into(), location: 0 }]);
    }

    #[test]
    fn fragment_stage_reports_inputs() {
        let r = reflect_stage(FRAGMENT, ShaderStage::Fragment).unwrap();
        assert_eq!(r.entry_point, "fs_main");
        assert_eq!(r.inputs, [StageVar { name: "world".to_string(), location: 0 }]);
    }

    #[test]
    fn wrong_stage_is_a_compile_error() {
        let err = reflect_stage(VERTEX, ShaderStage::Fragment).unwrap_err();
        assert!(err.contains("@fragment"), "{err}");
    }

    // ── uniform block ─────────────────────────────────────────────────────

    #[test]
    fn uniform_members_carry_wgsl_offsets() {
        let r = reflect_stage(FRAGMENT, ShaderStage::Fragment).unwrap();
        let by_name = |n: &str| r.uniform_fields.iter().find(|f| f.name == n).unwrap().clone();
        assert_eq!(by_name("trans_mat").offset, 0);
        assert_eq!(by_name("trans_mat").ty, UniformType::Mat3);
        assert_eq!(by_name("center").offset, 48);
        assert_eq!(by_name("radius").offset, 56);
        assert_eq!(by_name("color").offset, 64);
        assert_eq!(by_name("color").ty, UniformType::Vec3);
        assert_eq!(r.uniform_size, 80);
    }

    #[test]
    fn extra_bindings_are_rejected() {
        let src = r#"
@group(0) @binding(1) var<uniform> other: vec4<f32>;
@fragment
fn fs_main() -> @location(0) vec4<f32> { return other; }
"#;
        let err = reflect_stage(src, ShaderStage::Fragment).unwrap_err();
        assert!(err.contains("@binding(1)"), "{err}");
    }

    // ── diagnostics ───────────────────────────────────────────────────────

    #[test]
    fn syntax_error_yields_log_text() {
        let err = reflect_stage("@vertex fn vs_main( -> {", ShaderStage::Vertex).unwrap_err();
        assert!(!err.is_empty());
    }

    #[test]
    fn type_error_yields_log_text() {
        let src = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> { return vec3<f32>(1.0); }
"#;
        assert!(reflect_stage(src, ShaderStage::Fragment).is_err());
    }
}
