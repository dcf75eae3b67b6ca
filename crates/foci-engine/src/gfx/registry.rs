use crate::coords::ColorRgba;

use super::backend::{DrawCall, GfxBackend, ProgramDesc, ShaderStage, VertexAttribute, VertexBinding};
use super::error::{GfxError, GfxErrorKind};
use super::handle::{
    AttributeLocation, BufferHandle, ProgramHandle, ShaderHandle, UniformLocation, UniformSlot,
    VertexArrayHandle,
};
use super::reflect::{self, StageReflection, StageVar, UniformField};
use super::uniform::UniformValue;

/// GPU resource registry.
///
/// Owns one append-only arena per resource kind and hands out their indices as
/// handles. Records live until the registry is dropped; nothing is freed
/// individually and handles are never reused.
///
/// Handles are trusted: an out-of-range handle is a programming error and
/// panics on the arena index.
pub struct Gfx<B: GfxBackend> {
    backend: B,
    buffers: Vec<BufferRecord<B>>,
    vertex_arrays: Vec<VertexArrayRecord>,
    shaders: Vec<ShaderRecord<B>>,
    programs: Vec<ProgramRecord<B>>,
}

struct BufferRecord<B: GfxBackend> {
    raw: B::Buffer,
    len: usize,
}

#[derive(Default)]
struct VertexArrayRecord {
    attributes: Vec<(VertexAttribute, BufferHandle)>,
    revision: u64,
}

struct ShaderRecord<B: GfxBackend> {
    name: String,
    stage: ShaderStage,
    source: Option<String>,
    compiled: Option<CompiledShader<B>>,
}

struct CompiledShader<B: GfxBackend> {
    module: B::Module,
    reflection: StageReflection,
}

struct ProgramRecord<B: GfxBackend> {
    name: String,
    attached: Vec<ShaderHandle>,
    linked: Option<LinkedProgram<B>>,
}

struct LinkedProgram<B: GfxBackend> {
    raw: B::Program,
    uniforms: Vec<UniformField>,
    uniform_data: Vec<u8>,
    inputs: Vec<StageVar>,
}

impl<B: GfxBackend> Gfx<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            buffers: Vec::new(),
            vertex_arrays: Vec::new(),
            shaders: Vec::new(),
            programs: Vec::new(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    // ── creation ──────────────────────────────────────────────────────────

    pub fn create_buffer(&mut self) -> BufferHandle {
        let handle = BufferHandle::from_index(self.buffers.len());
        let raw = self.backend.create_buffer(&format!("{handle:?}"));
        self.buffers.push(BufferRecord { raw, len: 0 });
        handle
    }

    pub fn create_vertex_array(&mut self) -> VertexArrayHandle {
        let handle = VertexArrayHandle::from_index(self.vertex_arrays.len());
        self.vertex_arrays.push(VertexArrayRecord::default());
        handle
    }

    pub fn create_shader(&mut self, stage: ShaderStage, name: impl Into<String>) -> ShaderHandle {
        let handle = ShaderHandle::from_index(self.shaders.len());
        self.shaders.push(ShaderRecord {
            name: name.into(),
            stage,
            source: None,
            compiled: None,
        });
        handle
    }

    pub fn create_program(&mut self, name: impl Into<String>) -> ProgramHandle {
        let handle = ProgramHandle::from_index(self.programs.len());
        self.programs.push(ProgramRecord {
            name: name.into(),
            attached: Vec::new(),
            linked: None,
        });
        handle
    }

    // ── shaders and programs ──────────────────────────────────────────────

    /// Replaces the shader's source. A previous compilation is discarded.
    pub fn set_shader_source(&mut self, shader: ShaderHandle, source: impl Into<String>) {
        let record = &mut self.shaders[shader.index()];
        record.source = Some(source.into());
        record.compiled = None;
    }

    #[track_caller]
    pub fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) -> Result<(), GfxError> {
        let shader_name = &self.shaders[shader.index()].name;
        let record = &mut self.programs[program.index()];
        if record.attached.contains(&shader) {
            return Err(GfxError::invalid(format!(
                "shader {shader_name} is already attached to program {}",
                record.name
            )));
        }
        record.attached.push(shader);
        Ok(())
    }

    /// Compiles the shader's WGSL source for its stage.
    ///
    /// On failure the error carries the compiler log.
    #[track_caller]
    pub fn compile_shader(&mut self, shader: ShaderHandle) -> Result<(), GfxError> {
        let record = &mut self.shaders[shader.index()];
        record.compiled = None;

        let Some(source) = record.source.as_deref() else {
            return Err(GfxError::new(GfxErrorKind::ShaderCompile {
                shader: record.name.clone(),
                log: "no source was set".to_string(),
            }));
        };

        let reflection = match reflect::reflect_stage(source, record.stage) {
            Ok(r) => r,
            Err(log) => {
                return Err(GfxError::new(GfxErrorKind::ShaderCompile {
                    shader: record.name.clone(),
                    log,
                }));
            }
        };

        let module = self.backend.create_module(&record.name, record.stage, source);
        log::debug!(
            "compiled shader {} ({}, entry {})",
            record.name,
            record.stage.wgsl_attribute(),
            reflection.entry_point
        );
        record.compiled = Some(CompiledShader { module, reflection });
        Ok(())
    }

    /// Links the attached vertex and fragment shaders into a program.
    #[track_caller]
    pub fn link_program(&mut self, program: ProgramHandle) -> Result<(), GfxError> {
        let record = &mut self.programs[program.index()];
        record.linked = None;

        let mut vertex = None;
        let mut fragment = None;
        for &handle in &record.attached {
            let shader = &self.shaders[handle.index()];
            let Some(compiled) = shader.compiled.as_ref() else {
                return Err(link_error(record, format!("shader {} is not compiled", shader.name)));
            };
            let slot = match shader.stage {
                ShaderStage::Vertex => &mut vertex,
                ShaderStage::Fragment => &mut fragment,
            };
            if slot.is_some() {
                return Err(link_error(
                    record,
                    format!("more than one {} shader attached", shader.stage.wgsl_attribute()),
                ));
            }
            *slot = Some(compiled);
        }

        let Some(vs) = vertex else {
            return Err(link_error(record, "no compiled vertex shader attached".to_string()));
        };
        let Some(fs) = fragment else {
            return Err(link_error(record, "no compiled fragment shader attached".to_string()));
        };

        for input in &fs.reflection.inputs {
            if !vs.reflection.outputs.iter().any(|o| o.location == input.location) {
                return Err(link_error(
                    record,
                    format!(
                        "fragment input `{}` at @location({}) is not written by the vertex stage",
                        input.name, input.location
                    ),
                ));
            }
        }

        let uniforms = match merge_uniforms(&vs.reflection.uniform_fields, &fs.reflection.uniform_fields) {
            Ok(u) => u,
            Err(log) => return Err(link_error(record, log)),
        };
        let uniform_size = vs.reflection.uniform_size.max(fs.reflection.uniform_size);

        let raw = self.backend.create_program(
            &record.name,
            ProgramDesc {
                vertex: &vs.module,
                vertex_entry: &vs.reflection.entry_point,
                fragment: &fs.module,
                fragment_entry: &fs.reflection.entry_point,
                uniform_size,
            },
        );

        log::debug!(
            "linked program {} ({} uniforms, {uniform_size} bytes)",
            record.name,
            uniforms.len()
        );

        record.linked = Some(LinkedProgram {
            raw,
            uniforms,
            uniform_data: vec![0; uniform_size as usize],
            inputs: vs.reflection.inputs.clone(),
        });
        Ok(())
    }

    pub fn is_linked(&self, program: ProgramHandle) -> bool {
        self.programs[program.index()].linked.is_some()
    }

    // ── locations ─────────────────────────────────────────────────────────

    /// Looks up a uniform block member by name.
    ///
    /// A missing name is not an error: a warning is logged and the sentinel
    /// location is returned. Setting the sentinel does nothing.
    pub fn get_uniform_location(&self, program: ProgramHandle, name: &str) -> UniformLocation {
        let record = &self.programs[program.index()];
        let field = record
            .linked
            .as_ref()
            .and_then(|l| l.uniforms.iter().find(|f| f.name == name));

        match field {
            Some(f) => UniformLocation {
                program,
                slot: Some(UniformSlot { offset: f.offset, ty: f.ty }),
            },
            None => {
                log::warn!("uniform `{name}` not found in program {}", record.name);
                UniformLocation::not_found(program)
            }
        }
    }

    /// Looks up a vertex stage input by name.
    pub fn get_attribute_location(&self, program: ProgramHandle, name: &str) -> AttributeLocation {
        let record = &self.programs[program.index()];
        let input = record
            .linked
            .as_ref()
            .and_then(|l| l.inputs.iter().find(|v| v.name == name));

        match input {
            Some(v) => AttributeLocation(Some(v.location)),
            None => {
                log::warn!("attribute `{name}` not found in program {}", record.name);
                AttributeLocation::NOT_FOUND
            }
        }
    }

    // ── data ──────────────────────────────────────────────────────────────

    /// Stores a uniform value in the program's uniform block.
    ///
    /// The value reaches the GPU with the next draw of this program.
    #[track_caller]
    pub fn set_uniform(
        &mut self,
        program: ProgramHandle,
        location: UniformLocation,
        value: impl Into<UniformValue>,
    ) -> Result<(), GfxError> {
        let value = value.into();
        let record = &mut self.programs[program.index()];

        if location.program != program {
            return Err(GfxError::invalid(format!(
                "uniform location of {:?} used with program {}",
                location.program, record.name
            )));
        }
        let Some(slot) = location.slot else { return Ok(()) };
        let Some(linked) = record.linked.as_mut() else {
            return Err(GfxError::invalid(format!("program {} is not linked", record.name)));
        };
        if slot.ty != value.ty() {
            return Err(GfxError::invalid(format!(
                "uniform at offset {} of program {} is {}, got {}",
                slot.offset,
                record.name,
                slot.ty.wgsl_name(),
                value.ty().wgsl_name()
            )));
        }

        value.write_to(&mut linked.uniform_data[slot.offset as usize..]);
        Ok(())
    }

    /// Replaces the buffer's contents.
    pub fn upload_buffer_data(&mut self, buffer: BufferHandle, bytes: &[u8]) {
        let record = &mut self.buffers[buffer.index()];
        self.backend.upload_buffer(&mut record.raw, bytes);
        record.len = bytes.len();
    }

    /// Feeds vertex input `location` from `buffer`, read as packed `f32`s.
    ///
    /// `stride` 0 means tightly packed. Rebinding a location replaces it.
    #[track_caller]
    pub fn set_vertex_attribute(
        &mut self,
        vertex_array: VertexArrayHandle,
        location: AttributeLocation,
        buffer: BufferHandle,
        components: u32,
        stride: u32,
        offset: u32,
    ) -> Result<(), GfxError> {
        let Some(location) = location.get() else {
            return Err(GfxError::invalid("attribute location not found"));
        };
        if !(1..=4).contains(&components) {
            return Err(GfxError::invalid(format!(
                "attribute @location({location}) has {components} components; 1..=4 are supported"
            )));
        }
        if stride % 4 != 0 || offset % 4 != 0 {
            return Err(GfxError::invalid(format!(
                "attribute @location({location}): stride {stride} and offset {offset} must be multiples of 4"
            )));
        }
        let element = components * 4;
        if stride != 0 && stride < element {
            return Err(GfxError::invalid(format!(
                "attribute @location({location}): stride {stride} is smaller than one element ({element} bytes)"
            )));
        }
        // Trap on a dangling buffer handle now rather than at draw time.
        let _ = &self.buffers[buffer.index()];

        let attribute = VertexAttribute {
            location,
            components,
            stride: if stride == 0 { element } else { stride },
            offset,
        };

        let record = &mut self.vertex_arrays[vertex_array.index()];
        match record.attributes.iter_mut().find(|(a, _)| a.location == location) {
            Some(existing) => {
                let layout_changed =
                    existing.0.components != components || existing.0.stride != attribute.stride;
                *existing = (attribute, buffer);
                if layout_changed {
                    record.revision += 1;
                }
            }
            None => {
                record.attributes.push((attribute, buffer));
                record.revision += 1;
            }
        }
        Ok(())
    }

    // ── submission ────────────────────────────────────────────────────────

    pub fn clear(&mut self, target: &B::Target<'_>, color: ColorRgba) {
        self.backend.clear(target, color);
    }

    /// Draws `count` vertices starting at `first` as a triangle list.
    ///
    /// Submission is immediate: uniforms and buffer contents are those set
    /// before this call.
    #[track_caller]
    pub fn draw(
        &mut self,
        target: &B::Target<'_>,
        program: ProgramHandle,
        vertex_array: VertexArrayHandle,
        first: u32,
        count: u32,
    ) -> Result<(), GfxError> {
        let Self { backend, buffers, vertex_arrays, programs, .. } = self;

        let record = &mut programs[program.index()];
        let Some(linked) = record.linked.as_mut() else {
            return Err(GfxError::invalid(format!("program {} is not linked", record.name)));
        };
        let vao = &vertex_arrays[vertex_array.index()];

        let mut bindings = Vec::with_capacity(linked.inputs.len());
        for input in &linked.inputs {
            let Some((attribute, buffer)) =
                vao.attributes.iter().find(|(a, _)| a.location == input.location)
            else {
                return Err(GfxError::invalid(format!(
                    "vertex input `{}` at @location({}) of program {} is not fed by {vertex_array:?}",
                    input.name, input.location, record.name
                )));
            };

            let buffer_record = &buffers[buffer.index()];
            if buffer_record.len == 0 {
                return Err(GfxError::invalid(format!(
                    "{buffer:?} feeding @location({}) is empty",
                    input.location
                )));
            }
            if count > 0 {
                let needed = (first as u64 + count as u64 - 1) * attribute.stride as u64
                    + attribute.offset as u64
                    + attribute.element_size() as u64;
                if needed > buffer_record.len as u64 {
                    return Err(GfxError::invalid(format!(
                        "vertices {first}..{} read {needed} bytes from {buffer:?}, which holds {}",
                        first as u64 + count as u64,
                        buffer_record.len
                    )));
                }
            }

            bindings.push(VertexBinding { attribute: *attribute, buffer: &buffer_record.raw });
        }

        if count == 0 {
            return Ok(());
        }

        let LinkedProgram { raw, uniform_data, .. } = linked;
        backend.draw(
            target,
            DrawCall {
                program_name: &record.name,
                program: raw,
                uniforms: uniform_data,
                vertex_array,
                layout_revision: vao.revision,
                bindings,
                first_vertex: first,
                vertex_count: count,
            },
        );
        Ok(())
    }
}

#[track_caller]
fn link_error<B: GfxBackend>(record: &ProgramRecord<B>, log: String) -> GfxError {
    GfxError::new(GfxErrorKind::ProgramLink { program: record.name.clone(), log })
}

/// Both stages bind the same block, so a member named in both must sit at the
/// same offset with the same type, and distinct members must not overlap.
fn merge_uniforms(vertex: &[UniformField], fragment: &[UniformField]) -> Result<Vec<UniformField>, String> {
    let mut merged = vertex.to_vec();

    for field in fragment {
        match merged.iter().find(|m| m.name == field.name) {
            Some(existing) if existing.offset != field.offset || existing.ty != field.ty => {
                return Err(format!(
                    "uniform `{}` is {} at offset {} in the vertex stage but {} at offset {} in the fragment stage",
                    field.name,
                    existing.ty.wgsl_name(),
                    existing.offset,
                    field.ty.wgsl_name(),
                    field.offset
                ));
            }
            Some(_) => {}
            None => {
                let end = field.offset + field.ty.size() as u32;
                if let Some(other) = merged
                    .iter()
                    .find(|m| field.offset < m.offset + m.ty.size() as u32 && m.offset < end)
                {
                    return Err(format!(
                        "uniform `{}` overlaps `{}` in the shared uniform block",
                        field.name, other.name
                    ));
                }
                merged.push(field.clone());
            }
        }
    }

    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Mat3;
    use crate::gfx::{HeadlessBackend, HeadlessCommand, HeadlessTarget};

    const VERTEX: &str = r#"
struct Block {
    trans_mat: mat3x3<f32>,
}
@group(0) @binding(0) var<uniform> block: Block;

struct VertexOut {
    @builtin(position) clip: vec4<f32>,
    @location(0) world: vec2<f32>,
}

@vertex
fn vs_main(@location(0) position: vec2<f32>) -> VertexOut {
    var out: VertexOut;
    let p = block.trans_mat * vec3<f32>(position, 1.0);
    out.clip = vec4<f32>(p.xy, 0.0, 1.0);
    out.world = position;
    return out;
}
"#;

    const FRAGMENT: &str = r#"
struct Block {
    trans_mat: mat3x3<f32>,
    color: vec3<f32>,
    radius: f32,
}
@group(0) @binding(0) var<uniform> block: Block;

@fragment
fn fs_main(@location(0) world: vec2<f32>) -> @location(0) vec4<f32> {
    let inside = step(length(world), block.radius);
    return vec4<f32>(block.color, inside);
}
"#;

    // Reads location(1), which the vertex stage never writes.
    const FRAGMENT_UNFED: &str = r#"
@fragment
fn fs_main(@location(1) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(uv, 0.0, 1.0);
}
"#;

    // `color` where VERTEX keeps `trans_mat`.
    const FRAGMENT_CONFLICT: &str = r#"
struct Block {
    color: vec4<f32>,
}
@group(0) @binding(0) var<uniform> block: Block;

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return block.color;
}
"#;

    fn gfx() -> Gfx<HeadlessBackend> {
        Gfx::new(HeadlessBackend::new())
    }

    fn build(gfx: &mut Gfx<HeadlessBackend>, vs: &str, fs: &str) -> Result<ProgramHandle, GfxError> {
        let v = gfx.create_shader(ShaderStage::Vertex, "test.vert");
        gfx.set_shader_source(v, vs);
        gfx.compile_shader(v)?;
        let f = gfx.create_shader(ShaderStage::Fragment, "test.frag");
        gfx.set_shader_source(f, fs);
        gfx.compile_shader(f)?;
        let p = gfx.create_program("test");
        gfx.attach_shader(p, v)?;
        gfx.attach_shader(p, f)?;
        gfx.link_program(p)?;
        Ok(p)
    }

    fn quad(gfx: &mut Gfx<HeadlessBackend>, program: ProgramHandle) -> VertexArrayHandle {
        let positions: [f32; 12] = [0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0];
        let vbo = gfx.create_buffer();
        gfx.upload_buffer_data(vbo, bytemuck::cast_slice(&positions));
        let vao = gfx.create_vertex_array();
        let loc = gfx.get_attribute_location(program, "position");
        gfx.set_vertex_attribute(vao, loc, vbo, 2, 0, 0).unwrap();
        vao
    }

    // ── handles ───────────────────────────────────────────────────────────

    #[test]
    fn handles_are_sequential_per_kind() {
        let mut gfx = gfx();
        assert_eq!(gfx.create_buffer().index(), 0);
        assert_eq!(gfx.create_buffer().index(), 1);
        assert_eq!(gfx.create_vertex_array().index(), 0);
        assert_eq!(gfx.create_shader(ShaderStage::Vertex, "a").index(), 0);
        assert_eq!(gfx.create_program("p").index(), 0);
        assert_eq!(gfx.create_program("q").index(), 1);
    }

    #[test]
    #[should_panic]
    fn out_of_range_handle_traps() {
        let mut gfx = gfx();
        let other = {
            let mut g = Gfx::new(HeadlessBackend::new());
            g.create_buffer();
            g.create_buffer()
        };
        gfx.upload_buffer_data(other, &[0; 4]);
    }

    // ── compile / link ────────────────────────────────────────────────────

    #[test]
    fn compile_failure_carries_name_and_log() {
        let mut gfx = gfx();
        let s = gfx.create_shader(ShaderStage::Fragment, "broken.frag");
        gfx.set_shader_source(s, "@fragment fn fs_main( {");
        let err = gfx.compile_shader(s).unwrap_err();
        match &err.kind {
            GfxErrorKind::ShaderCompile { shader, log } => {
                assert_eq!(shader, "broken.frag");
                assert!(!log.is_empty());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.location.file().ends_with("registry.rs"));
    }

    #[test]
    fn compile_without_source_fails() {
        let mut gfx = gfx();
        let s = gfx.create_shader(ShaderStage::Vertex, "empty.vert");
        assert!(matches!(
            gfx.compile_shader(s).unwrap_err().kind,
            GfxErrorKind::ShaderCompile { .. }
        ));
    }

    #[test]
    fn link_requires_both_stages() {
        let mut gfx = gfx();
        let v = gfx.create_shader(ShaderStage::Vertex, "v");
        gfx.set_shader_source(v, VERTEX);
        gfx.compile_shader(v).unwrap();
        let p = gfx.create_program("vertex-only");
        gfx.attach_shader(p, v).unwrap();
        let err = gfx.link_program(p).unwrap_err();
        assert!(matches!(err.kind, GfxErrorKind::ProgramLink { .. }));
        assert!(!gfx.is_linked(p));
    }

    #[test]
    fn link_rejects_uncompiled_shader() {
        let mut gfx = gfx();
        let v = gfx.create_shader(ShaderStage::Vertex, "v");
        gfx.set_shader_source(v, VERTEX);
        let p = gfx.create_program("p");
        gfx.attach_shader(p, v).unwrap();
        assert!(gfx.link_program(p).is_err());
    }

    #[test]
    fn link_rejects_unfed_fragment_input() {
        let mut gfx = gfx();
        let err = build(&mut gfx, VERTEX, FRAGMENT_UNFED).unwrap_err();
        assert!(err.to_string().contains("@location(1)"), "{err}");
    }

    #[test]
    fn link_rejects_overlapping_uniform_members() {
        let mut gfx = gfx();
        let err = build(&mut gfx, VERTEX, FRAGMENT_CONFLICT).unwrap_err();
        assert!(matches!(err.kind, GfxErrorKind::ProgramLink { .. }));
    }

    #[test]
    fn double_attach_is_invalid() {
        let mut gfx = gfx();
        let v = gfx.create_shader(ShaderStage::Vertex, "v");
        let p = gfx.create_program("p");
        gfx.attach_shader(p, v).unwrap();
        assert!(matches!(
            gfx.attach_shader(p, v).unwrap_err().kind,
            GfxErrorKind::InvalidOperation(_)
        ));
    }

    // ── locations and uniforms ────────────────────────────────────────────

    #[test]
    fn locations_resolve_merged_members() {
        let mut gfx = gfx();
        let p = build(&mut gfx, VERTEX, FRAGMENT).unwrap();
        assert_eq!(gfx.get_uniform_location(p, "trans_mat").offset(), Some(0));
        assert_eq!(gfx.get_uniform_location(p, "color").offset(), Some(48));
        assert_eq!(gfx.get_uniform_location(p, "radius").offset(), Some(60));
        assert_eq!(gfx.get_attribute_location(p, "position").get(), Some(0));
    }

    #[test]
    fn missing_names_yield_sentinels() {
        let mut gfx = gfx();
        let p = build(&mut gfx, VERTEX, FRAGMENT).unwrap();
        let u = gfx.get_uniform_location(p, "lit");
        assert!(!u.is_found());
        assert!(gfx.set_uniform(p, u, 1.0).is_ok());
        assert!(!gfx.get_attribute_location(p, "normal").is_found());
    }

    #[test]
    fn sentinel_attribute_is_rejected() {
        let mut gfx = gfx();
        let vao = gfx.create_vertex_array();
        let vbo = gfx.create_buffer();
        let err = gfx
            .set_vertex_attribute(vao, AttributeLocation::NOT_FOUND, vbo, 2, 0, 0)
            .unwrap_err();
        assert!(matches!(err.kind, GfxErrorKind::InvalidOperation(_)));
    }

    #[test]
    fn uniform_type_mismatch_is_invalid() {
        let mut gfx = gfx();
        let p = build(&mut gfx, VERTEX, FRAGMENT).unwrap();
        let radius = gfx.get_uniform_location(p, "radius");
        assert!(gfx.set_uniform(p, radius, [1.0, 2.0]).is_err());
    }

    #[test]
    fn foreign_location_is_invalid() {
        let mut gfx = gfx();
        let a = build(&mut gfx, VERTEX, FRAGMENT).unwrap();
        let b = build(&mut gfx, VERTEX, FRAGMENT).unwrap();
        let radius_a = gfx.get_uniform_location(a, "radius");
        assert!(gfx.set_uniform(b, radius_a, 0.5).is_err());
    }

    // ── draw ──────────────────────────────────────────────────────────────

    #[test]
    fn draw_snapshots_uniforms_and_vertices() {
        let mut gfx = gfx();
        let p = build(&mut gfx, VERTEX, FRAGMENT).unwrap();
        let vao = quad(&mut gfx, p);

        let color = gfx.get_uniform_location(p, "color");
        let radius = gfx.get_uniform_location(p, "radius");
        let trans = gfx.get_uniform_location(p, "trans_mat");
        gfx.set_uniform(p, trans, Mat3::IDENTITY).unwrap();
        gfx.set_uniform(p, color, [0.1, 0.2, 0.3]).unwrap();
        gfx.set_uniform(p, radius, 0.5).unwrap();

        gfx.clear(&HeadlessTarget, ColorRgba::black());
        gfx.draw(&HeadlessTarget, p, vao, 0, 6).unwrap();

        // Later uniform changes must not leak into the recorded draw.
        gfx.set_uniform(p, radius, 0.9).unwrap();

        let commands = gfx.backend().commands();
        assert_eq!(commands.len(), 2);
        assert!(matches!(commands[0], HeadlessCommand::Clear(_)));
        let draw = gfx.backend().draws().next().unwrap();
        assert_eq!(draw.program, "test");
        assert_eq!(draw.uniform_floats(48, 3), vec![0.1, 0.2, 0.3]);
        assert_eq!(draw.uniform_floats(60, 1), vec![0.5]);
        assert_eq!(draw.uniform_floats(0, 3), vec![1.0, 0.0, 0.0]);
        let position = draw.attribute(0).unwrap();
        assert_eq!(position.values.len(), 12);
        assert_eq!(&position.values[4..6], &[1.0, 1.0]);
    }

    #[test]
    fn draw_honours_stride_and_offset() {
        let mut gfx = gfx();
        let p = build(&mut gfx, VERTEX, FRAGMENT).unwrap();
        // Interleaved (x, y, pad) triples, starting one float in.
        let data: [f32; 10] = [9.0, 1.0, 2.0, 0.0, 3.0, 4.0, 0.0, 5.0, 6.0, 0.0];
        let vbo = gfx.create_buffer();
        gfx.upload_buffer_data(vbo, bytemuck::cast_slice(&data));
        let vao = gfx.create_vertex_array();
        let loc = gfx.get_attribute_location(p, "position");
        gfx.set_vertex_attribute(vao, loc, vbo, 2, 12, 4).unwrap();

        gfx.draw(&HeadlessTarget, p, vao, 1, 2).unwrap();
        let draw = gfx.backend().draws().next().unwrap();
        assert_eq!(draw.attribute(0).unwrap().values, vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn upload_replaces_previous_contents() {
        let mut gfx = gfx();
        let p = build(&mut gfx, VERTEX, FRAGMENT).unwrap();
        let vao = quad(&mut gfx, p);
        let vbo = BufferHandle::from_index(0);
        gfx.upload_buffer_data(vbo, bytemuck::cast_slice(&[7.0f32, 8.0]));

        assert!(gfx.draw(&HeadlessTarget, p, vao, 0, 3).is_err());
        gfx.draw(&HeadlessTarget, p, vao, 0, 1).unwrap();
        let draw = gfx.backend().draws().next().unwrap();
        assert_eq!(draw.attribute(0).unwrap().values, vec![7.0, 8.0]);
    }

    #[test]
    fn draw_validation() {
        let mut gfx = gfx();
        let p = build(&mut gfx, VERTEX, FRAGMENT).unwrap();

        let unlinked = gfx.create_program("unlinked");
        let empty_vao = gfx.create_vertex_array();
        assert!(gfx.draw(&HeadlessTarget, unlinked, empty_vao, 0, 3).is_err());
        assert!(gfx.draw(&HeadlessTarget, p, empty_vao, 0, 3).is_err());

        let vbo = gfx.create_buffer();
        let vao = gfx.create_vertex_array();
        let loc = gfx.get_attribute_location(p, "position");
        gfx.set_vertex_attribute(vao, loc, vbo, 2, 0, 0).unwrap();
        assert!(gfx.draw(&HeadlessTarget, p, vao, 0, 3).is_err(), "empty buffer");

        gfx.upload_buffer_data(vbo, bytemuck::cast_slice(&[0.0f32; 6]));
        assert!(gfx.draw(&HeadlessTarget, p, vao, 0, 3).is_ok());
        assert!(gfx.draw(&HeadlessTarget, p, vao, 1, 3).is_err(), "past the end");
        assert_eq!(gfx.backend().draws().count(), 1);
    }

    #[test]
    fn rebinding_same_layout_keeps_revision() {
        let mut gfx = gfx();
        let a = gfx.create_buffer();
        let b = gfx.create_buffer();
        let vao = gfx.create_vertex_array();
        let loc = AttributeLocation(Some(0));
        gfx.set_vertex_attribute(vao, loc, a, 2, 0, 0).unwrap();
        let rev = gfx.vertex_arrays[vao.index()].revision;
        gfx.set_vertex_attribute(vao, loc, b, 2, 8, 0).unwrap();
        assert_eq!(gfx.vertex_arrays[vao.index()].revision, rev);
        gfx.set_vertex_attribute(vao, loc, b, 3, 0, 0).unwrap();
        assert_eq!(gfx.vertex_arrays[vao.index()].revision, rev + 1);
    }
}
