use crate::coords::ColorRgba;

use super::backend::{DrawCall, GfxBackend, ProgramDesc, ShaderStage};

/// Backend without a device: records every clear and draw.
///
/// Draws snapshot the uniform block and the vertex data actually read, so
/// callers can assert on what a live backend would have rasterized.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    commands: Vec<HeadlessCommand>,
}

/// Render target placeholder for [`HeadlessBackend`].
#[derive(Debug, Copy, Clone, Default)]
pub struct HeadlessTarget;

#[derive(Debug, Clone, PartialEq)]
pub enum HeadlessCommand {
    Clear(ColorRgba),
    Draw(RecordedDraw),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedDraw {
    pub program: String,
    pub uniforms: Vec<u8>,
    pub attributes: Vec<RecordedAttribute>,
    pub first_vertex: u32,
    pub vertex_count: u32,
}

/// Components of the drawn vertex range for one attribute, vertex-major.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAttribute {
    pub location: u32,
    pub components: u32,
    pub values: Vec<f32>,
}

#[derive(Debug)]
pub struct HeadlessModule {
    pub name: String,
    pub stage: ShaderStage,
}

#[derive(Debug)]
pub struct HeadlessProgram {
    pub name: String,
    pub uniform_size: u32,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[HeadlessCommand] {
        &self.commands
    }

    /// Draws only, in submission order.
    pub fn draws(&self) -> impl Iterator<Item = &RecordedDraw> {
        self.commands.iter().filter_map(|c| match c {
            HeadlessCommand::Draw(d) => Some(d),
            HeadlessCommand::Clear(_) => None,
        })
    }

    /// Drops everything recorded so far.
    pub fn take_commands(&mut self) -> Vec<HeadlessCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl RecordedDraw {
    /// Reads `n` floats of the uniform block starting at byte `offset`.
    pub fn uniform_floats(&self, offset: u32, n: usize) -> Vec<f32> {
        let start = offset as usize;
        self.uniforms[start..start + n * 4]
            .chunks_exact(4)
            .map(bytemuck::pod_read_unaligned::<f32>)
            .collect()
    }

    pub fn attribute(&self, location: u32) -> Option<&RecordedAttribute> {
        self.attributes.iter().find(|a| a.location == location)
    }
}

impl GfxBackend for HeadlessBackend {
    type Buffer = Vec<u8>;
    type Module = HeadlessModule;
    type Program = HeadlessProgram;
    type Target<'t> = HeadlessTarget;

    fn create_buffer(&mut self, _label: &str) -> Self::Buffer {
        Vec::new()
    }

    fn upload_buffer(&mut self, buffer: &mut Self::Buffer, bytes: &[u8]) {
        buffer.clear();
        buffer.extend_from_slice(bytes);
    }

    fn create_module(&mut self, name: &str, stage: ShaderStage, _source: &str) -> Self::Module {
        HeadlessModule { name: name.to_string(), stage }
    }

    fn create_program(&mut self, name: &str, desc: ProgramDesc<'_, Self>) -> Self::Program {
        HeadlessProgram { name: name.to_string(), uniform_size: desc.uniform_size }
    }

    fn clear(&mut self, _target: &HeadlessTarget, color: ColorRgba) {
        self.commands.push(HeadlessCommand::Clear(color));
    }

    fn draw(&mut self, _target: &HeadlessTarget, call: DrawCall<'_, Self>) {
        let attributes = call
            .bindings
            .iter()
            .map(|b| {
                let a = b.attribute;
                let mut values = Vec::with_capacity((call.vertex_count * a.components) as usize);
                for v in call.first_vertex..call.first_vertex + call.vertex_count {
                    let base = (a.offset + v * a.stride) as usize;
                    let element = &b.buffer[base..base + a.element_size() as usize];
                    values.extend(element.chunks_exact(4).map(bytemuck::pod_read_unaligned::<f32>));
                }
                RecordedAttribute { location: a.location, components: a.components, values }
            })
            .collect();

        self.commands.push(HeadlessCommand::Draw(RecordedDraw {
            program: call.program_name.to_string(),
            uniforms: call.uniforms.to_vec(),
            attributes,
            first_vertex: call.first_vertex,
            vertex_count: call.vertex_count,
        }));
    }
}
