use std::collections::HashMap;
use std::num::NonZeroU64;

use crate::coords::ColorRgba;
use crate::render::RenderTarget;

use super::backend::{DrawCall, GfxBackend, ProgramDesc, ShaderStage, VertexBinding};
use super::handle::VertexArrayHandle;

/// Live backend over a wgpu device.
///
/// Each clear/draw records its own encoder and submits it, so buffer and
/// uniform uploads made between draws land exactly where they were issued.
pub struct WgpuBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
}

pub struct WgpuBuffer {
    label: String,
    buffer: Option<wgpu::Buffer>,
    capacity: u64,
}

pub struct WgpuModule {
    module: wgpu::ShaderModule,
}

pub struct WgpuProgram {
    name: String,
    vertex: wgpu::ShaderModule,
    vertex_entry: String,
    fragment: wgpu::ShaderModule,
    fragment_entry: String,
    layout: wgpu::PipelineLayout,
    uniforms: Option<(wgpu::Buffer, wgpu::BindGroup)>,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
struct PipelineKey {
    vertex_array: VertexArrayHandle,
    layout_revision: u64,
    format: wgpu::TextureFormat,
}

const MIN_BUFFER_CAPACITY: u64 = 256;
const UNIFORM_ALIGNMENT: u64 = 16;

impl WgpuBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self { device, queue }
    }

    fn build_pipeline(
        &self,
        program: &WgpuProgram,
        bindings: &[VertexBinding<'_, Self>],
        format: wgpu::TextureFormat,
    ) -> wgpu::RenderPipeline {
        let attributes: Vec<[wgpu::VertexAttribute; 1]> = bindings
            .iter()
            .map(|b| {
                [wgpu::VertexAttribute {
                    format: float_format(b.attribute.components),
                    offset: 0,
                    shader_location: b.attribute.location,
                }]
            })
            .collect();

        let layouts: Vec<wgpu::VertexBufferLayout<'_>> = bindings
            .iter()
            .zip(&attributes)
            .map(|(b, attrs)| wgpu::VertexBufferLayout {
                array_stride: u64::from(b.attribute.stride),
                step_mode: wgpu::VertexStepMode::Vertex,
                attributes: attrs,
            })
            .collect();

        log::debug!("building pipeline for program {} ({format:?})", program.name);

        self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&program.name),
            layout: Some(&program.layout),
            vertex: wgpu::VertexState {
                module: &program.vertex,
                entry_point: Some(&program.vertex_entry),
                compilation_options: Default::default(),
                buffers: &layouts,
            },
            fragment: Some(wgpu::FragmentState {
                module: &program.fragment,
                entry_point: Some(&program.fragment_entry),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
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
        })
    }

    fn begin_pass<'e>(
        encoder: &'e mut wgpu::CommandEncoder,
        view: &wgpu::TextureView,
        load: wgpu::LoadOp<wgpu::Color>,
    ) -> wgpu::RenderPass<'e> {
        encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("foci gfx pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target: None,
                ops: wgpu::Operations { load, store: wgpu::StoreOp::Store },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        })
    }

    fn encoder(&self, label: &str) -> wgpu::CommandEncoder {
        self.device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor { label: Some(label) })
    }
}

impl GfxBackend for WgpuBackend {
    type Buffer = WgpuBuffer;
    type Module = WgpuModule;
    type Program = WgpuProgram;
    type Target<'t> = RenderTarget<'t>;

    fn create_buffer(&mut self, label: &str) -> WgpuBuffer {
        WgpuBuffer { label: label.to_string(), buffer: None, capacity: 0 }
    }

    fn upload_buffer(&mut self, buffer: &mut WgpuBuffer, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }

        // Queue writes must be a multiple of COPY_BUFFER_ALIGNMENT.
        let padded_len = (bytes.len() as u64).next_multiple_of(wgpu::COPY_BUFFER_ALIGNMENT);

        if buffer.buffer.is_none() || buffer.capacity < padded_len {
            let capacity = padded_len.next_power_of_two().max(MIN_BUFFER_CAPACITY);
            buffer.buffer = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(&buffer.label),
                size: capacity,
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
            buffer.capacity = capacity;
        }

        let Some(raw) = buffer.buffer.as_ref() else { return };
        if padded_len == bytes.len() as u64 {
            self.queue.write_buffer(raw, 0, bytes);
        } else {
            let mut padded = bytes.to_vec();
            padded.resize(padded_len as usize, 0);
            self.queue.write_buffer(raw, 0, &padded);
        }
    }

    fn create_module(&mut self, name: &str, _stage: ShaderStage, source: &str) -> WgpuModule {
        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(name),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });
        WgpuModule { module }
    }

    fn create_program(&mut self, name: &str, desc: ProgramDesc<'_, Self>) -> WgpuProgram {
        let mut bind_group_layouts = Vec::new();
        let mut uniforms = None;

        if desc.uniform_size > 0 {
            let size = u64::from(desc.uniform_size).next_multiple_of(UNIFORM_ALIGNMENT);

            let bgl = self.device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                label: Some(name),
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: NonZeroU64::new(size),
                    },
                    count: None,
                }],
            });

            let ubo = self.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some(name),
                size,
                usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            });

            let bind_group = self.device.create_bind_group(&wgpu::BindGroupDescriptor {
                label: Some(name),
                layout: &bgl,
                entries: &[wgpu::BindGroupEntry { binding: 0, resource: ubo.as_entire_binding() }],
            });

            bind_group_layouts.push(bgl);
            uniforms = Some((ubo, bind_group));
        }

        let bgl_refs: Vec<&wgpu::BindGroupLayout> = bind_group_layouts.iter().collect();
        let layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(name),
            bind_group_layouts: &bgl_refs,
            immediate_size: 0,
        });

        WgpuProgram {
            name: name.to_string(),
            vertex: desc.vertex.module.clone(),
            vertex_entry: desc.vertex_entry.to_string(),
            fragment: desc.fragment.module.clone(),
            fragment_entry: desc.fragment_entry.to_string(),
            layout,
            uniforms,
            pipelines: HashMap::new(),
        }
    }

    fn clear(&mut self, target: &RenderTarget<'_>, color: ColorRgba) {
        let mut encoder = self.encoder("foci clear encoder");
        {
            let _pass = Self::begin_pass(&mut encoder, target.view, wgpu::LoadOp::Clear(color.to_wgpu()));
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }

    fn draw(&mut self, target: &RenderTarget<'_>, call: DrawCall<'_, Self>) {
        let program = call.program;

        if let Some((ubo, _)) = &program.uniforms {
            self.queue.write_buffer(ubo, 0, call.uniforms);
        }

        let key = PipelineKey {
            vertex_array: call.vertex_array,
            layout_revision: call.layout_revision,
            format: target.format,
        };
        if !program.pipelines.contains_key(&key) {
            let pipeline = self.build_pipeline(program, &call.bindings, target.format);
            program.pipelines.insert(key, pipeline);
        }
        let Some(pipeline) = program.pipelines.get(&key) else { return };

        let mut encoder = self.encoder("foci draw encoder");
        {
            let mut pass = Self::begin_pass(&mut encoder, target.view, wgpu::LoadOp::Load);
            pass.set_pipeline(pipeline);
            if let Some((_, bind_group)) = &program.uniforms {
                pass.set_bind_group(0, bind_group, &[]);
            }
            for (slot, binding) in call.bindings.iter().enumerate() {
                let Some(raw) = binding.buffer.buffer.as_ref() else {
                    log::error!("{}: vertex buffer {} was never uploaded", call.program_name, binding.buffer.label);
                    return;
                };
                pass.set_vertex_buffer(slot as u32, raw.slice(u64::from(binding.attribute.offset)..));
            }
            pass.draw(call.first_vertex..call.first_vertex + call.vertex_count, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
    }
}

fn float_format(components: u32) -> wgpu::VertexFormat {
    match components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        _ => wgpu::VertexFormat::Float32x4,
    }
}
