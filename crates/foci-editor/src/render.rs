//! Scene renderer.
//!
//! [`plan_frame`] turns scene and interaction state into per-shape draw
//! parameters without touching the GPU; [`ShapesRenderer`] submits a plan
//! through the gfx layer. Ellipses are drawn before circles so control points
//! stay on top.

use foci_engine::coords::{ColorRgba, Mat3, Vec2};
use foci_engine::gfx::{
    AttributeLocation, BufferHandle, Gfx, GfxBackend, GfxError, ProgramHandle, ShaderHandle,
    ShaderStage, UniformLocation, VertexArrayHandle,
};

use crate::config::RenderConfig;
use crate::interaction::{Interaction, InteractionMode};
use crate::scene::{ObjectId, Scene};

const PROJECTION_VERT: &str = include_str!("shaders/projection.vert.wgsl");
const ELLIPSE_FRAG: &str = include_str!("shaders/ellipse.frag.wgsl");
const CIRCLE_FRAG: &str = include_str!("shaders/circle.frag.wgsl");

/// Two triangles.
pub const QUAD_VERTEX_COUNT: u32 = 6;

/// Colors of one object kind, per interaction mode.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Palette {
    pub normal: ColorRgba,
    pub hovering: ColorRgba,
    pub dragging: ColorRgba,
}

impl Palette {
    pub fn color(&self, mode: InteractionMode) -> ColorRgba {
        match mode {
            InteractionMode::Normal => self.normal,
            InteractionMode::Hovering => self.hovering,
            InteractionMode::Dragging => self.dragging,
        }
    }
}

pub const ELLIPSE_PALETTE: Palette = Palette {
    normal: ColorRgba::rgb(0.0, 0.0, 1.0),
    hovering: ColorRgba::rgb(0.5, 0.0, 0.0),
    dragging: ColorRgba::rgb(0.4, 0.4, 0.5),
};

pub const CIRCLE_PALETTE: Palette = Palette {
    normal: ColorRgba::rgb(0.8, 0.8, 0.8),
    hovering: ColorRgba::rgb(0.1, 0.1, 0.4),
    dragging: ColorRgba::rgb(0.4, 0.2, 0.8),
};

#[derive(Debug, Clone, PartialEq)]
pub struct EllipseDraw {
    pub id: ObjectId,
    pub p0: Vec2,
    pub p1: Vec2,
    pub radius: f32,
    pub color: ColorRgba,
    /// Covers the whole viewport.
    pub quad: [Vec2; 6],
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleDraw {
    pub id: ObjectId,
    pub center: Vec2,
    pub radius: f32,
    pub color: ColorRgba,
    pub quad: [Vec2; 6],
}

/// Everything one frame submits, in submission order.
#[derive(Debug, Clone, PartialEq)]
pub struct FramePlan {
    pub clear_color: ColorRgba,
    pub proj: Mat3,
    pub lit_circles: bool,
    pub ellipses: Vec<EllipseDraw>,
    pub circles: Vec<CircleDraw>,
}

/// Triangle-list quad over the axis-aligned box `min..max`.
fn quad(min: Vec2, max: Vec2) -> [Vec2; 6] {
    let (xa, ya, xb, yb) = (min.x, min.y, max.x, max.y);
    [
        Vec2::new(xa, ya),
        Vec2::new(xa, yb),
        Vec2::new(xb, yb),
        Vec2::new(xa, ya),
        Vec2::new(xb, yb),
        Vec2::new(xb, ya),
    ]
}

pub fn plan_frame(scene: &Scene, interaction: &Interaction, config: &RenderConfig) -> FramePlan {
    let view = interaction.view();
    let [min, max] = view.visible_world_bounds();
    let screen = quad(min, max);

    let ellipses = scene
        .ellipses()
        .map(|(id, e)| {
            let [p0, p1] = scene.focus_points(e);
            EllipseDraw {
                id,
                p0,
                p1,
                radius: e.radius,
                color: ELLIPSE_PALETTE.color(interaction.mode_of(id)),
                quad: screen,
            }
        })
        .collect();

    let scale = config.circle_quad_scale.max(1.0);
    let circles = scene
        .circles()
        .map(|(id, c)| {
            let half = Vec2::new(scale * c.radius, scale * c.radius);
            CircleDraw {
                id,
                center: c.center,
                radius: c.radius,
                color: CIRCLE_PALETTE.color(interaction.mode_of(id)),
                quad: quad(c.center - half, c.center + half),
            }
        })
        .collect();

    FramePlan {
        clear_color: config.clear_color,
        proj: view.proj(),
        lit_circles: config.lit_circles,
        ellipses,
        circles,
    }
}

struct EllipseProgram {
    program: ProgramHandle,
    vertex_array: VertexArrayHandle,
    trans_mat: UniformLocation,
    p0: UniformLocation,
    p1: UniformLocation,
    radius: UniformLocation,
    color: UniformLocation,
}

struct CircleProgram {
    program: ProgramHandle,
    vertex_array: VertexArrayHandle,
    trans_mat: UniformLocation,
    center_point: UniformLocation,
    radius: UniformLocation,
    lit: UniformLocation,
    color: UniformLocation,
}

/// Owns the gfx registry and the two shape programs.
pub struct ShapesRenderer<B: GfxBackend> {
    gfx: Gfx<B>,
    ellipse: EllipseProgram,
    circle: CircleProgram,
    /// Shared by both programs; refilled before every draw.
    vertices: BufferHandle,
}

impl<B: GfxBackend> ShapesRenderer<B> {
    /// Compiles and links both programs and wires their vertex input.
    pub fn new(backend: B) -> Result<Self, GfxError> {
        let mut gfx = Gfx::new(backend);

        let projection = compile(&mut gfx, ShaderStage::Vertex, "projection.vert", PROJECTION_VERT)?;
        let ellipse_frag = compile(&mut gfx, ShaderStage::Fragment, "ellipse.frag", ELLIPSE_FRAG)?;
        let circle_frag = compile(&mut gfx, ShaderStage::Fragment, "circle.frag", CIRCLE_FRAG)?;

        let ellipse_program = link(&mut gfx, "ellipse", projection, ellipse_frag)?;
        let circle_program = link(&mut gfx, "circle", projection, circle_frag)?;

        let vertices = gfx.create_buffer();

        let ellipse = EllipseProgram {
            program: ellipse_program,
            vertex_array: position_array(&mut gfx, ellipse_program, vertices)?,
            trans_mat: gfx.get_uniform_location(ellipse_program, "trans_mat"),
            p0: gfx.get_uniform_location(ellipse_program, "p0"),
            p1: gfx.get_uniform_location(ellipse_program, "p1"),
            radius: gfx.get_uniform_location(ellipse_program, "radius"),
            color: gfx.get_uniform_location(ellipse_program, "color"),
        };

        let circle = CircleProgram {
            program: circle_program,
            vertex_array: position_array(&mut gfx, circle_program, vertices)?,
            trans_mat: gfx.get_uniform_location(circle_program, "trans_mat"),
            center_point: gfx.get_uniform_location(circle_program, "center_point"),
            radius: gfx.get_uniform_location(circle_program, "radius"),
            lit: gfx.get_uniform_location(circle_program, "lit"),
            color: gfx.get_uniform_location(circle_program, "color"),
        };

        log::info!("shape programs ready");
        Ok(Self { gfx, ellipse, circle, vertices })
    }

    pub fn gfx(&self) -> &Gfx<B> {
        &self.gfx
    }

    /// Clears `target` and draws the plan.
    pub fn draw(&mut self, target: &B::Target<'_>, plan: &FramePlan) -> Result<(), GfxError> {
        self.gfx.clear(target, plan.clear_color);

        for e in &plan.ellipses {
            let p = &self.ellipse;
            self.gfx.upload_buffer_data(self.vertices, bytemuck::cast_slice(&e.quad));
            self.gfx.set_uniform(p.program, p.trans_mat, plan.proj)?;
            self.gfx.set_uniform(p.program, p.color, e.color.to_rgb_array())?;
            self.gfx.set_uniform(p.program, p.radius, e.radius)?;
            self.gfx.set_uniform(p.program, p.p0, e.p0)?;
            self.gfx.set_uniform(p.program, p.p1, e.p1)?;
            self.gfx.draw(target, p.program, p.vertex_array, 0, QUAD_VERTEX_COUNT)?;
        }

        let lit = if plan.lit_circles { 1.0 } else { 0.0 };
        for c in &plan.circles {
            let p = &self.circle;
            self.gfx.upload_buffer_data(self.vertices, bytemuck::cast_slice(&c.quad));
            self.gfx.set_uniform(p.program, p.trans_mat, plan.proj)?;
            self.gfx.set_uniform(p.program, p.center_point, c.center)?;
            self.gfx.set_uniform(p.program, p.radius, c.radius)?;
            self.gfx.set_uniform(p.program, p.lit, lit)?;
            self.gfx.set_uniform(p.program, p.color, c.color.to_rgb_array())?;
            self.gfx.draw(target, p.program, p.vertex_array, 0, QUAD_VERTEX_COUNT)?;
        }

        Ok(())
    }
}

fn compile<B: GfxBackend>(
    gfx: &mut Gfx<B>,
    stage: ShaderStage,
    name: &str,
    source: &str,
) -> Result<ShaderHandle, GfxError> {
    let shader = gfx.create_shader(stage, name);
    gfx.set_shader_source(shader, source);
    gfx.compile_shader(shader)?;
    Ok(shader)
}

fn link<B: GfxBackend>(
    gfx: &mut Gfx<B>,
    name: &str,
    vertex: ShaderHandle,
    fragment: ShaderHandle,
) -> Result<ProgramHandle, GfxError> {
    let program = gfx.create_program(name);
    gfx.attach_shader(program, vertex)?;
    gfx.attach_shader(program, fragment)?;
    gfx.link_program(program)?;
    Ok(program)
}

/// Vertex array feeding `position` as packed `vec2<f32>` from `buffer`.
fn position_array<B: GfxBackend>(
    gfx: &mut Gfx<B>,
    program: ProgramHandle,
    buffer: BufferHandle,
) -> Result<VertexArrayHandle, GfxError> {
    let vertex_array = gfx.create_vertex_array();
    let position: AttributeLocation = gfx.get_attribute_location(program, "position");
    gfx.set_vertex_attribute(vertex_array, position, buffer, 2, std::mem::size_of::<Vec2>() as u32, 0)?;
    Ok(vertex_array)
}
