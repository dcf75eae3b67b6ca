use crate::coords::{Mat3, Vec2};

/// Uniform member types understood by the resource layer.
///
/// Layout follows WGSL host-shareable rules: `vec3` occupies 12 bytes (16-byte
/// aligned) and `mat3x3` stores three columns on a 16-byte stride.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformType {
    F32,
    Vec2,
    Vec3,
    Vec4,
    Mat3,
}

impl UniformType {
    /// Bytes written when a value of this type is stored.
    pub const fn size(self) -> usize {
        match self {
            UniformType::F32 => 4,
            UniformType::Vec2 => 8,
            UniformType::Vec3 => 12,
            UniformType::Vec4 => 16,
            UniformType::Mat3 => 44,
        }
    }

    pub const fn wgsl_name(self) -> &'static str {
        match self {
            UniformType::F32 => "f32",
            UniformType::Vec2 => "vec2<f32>",
            UniformType::Vec3 => "vec3<f32>",
            UniformType::Vec4 => "vec4<f32>",
            UniformType::Mat3 => "mat3x3<f32>",
        }
    }
}

/// Value passed to [`Gfx::set_uniform`](super::Gfx::set_uniform).
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    F32(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat3(Mat3),
}

const MAT3_COLUMN_STRIDE: usize = 16;

impl UniformValue {
    pub fn ty(&self) -> UniformType {
        match self {
            UniformValue::F32(_) => UniformType::F32,
            UniformValue::Vec2(_) => UniformType::Vec2,
            UniformValue::Vec3(_) => UniformType::Vec3,
            UniformValue::Vec4(_) => UniformType::Vec4,
            UniformValue::Mat3(_) => UniformType::Mat3,
        }
    }

    /// Writes the value at the start of `dst`.
    ///
    /// `dst` must hold at least `self.ty().size()` bytes.
    pub(crate) fn write_to(&self, dst: &mut [u8]) {
        match self {
            UniformValue::F32(v) => put(dst, bytemuck::bytes_of(v)),
            UniformValue::Vec2(v) => put(dst, bytemuck::cast_slice(v)),
            UniformValue::Vec3(v) => put(dst, bytemuck::cast_slice(v)),
            UniformValue::Vec4(v) => put(dst, bytemuck::cast_slice(v)),
            UniformValue::Mat3(m) => {
                for j in 0..3 {
                    let column = m.column(j);
                    put(&mut dst[j * MAT3_COLUMN_STRIDE..], bytemuck::cast_slice(&column));
                }
            }
        }
    }
}

fn put(dst: &mut [u8], src: &[u8]) {
    dst[..src.len()].copy_from_slice(src);
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::F32(v)
    }
}

impl From<[f32; 2]> for UniformValue {
    fn from(v: [f32; 2]) -> Self {
        UniformValue::Vec2(v)
    }
}

impl From<Vec2> for UniformValue {
    fn from(v: Vec2) -> Self {
        UniformValue::Vec2([v.x, v.y])
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        UniformValue::Vec3(v)
    }
}

impl From<[f32; 4]> for UniformValue {
    fn from(v: [f32; 4]) -> Self {
        UniformValue::Vec4(v)
    }
}

impl From<Mat3> for UniformValue {
    fn from(m: Mat3) -> Self {
        UniformValue::Mat3(m)
    }
}
