use core::ops::Mul;

use super::Vec2;

/// 3x3 matrix for 2D affine transforms, stored row-major.
///
/// Points are treated as column vectors `(x, y, 1)`; `rows[i][2]` holds the
/// translation of row `i`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Mat3 {
    pub rows: [[f32; 3]; 3],
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        rows: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    #[inline]
    pub const fn from_rows(rows: [[f32; 3]; 3]) -> Self {
        Self { rows }
    }

    /// Axis-aligned scale followed by translation: `p' = (sx * x + tx, sy * y + ty)`.
    #[inline]
    pub const fn scale_translate(sx: f32, sy: f32, tx: f32, ty: f32) -> Self {
        Self {
            rows: [[sx, 0.0, tx], [0.0, sy, ty], [0.0, 0.0, 1.0]],
        }
    }

    /// Inverse of a matrix built by [`scale_translate`](Self::scale_translate).
    ///
    /// Only the diagonal scale and translation column are read; the result is
    /// `(1/sx, 1/sy, -tx/sx, -ty/sy)`. Returns `None` when either scale is zero
    /// or not finite.
    pub fn inverse_scale_translate(&self) -> Option<Mat3> {
        let [[sx, _, tx], [_, sy, ty], _] = self.rows;
        debug_assert!(
            self.rows[0][1] == 0.0 && self.rows[1][0] == 0.0 && self.rows[2] == [0.0, 0.0, 1.0],
            "inverse_scale_translate on a matrix with shear or projection: {self:?}"
        );

        if sx == 0.0 || sy == 0.0 || !sx.is_finite() || !sy.is_finite() {
            return None;
        }

        Some(Mat3::scale_translate(1.0 / sx, 1.0 / sy, -tx / sx, -ty / sy))
    }

    /// Applies the transform to a point (`w = 1`).
    #[inline]
    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        let r = &self.rows;
        Vec2::new(
            r[0][0] * p.x + r[0][1] * p.y + r[0][2],
            r[1][0] * p.x + r[1][1] * p.y + r[1][2],
        )
    }

    /// Returns column `j` as a 3-vector.
    #[inline]
    pub fn column(&self, j: usize) -> [f32; 3] {
        [self.rows[0][j], self.rows[1][j], self.rows[2][j]]
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat3 {
    type Output = Mat3;

    fn mul(self, rhs: Mat3) -> Mat3 {
        let mut rows = [[0.0f32; 3]; 3];
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..3).map(|k| self.rows[i][k] * rhs.rows[k][j]).sum();
            }
        }
        Mat3 { rows }
    }
}
