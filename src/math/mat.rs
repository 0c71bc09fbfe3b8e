use crate::math::vec::Vec3;

/// Column-major 4x4 matrix, laid out the way WGSL reads `mat4x4<f32>`.
///
/// `m.0[column][row]`. [`Mat4::multiply`] composes as `self * other`, so
/// `projection.multiply(&view)` yields the usual clip-from-world matrix.
#[repr(transparent)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Mat4(pub [[f32; 4]; 4]);

impl Mat4 {
    pub fn identity() -> Mat4 {
        Mat4([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Right-handed perspective projection with a `[0, 1]` depth range.
    pub fn perspective(
        field_of_view_y_in_radians: f32,
        aspect: f32,
        z_near: f32,
        z_far: f32,
    ) -> Mat4 {
        let f = 1.0 / (field_of_view_y_in_radians * 0.5).tan();
        let range_reciprocal = 1.0 / (z_near - z_far);

        Mat4([
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, z_far * range_reciprocal, -1.0],
            [0.0, 0.0, z_far * z_near * range_reciprocal, 0.0],
        ])
    }

    pub fn translation(tx: f32, ty: f32, tz: f32) -> Mat4 {
        Mat4([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [tx, ty, tz, 1.0],
        ])
    }

    /// Right-handed view matrix for a camera at `eye` looking along `forward`.
    pub fn look_to(eye: Vec3, forward: Vec3, up: Vec3) -> Mat4 {
        let f = forward.normalize();
        let s = f.cross(&up).normalize();
        let u = s.cross(&f);

        Mat4([
            [s.x(), u.x(), -f.x(), 0.0],
            [s.y(), u.y(), -f.y(), 0.0],
            [s.z(), u.z(), -f.z(), 0.0],
            [-s.dot(&eye), -u.dot(&eye), f.dot(&eye), 1.0],
        ])
    }

    pub fn multiply(&self, b: &Mat4) -> Mat4 {
        let mut result = [[0.0; 4]; 4];
        for (i, row) in result.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = (0..4).map(|k| b.0[i][k] * self.0[k][j]).sum();
            }
        }
        Mat4(result)
    }

    /// Applies the matrix to a homogeneous column vector.
    pub fn transform(&self, v: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0; 4];
        for (row, value) in out.iter_mut().enumerate() {
            *value = (0..4).map(|col| self.0[col][row] * v[col]).sum();
        }
        out
    }
}

impl From<[[f32; 4]; 4]> for Mat4 {
    fn from(matrix: [[f32; 4]; 4]) -> Self {
        Mat4(matrix)
    }
}

impl From<Mat4> for [[f32; 4]; 4] {
    fn from(matrix: Mat4) -> Self {
        matrix.0
    }
}
