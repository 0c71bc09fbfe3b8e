//! Vertex and uniform layouts shared by the room shader.

use crate::game::state_manager::FlashlightColor;
use crate::math::mat::Mat4;
use crate::math::vec::Vec3;

/// Lit by ambient light and the flashlight.
pub const MATERIAL_SOLID: u32 = 0;
/// Like [`MATERIAL_SOLID`], with the wall texture multiplied in.
pub const MATERIAL_TEXTURED: u32 = 1;
/// Ignores lighting. Used for indicator lights and the selection highlight.
pub const MATERIAL_EMISSIVE: u32 = 2;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [u8; 4],
    pub material: u32,
}

impl Vertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x2,
        3 => Unorm8x4,
        4 => Uint32,
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Per-frame camera and lighting parameters.
///
/// Every field is a 16-byte column so the layout matches WGSL uniform rules without padding
/// fields.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Uniforms {
    pub view_proj: [[f32; 4]; 4],
    /// Eye position; `w` unused.
    pub camera_position: [f32; 4],
    /// Flashlight direction; `w` unused.
    pub camera_forward: [f32; 4],
    /// Flashlight color in `rgb`, intensity in `w`.
    pub flashlight: [f32; 4],
    /// Ambient light in `rgb`; `w` unused.
    pub ambient: [f32; 4],
    /// Cosine of the inner cone, cosine of the outer cone, range in metres.
    pub spot: [f32; 4],
}

impl Default for Uniforms {
    fn default() -> Self {
        Self::new()
    }
}

impl Uniforms {
    pub const AMBIENT: [f32; 3] = [0.16, 0.15, 0.17];
    pub const FLASHLIGHT_INTENSITY: f32 = 2.2;
    pub const INNER_CONE_DEGREES: f32 = 14.0;
    pub const OUTER_CONE_DEGREES: f32 = 26.0;
    pub const RANGE: f32 = 12.0;

    pub fn new() -> Self {
        Self {
            view_proj: Mat4::identity().into(),
            camera_position: [0.0, 0.0, 0.0, 1.0],
            camera_forward: [0.0, 0.0, -1.0, 0.0],
            flashlight: [1.0, 1.0, 1.0, Self::FLASHLIGHT_INTENSITY],
            ambient: [Self::AMBIENT[0], Self::AMBIENT[1], Self::AMBIENT[2], 0.0],
            spot: [
                Self::INNER_CONE_DEGREES.to_radians().cos(),
                Self::OUTER_CONE_DEGREES.to_radians().cos(),
                Self::RANGE,
                0.0,
            ],
        }
    }

    /// Camera and spotlight for a frame seen from `eye` looking along `forward`.
    pub fn update(&mut self, view_proj: Mat4, eye: Vec3, forward: Vec3, light: FlashlightColor) {
        let [r, g, b] = light.rgb();
        self.view_proj = view_proj.into();
        self.camera_position = [eye.x(), eye.y(), eye.z(), 1.0];
        self.camera_forward = [forward.x(), forward.y(), forward.z(), 0.0];
        self.flashlight = [r, g, b, Self::FLASHLIGHT_INTENSITY];
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }
}
