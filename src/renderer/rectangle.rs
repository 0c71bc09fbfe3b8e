//! # Screen-space Rectangles
//!
//! Flat colored rectangles drawn over the 3D view: the crosshair, the keypad panel and the
//! tint behind the title and end screens. Rectangles are queued in pixel coordinates, batched
//! into one vertex and index buffer and drawn with alpha blending.

use crate::renderer::pipeline_builder::{PipelineBuilder, create_vertex_buffer};
use wgpu::util::DeviceExt;

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
struct RectVertex {
    /// Position in normalized device coordinates.
    position: [f32; 2],
    color: [f32; 4],
}

impl RectVertex {
    const ATTRIBUTES: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x2, 1 => Float32x4];

    fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<RectVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Axis-aligned rectangle in window pixels, origin at the top-left corner.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Linear RGBA.
    pub color: [f32; 4],
}

impl Rectangle {
    pub fn new(x: f32, y: f32, width: f32, height: f32, color: [f32; 4]) -> Self {
        Self {
            x,
            y,
            width,
            height,
            color,
        }
    }

    /// Rectangle of the given size centred on `(cx, cy)`.
    pub fn centered(cx: f32, cy: f32, width: f32, height: f32, color: [f32; 4]) -> Self {
        Self::new(cx - width / 2.0, cy - height / 2.0, width, height, color)
    }
}

/// Converts rectangles to NDC quads. Screen space has `y` growing downwards, NDC upwards.
fn batch(
    rectangles: &[Rectangle],
    window_width: f32,
    window_height: f32,
) -> (Vec<RectVertex>, Vec<u16>) {
    let mut vertices = Vec::with_capacity(rectangles.len() * 4);
    let mut indices = Vec::with_capacity(rectangles.len() * 6);

    for rectangle in rectangles {
        let left = (rectangle.x / window_width) * 2.0 - 1.0;
        let right = ((rectangle.x + rectangle.width) / window_width) * 2.0 - 1.0;
        let top = 1.0 - (rectangle.y / window_height) * 2.0;
        let bottom = 1.0 - ((rectangle.y + rectangle.height) / window_height) * 2.0;

        let base = vertices.len() as u16;
        for position in [[left, top], [right, top], [right, bottom], [left, bottom]] {
            vertices.push(RectVertex {
                position,
                color: rectangle.color,
            });
        }
        indices.extend_from_slice(&[base, base + 2, base + 1, base, base + 3, base + 2]);
    }
    (vertices, indices)
}

pub struct RectangleRenderer {
    render_pipeline: wgpu::RenderPipeline,
    rectangles: Vec<Rectangle>,
    window_width: f32,
    window_height: f32,
}

impl RectangleRenderer {
    pub fn new(
        device: &wgpu::Device,
        surface_format: wgpu::TextureFormat,
        window_width: f32,
        window_height: f32,
    ) -> Self {
        let render_pipeline =
            PipelineBuilder::new(device, surface_format, include_str!("shaders/rectangle.wgsl"))
                .with_label("Rectangle Pipeline")
                .with_vertex_buffer(RectVertex::desc())
                .with_alpha_blending()
                .with_no_culling()
                .build();

        Self {
            render_pipeline,
            rectangles: Vec::new(),
            window_width,
            window_height,
        }
    }

    pub fn set_rectangles(&mut self, rectangles: Vec<Rectangle>) {
        self.rectangles = rectangles;
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.window_width = width.max(1.0);
        self.window_height = height.max(1.0);
    }

    /// Draws every queued rectangle in one call.
    pub fn render(&mut self, device: &wgpu::Device, render_pass: &mut wgpu::RenderPass) {
        if self.rectangles.is_empty() {
            return;
        }

        let (vertices, indices) = batch(&self.rectangles, self.window_width, self.window_height);
        let vertex_buffer = create_vertex_buffer(device, &vertices, "Rectangle Vertex Buffer");
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Rectangle Index Buffer"),
            contents: bytemuck::cast_slice(&indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        render_pass.set_pipeline(&self.render_pipeline);
        render_pass.set_vertex_buffer(0, vertex_buffer.slice(..));
        render_pass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint16);
        render_pass.draw_indexed(0..indices.len() as u32, 0, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_window_rectangle_covers_ndc() {
        let rect = Rectangle::new(0.0, 0.0, 800.0, 600.0, [1.0; 4]);
        let (vertices, indices) = batch(&[rect], 800.0, 600.0);
        let positions: Vec<_> = vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![[-1.0, 1.0], [1.0, 1.0], [1.0, -1.0], [-1.0, -1.0]]
        );
        assert_eq!(indices, vec![0, 2, 1, 0, 3, 2]);
    }

    #[test]
    fn indices_offset_per_rectangle() {
        let rects = vec![
            Rectangle::centered(100.0, 100.0, 10.0, 10.0, [1.0; 4]),
            Rectangle::centered(200.0, 100.0, 10.0, 10.0, [1.0; 4]),
        ];
        let (vertices, indices) = batch(&rects, 400.0, 200.0);
        assert_eq!(vertices.len(), 8);
        assert_eq!(&indices[6..], &[4, 6, 5, 4, 7, 6]);
        let [x, y] = vertices[4].position;
        assert!((x + 0.025).abs() < 1e-6 && (y - 0.05).abs() < 1e-6);
    }
}
