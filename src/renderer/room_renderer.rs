//! Draws the current room: shell, interactables and cubes, lit by the flashlight.

use crate::game::GameState;
use crate::renderer::mesh::build_room_vertices;
use crate::renderer::pipeline_builder::{
    BindGroupLayoutBuilder, PipelineBuilder, create_depth_texture, create_uniform_buffer,
    depth_stencil_state,
};
use crate::renderer::primitives::{Uniforms, Vertex};
use crate::renderer::texture::WallTexture;

const Z_NEAR: f32 = 0.05;
const Z_FAR: f32 = 100.0;

pub struct RoomRenderer {
    pub pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    /// Vertices the buffer can hold before it has to be reallocated.
    vertex_capacity: usize,
    pub vertex_count: u32,
    uniforms: Uniforms,
    pub uniform_buffer: wgpu::Buffer,
    pub uniform_bind_group: wgpu::BindGroup,
    wall_texture: WallTexture,
    pub depth_texture: Option<wgpu::Texture>,
}

impl RoomRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        wall_image: &image::RgbaImage,
    ) -> Self {
        let uniforms = Uniforms::new();
        let uniform_buffer = create_uniform_buffer(device, &uniforms, "Room Uniform Buffer");
        let uniform_bind_group_layout = BindGroupLayoutBuilder::new(device)
            .with_label("Room Uniform Layout")
            .with_uniform_buffer(0, wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT)
            .build();
        let uniform_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Room Uniform Bind Group"),
            layout: &uniform_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let wall_texture = WallTexture::new(device, queue, wall_image);

        let pipeline =
            PipelineBuilder::new(device, surface_format, include_str!("shaders/room.wgsl"))
                .with_label("Room Pipeline")
                .with_vertex_buffer(Vertex::desc())
                .with_bind_group_layout(&uniform_bind_group_layout)
                .with_bind_group_layout(&wall_texture.bind_group_layout)
                .with_no_culling()
                .with_depth_stencil(depth_stencil_state())
                .build();

        let vertex_capacity = 4096;
        Self {
            pipeline,
            vertex_buffer: Self::create_vertex_buffer(device, vertex_capacity),
            vertex_capacity,
            vertex_count: 0,
            uniforms,
            uniform_buffer,
            uniform_bind_group,
            wall_texture,
            depth_texture: None,
        }
    }

    fn create_vertex_buffer(device: &wgpu::Device, capacity: usize) -> wgpu::Buffer {
        device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Room Vertex Buffer"),
            size: (capacity * std::mem::size_of::<Vertex>()) as wgpu::BufferAddress,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        })
    }

    /// Depth view matching the surface, recreating the texture when the size changed.
    pub fn update_depth_texture(
        &mut self,
        device: &wgpu::Device,
        width: u32,
        height: u32,
    ) -> wgpu::TextureView {
        let stale = self
            .depth_texture
            .as_ref()
            .is_some_and(|texture| texture.width() != width || texture.height() != height);
        if stale {
            self.depth_texture = None;
        }
        self.depth_texture
            .get_or_insert_with(|| create_depth_texture(device, width, height))
            .create_view(&wgpu::TextureViewDescriptor::default())
    }

    /// Rebuilds the room mesh and uploads it together with the camera and flashlight.
    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        game_state: &GameState,
        aspect: f32,
    ) {
        let session = &game_state.session;
        let vertices = build_room_vertices(
            session.scene.current_room(),
            &session.state,
            &session.cube_puzzles,
            game_state.target.as_ref(),
        );

        if vertices.len() > self.vertex_capacity {
            self.vertex_capacity = vertices.len().next_power_of_two();
            log::debug!("Growing room vertex buffer to {}", self.vertex_capacity);
            self.vertex_buffer = Self::create_vertex_buffer(device, self.vertex_capacity);
        }
        queue.write_buffer(&self.vertex_buffer, 0, bytemuck::cast_slice(&vertices));
        self.vertex_count = vertices.len() as u32;

        let player = &game_state.player;
        self.uniforms.update(
            player.get_view_proj_matrix(aspect, Z_NEAR, Z_FAR),
            player.eye(),
            player.forward(),
            session.state.flashlight(),
        );
        queue.write_buffer(&self.uniform_buffer, 0, self.uniforms.as_bytes());
    }

    pub fn render(&self, pass: &mut wgpu::RenderPass) {
        if self.vertex_count == 0 {
            return;
        }
        pass.set_pipeline(&self.pipeline);
        pass.set_bind_group(0, &self.uniform_bind_group, &[]);
        pass.set_bind_group(1, &self.wall_texture.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.draw(0..self.vertex_count, 0..1);
    }
}
