//! WGPU-based renderer for the escape room.
//!
//! [`WgpuRenderer`] owns the surface, device and queue plus the renderers for the room and the
//! screen-space overlay. A frame is drawn in passes:
//!
//! 1. clear color and depth
//! 2. the room, depth tested
//! 3. overlay rectangles (crosshair, keypad panel, screen tints)
//! 4. HUD text
//!
//! The room is drawn on every screen so the title and end screens tint the last view instead of
//! replacing it.

use crate::game::GameState;
use crate::renderer::hud;
use crate::renderer::rectangle::RectangleRenderer;
use crate::renderer::room_renderer::RoomRenderer;
use crate::renderer::text::TextRenderer;
use wgpu::{SurfaceTexture, TextureView};

const CLEAR_COLOR: wgpu::Color = wgpu::Color {
    r: 0.01,
    g: 0.01,
    b: 0.015,
    a: 1.0,
};

pub struct WgpuRenderer {
    pub surface: wgpu::Surface<'static>,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub room_renderer: RoomRenderer,
    pub rectangle_renderer: RectangleRenderer,
}

impl WgpuRenderer {
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        width: u32,
        height: u32,
        wall_image: &image::RgbaImage,
    ) -> Result<Self, String> {
        let adapter = Self::create_adapter(instance, &surface).await?;
        let (device, queue) = Self::create_device(&adapter).await?;
        let surface_config = Self::create_surface_config(&surface, &adapter, width, height)?;

        surface.configure(&device, &surface_config);
        log::info!(
            "Surface configured: {}x{} {:?}",
            surface_config.width,
            surface_config.height,
            surface_config.format
        );

        let room_renderer = RoomRenderer::new(&device, &queue, surface_config.format, wall_image);
        let rectangle_renderer = RectangleRenderer::new(
            &device,
            surface_config.format,
            surface_config.width as f32,
            surface_config.height as f32,
        );

        Ok(Self {
            surface,
            surface_config,
            device,
            queue,
            room_renderer,
            rectangle_renderer,
        })
    }

    /// Reconfigures the surface. Zero-sized windows (minimised) are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.surface_config.width = width;
        self.surface_config.height = height;
        self.surface.configure(&self.device, &self.surface_config);
        self.rectangle_renderer
            .resize(width as f32, height as f32);
    }

    /// Records a full frame into `encoder`. The caller submits and presents the returned texture.
    pub fn update_canvas(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        game_state: &GameState,
        text_renderer: &mut TextRenderer,
    ) -> Result<SurfaceTexture, String> {
        let (surface_texture, surface_view) = self.get_surface_texture_and_view()?;
        let (width, height) = (self.surface_config.width, self.surface_config.height);
        let depth_texture_view = self
            .room_renderer
            .update_depth_texture(&self.device, width, height);
        let aspect = width as f32 / height.max(1) as f32;

        self.clear_render_target(encoder, &surface_view, &depth_texture_view);
        self.render_room(encoder, &surface_view, &depth_texture_view, game_state, aspect);
        self.render_overlay(encoder, &surface_view, game_state);
        self.render_text(encoder, &surface_view, text_renderer);

        Ok(surface_texture)
    }

    async fn create_adapter(
        instance: &wgpu::Instance,
        surface: &wgpu::Surface<'static>,
    ) -> Result<wgpu::Adapter, String> {
        instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                force_fallback_adapter: false,
                compatible_surface: Some(surface),
            })
            .await
            .ok_or_else(|| "Failed to find an appropriate adapter".to_string())
    }

    async fn create_device(
        adapter: &wgpu::Adapter,
    ) -> Result<(wgpu::Device, wgpu::Queue), String> {
        adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: None,
                    required_features: wgpu::Features::empty(),
                    required_limits: Default::default(),
                    memory_hints: Default::default(),
                },
                None,
            )
            .await
            .map_err(|e| format!("Failed to create device: {}", e))
    }

    /// Prefers an sRGB BGRA surface, then any sRGB format, then whatever comes first.
    fn create_surface_config(
        surface: &wgpu::Surface<'static>,
        adapter: &wgpu::Adapter,
        width: u32,
        height: u32,
    ) -> Result<wgpu::SurfaceConfiguration, String> {
        let capabilities = surface.get_capabilities(adapter);
        let format = capabilities
            .formats
            .iter()
            .find(|&&f| f == wgpu::TextureFormat::Bgra8UnormSrgb)
            .or_else(|| capabilities.formats.iter().find(|f| f.is_srgb()))
            .or_else(|| capabilities.formats.first())
            .copied()
            .ok_or_else(|| "Surface reports no supported formats".to_string())?;
        let alpha_mode = capabilities
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        Ok(wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            desired_maximum_frame_latency: 2,
            alpha_mode,
            view_formats: vec![],
        })
    }

    fn get_surface_texture_and_view(&mut self) -> Result<(SurfaceTexture, TextureView), String> {
        let surface_texture = match self.surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Outdated | wgpu::SurfaceError::Lost) => {
                // Reconfigure now so the next frame has a valid surface.
                self.surface.configure(&self.device, &self.surface_config);
                return Err("WGPU surface outdated".to_string());
            }
            Err(e) => {
                return Err(format!("Failed to acquire next swap chain texture: {}", e));
            }
        };

        let surface_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        Ok((surface_texture, surface_view))
    }

    fn clear_render_target(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &TextureView,
        depth_texture_view: &TextureView,
    ) {
        begin_pass(
            encoder,
            "Clear Pass",
            surface_view,
            Some(depth_texture_view),
            true,
        );
    }

    fn render_room(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &TextureView,
        depth_texture_view: &TextureView,
        game_state: &GameState,
        aspect: f32,
    ) {
        self.room_renderer
            .prepare(&self.device, &self.queue, game_state, aspect);

        let mut pass = begin_pass(
            encoder,
            "Room Render Pass",
            surface_view,
            Some(depth_texture_view),
            false,
        );
        self.room_renderer.render(&mut pass);
    }

    fn render_overlay(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &TextureView,
        game_state: &GameState,
    ) {
        let (width, height) = (self.surface_config.width, self.surface_config.height);
        self.rectangle_renderer
            .set_rectangles(hud::overlay_rectangles(game_state, width as f32, height as f32));

        let mut pass = begin_pass(encoder, "Overlay Render Pass", surface_view, None, false);
        self.rectangle_renderer.render(&self.device, &mut pass);
    }

    fn render_text(
        &mut self,
        encoder: &mut wgpu::CommandEncoder,
        surface_view: &TextureView,
        text_renderer: &mut TextRenderer,
    ) {
        text_renderer.resize(
            &self.queue,
            self.surface_config.width,
            self.surface_config.height,
        );
        if let Err(e) = text_renderer.prepare(&self.device, &self.queue) {
            log::warn!("Failed to prepare text renderer: {:?}", e);
            return;
        }

        let mut pass = begin_pass(encoder, "Text Render Pass", surface_view, None, false);
        if let Err(e) = text_renderer.render(&mut pass) {
            log::warn!("Text render failed: {:?}", e);
        }
    }
}

/// Starts a pass on the surface. With `clear` set, color and depth are cleared, otherwise the
/// previous pass's output is loaded.
fn begin_pass<'e>(
    encoder: &'e mut wgpu::CommandEncoder,
    label: &str,
    surface_view: &TextureView,
    depth_view: Option<&TextureView>,
    clear: bool,
) -> wgpu::RenderPass<'e> {
    let color_load = if clear {
        wgpu::LoadOp::Clear(CLEAR_COLOR)
    } else {
        wgpu::LoadOp::Load
    };
    let depth_load = if clear {
        wgpu::LoadOp::Clear(1.0)
    } else {
        wgpu::LoadOp::Load
    };

    encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
        label: Some(label),
        color_attachments: &[Some(wgpu::RenderPassColorAttachment {
            view: surface_view,
            resolve_target: None,
            ops: wgpu::Operations {
                load: color_load,
                store: wgpu::StoreOp::Store,
            },
        })],
        depth_stencil_attachment: depth_view.map(|view| wgpu::RenderPassDepthStencilAttachment {
            view,
            depth_ops: Some(wgpu::Operations {
                load: depth_load,
                store: wgpu::StoreOp::Store,
            }),
            stencil_ops: None,
        }),
        occlusion_query_set: None,
        timestamp_writes: None,
    })
}
