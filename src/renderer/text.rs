//! Text rendering on top of glyphon.
//!
//! [`TextRenderer`] keeps a set of named text buffers, each with its own style, position and
//! visibility. Callers create a buffer once and then update its text every frame; the whole set
//! is prepared and drawn in one glyphon pass.

use glyphon::{
    Attrs, Buffer, Cache, Color, Family, FontSystem, Metrics, Resolution, Shaping, Style,
    SwashCache, TextArea, TextAtlas, TextBounds, TextRenderer as GlyphonTextRenderer, Viewport,
    Weight,
};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Optional font shipped next to the game. System sans-serif is used when it is absent.
pub const HUD_FONT_PATH: &str = "assets/fonts/hud.ttf";
pub const HUD_FONT_NAME: &str = "HUD";

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    /// Name of a font registered with [`TextRenderer::load_font`]. Anything else renders in
    /// the system sans-serif face.
    pub font_family: String,
    pub font_size: f32,
    pub line_height: f32,
    pub color: Color,
    pub weight: Weight,
    pub style: Style,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: HUD_FONT_NAME.to_string(),
            font_size: 18.0,
            line_height: 24.0,
            color: Color::rgb(255, 255, 255),
            weight: Weight::NORMAL,
            style: Style::Normal,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextPosition {
    pub x: f32,
    pub y: f32,
    pub max_width: Option<f32>,
    pub max_height: Option<f32>,
}

#[derive(Debug)]
pub struct TextBuffer {
    pub buffer: Buffer,
    pub style: TextStyle,
    pub position: TextPosition,
    pub visible: bool,
    /// Last text set, kept so a style change can reshape it.
    pub text_content: String,
}

fn attrs_for<'a>(style: &'a TextStyle, loaded_fonts: &[String]) -> Attrs<'a> {
    let family = if loaded_fonts.contains(&style.font_family) {
        Family::Name(&style.font_family)
    } else {
        Family::SansSerif
    };
    Attrs::new()
        .family(family)
        .weight(style.weight)
        .style(style.style)
}

fn buffer_mut<'a>(
    buffers: &'a mut HashMap<String, TextBuffer>,
    id: &str,
) -> Result<&'a mut TextBuffer, String> {
    buffers
        .get_mut(id)
        .ok_or_else(|| format!("Text buffer '{}' not found", id))
}

pub struct TextRenderer {
    pub font_system: FontSystem,
    pub swash_cache: SwashCache,
    pub viewport: Viewport,
    pub atlas: TextAtlas,
    pub text_renderer: GlyphonTextRenderer,
    pub text_buffers: HashMap<String, TextBuffer>,
    pub window_scale_factor: f32,
    pub window_size: winit::dpi::PhysicalSize<u32>,
    pub loaded_fonts: Vec<String>,
}

impl TextRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        window_size: winit::dpi::PhysicalSize<u32>,
        window_scale_factor: f32,
    ) -> Self {
        let font_system = FontSystem::new();
        let swash_cache = SwashCache::new();
        let cache = Cache::new(device);
        let viewport = Viewport::new(device, &cache);
        let mut atlas = TextAtlas::new(device, queue, &cache, surface_format);
        let text_renderer =
            GlyphonTextRenderer::new(&mut atlas, device, wgpu::MultisampleState::default(), None);

        let mut renderer = Self {
            font_system,
            swash_cache,
            viewport,
            atlas,
            text_renderer,
            text_buffers: HashMap::new(),
            window_scale_factor,
            window_size,
            loaded_fonts: Vec::new(),
        };

        if let Err(e) = renderer.load_font(HUD_FONT_PATH, HUD_FONT_NAME) {
            log::info!("No HUD font at {} ({}), using system fonts", HUD_FONT_PATH, e);
        }

        renderer
    }

    pub fn load_font(&mut self, font_path: &str, font_name: &str) -> Result<(), std::io::Error> {
        let font_data = fs::read(Path::new(font_path))?;
        self.font_system.db_mut().load_font_data(font_data);
        self.loaded_fonts.push(font_name.to_string());
        log::info!("Loaded font {} from {}", font_name, font_path);
        Ok(())
    }

    /// Creates (or replaces) the buffer `id`.
    pub fn create_text_buffer(
        &mut self,
        id: &str,
        text: &str,
        style: TextStyle,
        position: TextPosition,
    ) {
        let metrics = Metrics::new(style.font_size, style.line_height);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);

        let width = position.max_width.unwrap_or(self.window_size.width as f32);
        let height = position
            .max_height
            .unwrap_or(self.window_size.height as f32);
        buffer.set_size(&mut self.font_system, Some(width), Some(height));
        buffer.set_text(
            &mut self.font_system,
            text,
            attrs_for(&style, &self.loaded_fonts),
            Shaping::Advanced,
        );
        buffer.shape_until_scroll(&mut self.font_system, false);

        log::debug!("Created text buffer '{}' ({}x{})", id, width, height);
        self.text_buffers.insert(
            id.to_string(),
            TextBuffer {
                buffer,
                style,
                position,
                visible: true,
                text_content: text.to_string(),
            },
        );
    }

    /// Replaces the text of `id`. Reshaping is skipped when the text has not changed.
    pub fn update_text(&mut self, id: &str, text: &str) -> Result<(), String> {
        let text_buffer = buffer_mut(&mut self.text_buffers, id)?;
        if text_buffer.text_content == text {
            return Ok(());
        }

        text_buffer.buffer.set_text(
            &mut self.font_system,
            text,
            attrs_for(&text_buffer.style, &self.loaded_fonts),
            Shaping::Advanced,
        );
        text_buffer
            .buffer
            .shape_until_scroll(&mut self.font_system, false);
        text_buffer.text_content = text.to_string();
        Ok(())
    }

    /// Changes only the color, which glyphon applies at prepare time without reshaping.
    pub fn update_color(&mut self, id: &str, color: Color) -> Result<(), String> {
        let text_buffer = buffer_mut(&mut self.text_buffers, id)?;
        text_buffer.style.color = color;
        Ok(())
    }

    pub fn update_position(&mut self, id: &str, position: TextPosition) -> Result<(), String> {
        let text_buffer = buffer_mut(&mut self.text_buffers, id)?;

        if text_buffer.position.max_width != position.max_width
            || text_buffer.position.max_height != position.max_height
        {
            let width = position.max_width.unwrap_or(self.window_size.width as f32);
            let height = position
                .max_height
                .unwrap_or(self.window_size.height as f32);
            text_buffer
                .buffer
                .set_size(&mut self.font_system, Some(width), Some(height));
        }

        text_buffer.position = position;
        Ok(())
    }

    pub fn set_visible(&mut self, id: &str, visible: bool) -> Result<(), String> {
        let text_buffer = buffer_mut(&mut self.text_buffers, id)?;
        text_buffer.visible = visible;
        Ok(())
    }

    pub fn resize(&mut self, queue: &wgpu::Queue, width: u32, height: u32) {
        self.window_size = winit::dpi::PhysicalSize::new(width, height);
        self.viewport.update(queue, Resolution { width, height });
    }

    pub fn prepare(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<(), glyphon::PrepareError> {
        let (screen_width, screen_height) = (
            self.window_size.width as f32,
            self.window_size.height as f32,
        );
        let text_areas: Vec<TextArea> = self
            .text_buffers
            .values()
            .filter(|buffer| buffer.visible && !buffer.text_content.is_empty())
            .map(|buffer| TextArea {
                buffer: &buffer.buffer,
                left: buffer.position.x,
                top: buffer.position.y,
                scale: self.window_scale_factor,
                bounds: TextBounds {
                    left: buffer.position.x as i32,
                    top: buffer.position.y as i32,
                    right: (buffer.position.x
                        + buffer.position.max_width.unwrap_or(screen_width))
                        as i32,
                    bottom: (buffer.position.y
                        + buffer.position.max_height.unwrap_or(screen_height))
                        as i32,
                },
                default_color: buffer.style.color,
                custom_glyphs: &[],
            })
            .collect();

        self.text_renderer.prepare(
            device,
            queue,
            &mut self.font_system,
            &mut self.atlas,
            &self.viewport,
            text_areas,
            &mut self.swash_cache,
        )
    }

    pub fn render(&mut self, render_pass: &mut wgpu::RenderPass) -> Result<(), glyphon::RenderError> {
        self.text_renderer
            .render(&self.atlas, &self.viewport, render_pass)
    }

    /// Drops glyphs not used since the last frame from the atlas.
    pub fn trim(&mut self) {
        self.atlas.trim();
    }
}
