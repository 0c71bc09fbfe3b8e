//! [`AppState`]: the running session once a window exists.

use crate::game::GameState;
use crate::game::keys::KeyState;
use crate::renderer::hud::Hud;
use crate::renderer::text::TextRenderer;
use crate::renderer::texture;
use crate::renderer::wgpu_lib::WgpuRenderer;
use std::time::Instant;
use winit::window::{CursorGrabMode, Window};

pub struct AppState {
    pub wgpu_renderer: WgpuRenderer,
    pub game_state: GameState,
    pub key_state: KeyState,
    pub text_renderer: TextRenderer,
    pub last_frame: Instant,
    /// Whether the cursor is currently grabbed, so the window is only touched on changes.
    cursor_grabbed: bool,
}

impl AppState {
    pub async fn new(
        instance: &wgpu::Instance,
        surface: wgpu::Surface<'static>,
        window: &Window,
        game_state: GameState,
    ) -> Result<Self, String> {
        let size = window.inner_size();
        let wall_image = texture::load_or_fallback(&game_state.config.wall_texture);
        let wgpu_renderer =
            WgpuRenderer::new(instance, surface, size.width, size.height, &wall_image).await?;

        let mut text_renderer = TextRenderer::new(
            &wgpu_renderer.device,
            &wgpu_renderer.queue,
            wgpu_renderer.surface_config.format,
            size,
            window.scale_factor() as f32,
        );
        Hud::init(
            &mut text_renderer,
            wgpu_renderer.surface_config.width,
            wgpu_renderer.surface_config.height,
        );

        Ok(Self {
            wgpu_renderer,
            game_state,
            key_state: KeyState::new(),
            text_renderer,
            last_frame: Instant::now(),
            cursor_grabbed: false,
        })
    }

    pub fn resize_surface(&mut self, width: u32, height: u32) {
        self.wgpu_renderer.resize(width, height);
        Hud::resize(&mut self.text_renderer, width, height);
    }

    /// Grabs or releases the cursor to match [`GameState::capture_mouse`].
    pub fn triage_mouse(&mut self, window: &Window) {
        let capture = self.game_state.capture_mouse;
        if capture == self.cursor_grabbed {
            return;
        }
        self.cursor_grabbed = capture;

        if capture {
            // Not every platform can lock the pointer; confining it still keeps it in the window.
            let grabbed = window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
            if let Err(e) = grabbed {
                log::warn!("Failed to grab cursor: {}", e);
            }
            window.set_cursor_visible(false);
        } else {
            if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                log::warn!("Failed to release cursor: {}", e);
            }
            window.set_cursor_visible(true);
        }
    }
}
