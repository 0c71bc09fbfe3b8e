//! Per-frame update for [`App`].

use super::app_state::AppState;
use super::event_handler::App;
use crate::renderer::hud::{Hud, hud_text};
use std::time::Instant;

impl App {
    pub fn handle_redraw(&mut self) {
        let (Some(window), Some(state)) = (self.window.as_ref(), self.state.as_mut()) else {
            return;
        };
        if window.is_minimized().unwrap_or(false) {
            return;
        }

        let now = Instant::now();
        let frame_seconds = now.duration_since(state.last_frame).as_secs_f32();
        state.last_frame = now;

        state.update(frame_seconds);
        state.triage_mouse(window);
        state.render();
    }
}

impl AppState {
    /// Runs as many fixed simulation steps as `frame_seconds` covers, then refreshes the HUD.
    pub fn update(&mut self, frame_seconds: f32) {
        let steps = self.game_state.timestep.advance(frame_seconds);
        let step = self.game_state.timestep.step();
        let input = self.key_state.move_input();
        for _ in 0..steps {
            self.game_state.step(step, input);
        }

        Hud::apply(&mut self.text_renderer, &hud_text(&self.game_state));
    }

    /// Draws, submits and presents one frame.
    pub fn render(&mut self) {
        let mut encoder =
            self.wgpu_renderer
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Frame Encoder"),
                });

        let surface_texture = match self.wgpu_renderer.update_canvas(
            &mut encoder,
            &self.game_state,
            &mut self.text_renderer,
        ) {
            Ok(texture) => texture,
            Err(err) => {
                log::warn!("Skipping frame: {}", err);
                return;
            }
        };

        self.wgpu_renderer.queue.submit(Some(encoder.finish()));
        surface_texture.present();
        self.text_renderer.trim();
    }
}
