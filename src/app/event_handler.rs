//! Event handler module.
//!
//! Contains the [`App`] struct and its winit event handling.

use crate::app::app_state::AppState;
use crate::game::GameState;
use crate::game::keys::{GameKey, winit_key_to_game_key};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseButton, WindowEvent},
    event_loop::ActiveEventLoop,
    window::{Window, WindowId},
};

pub struct App {
    pub instance: wgpu::Instance,
    pub state: Option<AppState>,
    pub window: Option<Arc<Window>>,
    /// Game waiting for the window to be created on the first `resumed`.
    pending_game: Option<GameState>,
}

impl App {
    pub fn new(game_state: GameState) -> Self {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        Self {
            instance,
            state: None,
            window: None,
            pending_game: Some(game_state),
        }
    }

    pub async fn set_window(&mut self, window: Window, game_state: GameState) -> Result<(), String> {
        let window = Arc::new(window);

        let surface = self
            .instance
            .create_surface(window.clone())
            .map_err(|e| format!("Failed to create surface: {}", e))?;

        let state = AppState::new(&self.instance, surface, &window, game_state).await?;

        self.window = Some(window);
        self.state = Some(state);
        Ok(())
    }

    pub fn handle_resized(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        match &mut self.state {
            Some(state) => state.resize_surface(width, height),
            None => log::warn!("Cannot resize surface before the renderer exists"),
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: GameKey, pressed: bool) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if !pressed {
            state.key_state.release_key(key);
            return;
        }

        state.key_state.press_key(key);
        match key {
            GameKey::Quit => {
                log::info!("Quit requested");
                event_loop.exit();
            }
            key => state.game_state.press(key),
        }
        if let Some(window) = self.window.as_ref() {
            state.triage_mouse(window);
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        let Some(game_state) = self.pending_game.take() else {
            return;
        };

        let attributes = Window::default_attributes()
            .with_title(game_state.config.window_title.clone())
            .with_inner_size(PhysicalSize::new(
                game_state.config.window_width,
                game_state.config.window_height,
            ));
        let window = match event_loop.create_window(attributes) {
            Ok(window) => window,
            Err(err) => {
                log::error!("Failed to create window: {}", err);
                event_loop.exit();
                return;
            }
        };

        if let Err(err) = pollster::block_on(self.set_window(window, game_state)) {
            log::error!("Failed to initialise renderer: {}", err);
            event_loop.exit();
            return;
        }
        if let Some(window) = self.window.as_ref() {
            window.request_redraw();
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if let Some(state) = self.state.as_mut() {
                state.game_state.mouse_look(delta.0, delta.1);
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        if self.state.is_none() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                log::info!("The close button was pressed; stopping");
                event_loop.exit();
            }

            WindowEvent::Resized(new_size) => {
                self.handle_resized(new_size.width, new_size.height);
            }

            WindowEvent::Focused(false) => {
                // Keys released while unfocused never reach us.
                if let Some(state) = self.state.as_mut() {
                    state.key_state.clear();
                }
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: key,
                        state: key_state,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(game_key) = winit_key_to_game_key(&key) {
                    self.handle_key(event_loop, game_key, key_state == ElementState::Pressed);
                }
            }

            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                self.handle_key(event_loop, GameKey::MouseButtonLeft, true);
                if let Some(state) = self.state.as_mut() {
                    state.key_state.release_key(GameKey::MouseButtonLeft);
                }
            }

            WindowEvent::RedrawRequested => {
                self.handle_redraw();
                if let Some(window) = self.window.as_ref() {
                    window.request_redraw();
                }
            }

            _ => {}
        }
    }
}
