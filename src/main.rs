//! Escape Room - a first-person puzzle game.
//!
//! The player wakes up in a locked room and has to find keys, crack keypad codes, shine the
//! right flashlight color at doors and line up rotating cube panels to get out before the
//! countdown runs out.
//!
//! # Architecture
//! - `app/`: window, input and frame loop
//! - `config`: runtime settings from `escape-room.toml`
//! - `game/`: puzzle flags, inventory, room graph, player and collisions
//! - `renderer/`: WGPU room renderer, overlay and HUD text
//! - `math/`: vectors and matrices for the camera
//!
//! # Usage
//! `cargo run`, optionally with `ESCAPE_ROOM_CONFIG=path/to/config.toml` and `RUST_LOG=debug`.

pub mod app;
pub mod config;
pub mod game;
pub mod math;
pub mod renderer;

use config::GameConfig;
use game::GameState;
use game::audio::GameAudioManager;
use game::level::Level;
use winit::event_loop::{ControlFlow, EventLoop};

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = GameConfig::load().unwrap_or_else(|err| {
        log::warn!("{}; using default settings", err);
        GameConfig::default()
    });

    let level = match &config.level {
        Some(path) => Level::load(path),
        None => Level::builtin(),
    };
    let level = match level {
        Ok(level) => level,
        Err(err) => {
            log::error!("Cannot load level: {}", err);
            return;
        }
    };

    let audio_manager = if config.audio_enabled {
        match GameAudioManager::new(&config.audio_dir, config.volume) {
            Ok(manager) => Some(manager),
            Err(err) => {
                log::warn!("Audio disabled: {}", err);
                None
            }
        }
    } else {
        None
    };

    let game_state = match GameState::new(config, level, audio_manager) {
        Ok(game_state) => game_state,
        Err(err) => {
            log::error!("Cannot start level: {}", err);
            return;
        }
    };

    run(game_state);
}

fn run(game_state: GameState) {
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(err) => {
            log::error!("Error creating event loop: {}", err);
            return;
        }
    };

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = app::App::new(game_state);
    if let Err(err) = event_loop.run_app(&mut app) {
        log::error!("Event loop stopped with an error: {}", err);
    }
}
